//! Dependency graphs read from TOML
//!
//! ```toml
//! [dependencies]
//! checkout = ["login", "basket"]
//! basket = ["login"]
//! ```
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use camino::Utf8Path;
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;

use crate::scope::flatten;

/// Deserialization of a dependency file
#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct DependencyFile {
    /// Each name mapped to the names it depends on
    #[serde(default)]
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl DependencyFile {
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Reading dependency file {path:?}"))?;
        DependencyFile::try_from(data.as_str())
            .with_context(|| format!("Parsing dependency file {path:?}"))
    }

    /// The graph, with names in sorted order and dependencies in the order given
    pub fn graph(&self) -> IndexMap<String, IndexSet<String>> {
        self.dependencies
            .iter()
            .map(|(name, dependencies)| (name.clone(), dependencies.iter().cloned().collect()))
            .collect()
    }

    /// The graph reduced to at most one dependency per name
    pub fn flatten(&self) -> IndexMap<String, String> {
        flatten(&self.graph())
    }
}

impl TryFrom<&str> for DependencyFile {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(toml::from_str(value)?)
    }
}
