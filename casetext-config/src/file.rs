use std::collections::BTreeMap;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Deserialization of casetext.toml
#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// A map of project names to the files holding them
    #[serde(default)]
    pub projects: BTreeMap<String, ConfigProject>,

    /// Directory of the project files (defaults to directory containing config)
    pub source_directory: Option<Utf8PathBuf>,

    /// Indentation used when printing (defaults to four spaces)
    pub indent: Option<String>,
}

/// Configuration for a single project within casetext.toml
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigProject {
    tests: Utf8PathBuf,
    templates: Option<Utf8PathBuf>,
}

impl ConfigProject {
    /// The path to the text file holding the project's tree (may be absolute or relative to
    /// the source directory)
    pub fn tests(&self) -> &Utf8Path {
        &self.tests
    }

    /// The path to the text file holding the project's templates, if it has any
    pub fn templates(&self) -> Option<&Utf8Path> {
        self.templates.as_deref()
    }
}

impl ConfigFile {
    /// Load a configuration from the specified file
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_context = || format!("Reading config file {path:?}");
        let config_data = std::fs::read_to_string(path).with_context(config_context)?;
        ConfigFile::try_from(config_data.as_str())
            .with_context(|| format!("Parsing config file {path:?}"))
    }
}

impl TryFrom<&str> for ConfigFile {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(toml::from_str(value)?)
    }
}
