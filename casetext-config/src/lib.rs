//! Configuration for casetext
//!
//! Example config file:
//! ```
//! # use casetext_config::ConfigFile;
//! # let config_text = r#"
//! source_directory = "plans"
//! indent = "  "
//!
//! [projects.Shop]
//! tests = "shop.cases"
//! templates = "shop.templates"
//!
//! [projects.Shared]
//! tests = "shared.cases"
//! # "#;
//! # let config: ConfigFile = config_text.try_into().unwrap();
//! # let shop = config.projects.get("Shop").expect("no Shop project");
//! # assert_eq!(shop.tests().as_str(), "shop.cases");
//! # assert_eq!(shop.templates().map(|path| path.as_str()), Some("shop.templates"));
//! # assert_eq!(config.projects.get("Shared").unwrap().templates(), None);
//! ```
use anyhow::{Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};

use casetext_tree::{text, text::PrintOptions, Workspace};

mod file;
pub use file::{ConfigFile, ConfigProject};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory against which relative project file paths are resolved
    source_directory: Utf8PathBuf,

    /// Options used when printing
    print_options: PrintOptions,

    projects: Vec<ProjectFiles>,
}

/// The files of one configured project, with paths resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFiles {
    pub name: String,
    pub tests: Utf8PathBuf,
    pub templates: Option<Utf8PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config::new(".")
    }
}

impl Config {
    /// An empty configuration resolving paths against `source_directory`
    pub fn new(source_directory: impl AsRef<Utf8Path>) -> Self {
        Config {
            source_directory: source_directory.as_ref().to_owned(),
            print_options: Default::default(),
            projects: Vec::new(),
        }
    }

    /// Loads the config file at `path`
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = ConfigFile::load(path)?;
        let config_directory = path.parent().unwrap_or_else(|| Utf8Path::new(""));
        Ok(Config::from_file(file, config_directory))
    }

    /// Resolves a parsed config file that was found in `config_directory`
    pub fn from_file(file: ConfigFile, config_directory: &Utf8Path) -> Self {
        let ConfigFile {
            projects,
            source_directory,
            indent,
        } = file;
        let source_directory = match source_directory {
            Some(directory) => config_directory.join(directory),
            None => config_directory.to_owned(),
        };
        let mut config = Config::new(source_directory);
        if let Some(indent) = indent {
            config.print_options.indent = indent;
        }
        for (name, project) in projects {
            config.add_project(name, project.tests(), project.templates());
        }
        config
    }

    /// Adds a project; relative paths are taken from the source directory
    pub fn add_project(
        &mut self,
        name: impl Into<String>,
        tests: impl AsRef<Utf8Path>,
        templates: Option<&Utf8Path>,
    ) {
        let files = ProjectFiles {
            name: name.into(),
            tests: self.source_directory.join(tests),
            templates: templates.map(|path| self.source_directory.join(path)),
        };
        match self.projects.iter_mut().find(|p| p.name == files.name) {
            Some(existing) => *existing = files,
            None => self.projects.push(files),
        }
    }

    pub fn source_directory(&self) -> &Utf8Path {
        &self.source_directory
    }

    pub fn print_options(&self) -> &PrintOptions {
        &self.print_options
    }

    /// The configured projects, in the order they were added (by name when loaded from a file)
    pub fn projects(&self) -> &[ProjectFiles] {
        &self.projects
    }

    /// Finds a configured project by name
    pub fn project(&self, name: &str) -> Option<&ProjectFiles> {
        self.projects.iter().find(|project| project.name == name)
    }

    /// Reads every configured file into a new workspace
    pub fn load_workspace(&self) -> Result<Workspace> {
        self.load_workspace_with(|path| {
            std::fs::read_to_string(path).with_context(|| format!("Reading {path:?}"))
        })
    }

    /// Builds a new workspace from the configured files, reading them with `read`
    ///
    /// All templates are loaded before any project, so that a reference can be checked as
    /// soon as it is read whichever project its template belongs to.
    pub fn load_workspace_with<F>(&self, mut read: F) -> Result<Workspace>
    where
        F: FnMut(&Utf8Path) -> Result<String>,
    {
        let mut workspace = Workspace::new();
        for project in &self.projects {
            let Some(path) = project.templates.as_deref() else {
                continue;
            };
            tracing::info!("Loading templates of {} from {}", project.name, path);
            let content = read(path)?;
            let root = match workspace.project_named(&project.name) {
                Some(root) => root,
                None => workspace.create_project(Some(&project.name)),
            };
            text::load_templates(&mut workspace, root, &content, None)
                .with_context(|| format!("Loading templates from {path:?}"))?;
        }
        for project in &self.projects {
            let path = project.tests.as_path();
            tracing::info!("Loading project {} from {}", project.name, path);
            let content = read(path)?;
            let id = text::load_project(&mut workspace, &content, &project.name, None)
                .with_context(|| format!("Loading project from {path:?}"))?;
            let loaded = &workspace.node(id)?.name;
            if *loaded != project.name {
                tracing::warn!(
                    "{} names its project \"{}\", not \"{}\" as configured",
                    path,
                    loaded,
                    project.name
                );
            }
        }
        let lost = workspace.lost_references();
        if !lost.is_empty() {
            tracing::warn!("{} references do not resolve to a template", lost.len());
        }
        Ok(workspace)
    }
}
