#![doc = include_str!("../../../README.md")]

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{span, Level};

mod args;
use args::{Command, CommandLineArgs};
use casetext::{
    config::Config,
    dependencies::DependencyFile,
    report,
    tree::{text, NodeId, Workspace},
};

fn init_logger(verbosity: u8) {
    let sub = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(false)
        .with_line_number(false);
    let (level, pretty) = match verbosity {
        0 => (Level::WARN, false),
        1 => (Level::INFO, false),
        2 => (Level::INFO, true),
        3 => (Level::DEBUG, true),
        _ => (Level::TRACE, true),
    };
    let sub = sub.with_max_level(level);
    if pretty {
        sub.pretty().init();
    } else {
        sub.init();
    }
}

fn main() -> Result<()> {
    let CommandLineArgs {
        config_file,
        verbose,
        command,
    } = CommandLineArgs::parse();

    init_logger(verbose);
    let span = span!(Level::DEBUG, "main", config = config_file.as_str());
    let _guard = span.enter();

    match command {
        Command::Format { project, editor } => {
            let config = Config::load(&config_file)?;
            let workspace = config.load_workspace()?;
            let options = config.print_options();
            for project in selected(&workspace, project.as_deref())? {
                if editor {
                    let printed = text::print_editor(&workspace, &[project], options);
                    println!("{}", printed.text);
                    print!("{}", report::read_only_ranges(&printed));
                } else {
                    println!("{}", text::print_project(&workspace, project, options));
                }
            }
        }
        Command::Templates { project } => {
            let config = Config::load(&config_file)?;
            let workspace = config.load_workspace()?;
            for project in selected(&workspace, project.as_deref())? {
                let printed = text::print_templates(&workspace, project, config.print_options());
                if !printed.is_empty() {
                    println!("{printed}");
                }
            }
        }
        Command::Lost => {
            let config = Config::load(&config_file)?;
            let workspace = config.load_workspace()?;
            print!("{}", report::lost_references(&workspace));
        }
        Command::Flatten { file } => {
            for (name, dependency) in DependencyFile::load(&file)?.flatten() {
                println!("{name} -> {dependency}");
            }
        }
    }
    Ok(())
}

/// The named project, or all projects
fn selected(workspace: &Workspace, name: Option<&str>) -> Result<Vec<NodeId>> {
    match name {
        Some(name) => workspace
            .project_named(name)
            .map(|project| vec![project])
            .ok_or_else(|| anyhow!("No project named \"{}\" is configured", name)),
        None => Ok(workspace.projects().to_vec()),
    }
}
