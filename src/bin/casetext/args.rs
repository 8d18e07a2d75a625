use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// The path to the casetext.toml config file
    #[arg(short, long, default_value = "casetext.toml")]
    pub config_file: Utf8PathBuf,

    /// Increase logging verbosity level (0: warn; 1: info; 2: debug; 3: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the configured projects in their normalized text form
    Format {
        /// Only print the named project
        #[arg(short, long)]
        project: Option<String>,

        /// Print as for an editor: expand references and list the read-only ranges
        #[arg(long)]
        editor: bool,
    },
    /// Print the templates of the configured projects
    Templates {
        /// Only print the templates of the named project
        #[arg(short, long)]
        project: Option<String>,
    },
    /// List references whose template cannot be found
    Lost,
    /// Reduce a dependency graph to at most one dependency per entry
    Flatten {
        /// A TOML file with a [dependencies] table of `name = ["dependency", ...]`
        file: Utf8PathBuf,
    },
}
