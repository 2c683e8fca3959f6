//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use clap_complete::Shell;

use crate::infrastructure::codec::DocumentFormat;

/// Inspect and convert YAML/TOML configuration documents
#[derive(Parser, Debug)]
#[command(name = "cfgbind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Print author and version
    #[arg(long)]
    pub info: bool,

    /// Print shell completions for SHELL to stdout
    #[arg(long = "generator", value_enum)]
    pub generator: Option<Shell>,

    /// Explicit settings file (overrides the global one)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the node at a dotted key
    Get {
        /// Document to read
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Dotted key, e.g. server.port
        key: String,
    },

    /// Re-emit a document in another format
    Convert {
        /// Document to read
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Target format
        #[arg(long, value_enum)]
        to: DocumentFormat,
    },

    /// Show the mapping structure of a document
    Tree {
        /// Document to read
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Show global config file location
    Path,

    /// Print a commented settings template
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn given_cli_definition_when_asserted_then_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_convert_args_when_parsed_then_target_format_set() {
        let cli = Cli::try_parse_from(["cfgbind", "-d", "-d", "convert", "app.yaml", "--to", "toml"])
            .expect("parse");
        assert_eq!(cli.debug, 2);
        match cli.command {
            Some(Commands::Convert { file, to }) => {
                assert_eq!(file, PathBuf::from("app.yaml"));
                assert_eq!(to, DocumentFormat::Toml);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
