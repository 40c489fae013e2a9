//! CLI argument definitions using clap
//!
//! Commands:
//! - keyfile create  --dataset <name> --schema <path>
//! - keyfile exists  --dataset <name>
//! - keyfile write   --dataset <name> --schema <path>   (records on stdin)
//! - keyfile find    --dataset <name> --schema <path> [--key <k>] [--mode eq|ge|first|last]
//! - keyfile scan    --dataset <name> --schema <path> [--limit <n>]
//! - keyfile update  --dataset <name> --schema <path>   (records on stdin)
//! - keyfile delete  --dataset <name> --schema <path> --key <k>
//! - keyfile dealloc --dataset <name>
//!
//! Every command also takes `--config <path>` (default `./keyfile.json`).

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::store::EqualityMode;

/// keyfile - keyed fixed-width record datasets
#[derive(Parser, Debug)]
#[command(name = "keyfile")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Dataset selection shared by every command
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Path to configuration file
    #[arg(long, default_value = "./keyfile.json")]
    pub config: PathBuf,

    /// Dataset name
    #[arg(long)]
    pub dataset: String,
}

/// Locate mode accepted by `find`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Key equal to the argument
    Eq,
    /// First key greater than or equal to the argument
    Ge,
    /// Lowest key
    First,
    /// Highest key
    Last,
}

impl From<ModeArg> for EqualityMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Eq => EqualityMode::Equal,
            ModeArg::Ge => EqualityMode::GreaterOrEqual,
            ModeArg::First => EqualityMode::First,
            ModeArg::Last => EqualityMode::Last,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Allocate a new, empty dataset sized to a schema
    Create {
        #[command(flatten)]
        target: Target,

        /// Path to the JSON schema file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Report whether a dataset exists
    Exists {
        #[command(flatten)]
        target: Target,
    },

    /// Insert records read as JSON lines from stdin
    Write {
        #[command(flatten)]
        target: Target,

        /// Path to the JSON schema file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Locate one record and print it
    Find {
        #[command(flatten)]
        target: Target,

        /// Path to the JSON schema file
        #[arg(long)]
        schema: PathBuf,

        /// Key value (hex digits for a hexadecimal key field)
        #[arg(long)]
        key: Option<String>,

        /// Locate mode
        #[arg(long, value_enum, default_value = "eq")]
        mode: ModeArg,
    },

    /// Print records in key order
    Scan {
        #[command(flatten)]
        target: Target,

        /// Path to the JSON schema file
        #[arg(long)]
        schema: PathBuf,

        /// Maximum number of records to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rewrite records read as JSON lines from stdin, matched by key
    Update {
        #[command(flatten)]
        target: Target,

        /// Path to the JSON schema file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Delete the record with the given key
    Delete {
        #[command(flatten)]
        target: Target,

        /// Path to the JSON schema file
        #[arg(long)]
        schema: PathBuf,

        /// Key value (hex digits for a hexadecimal key field)
        #[arg(long)]
        key: String,
    },

    /// Remove a dataset and all of its records
    Dealloc {
        #[command(flatten)]
        target: Target,
    },
}

impl Command {
    /// Shared dataset selection
    pub fn target(&self) -> &Target {
        match self {
            Command::Create { target, .. }
            | Command::Exists { target }
            | Command::Write { target, .. }
            | Command::Find { target, .. }
            | Command::Scan { target, .. }
            | Command::Update { target, .. }
            | Command::Delete { target, .. }
            | Command::Dealloc { target } => target,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_find() {
        let cli = Cli::try_parse_from([
            "keyfile", "find", "--dataset", "HLQ.A", "--schema", "s.json", "--key", "K1", "--mode", "ge",
        ])
        .unwrap();
        match cli.command {
            Command::Find { ref key, mode, .. } => {
                assert_eq!(key.as_deref(), Some("K1"));
                assert_eq!(EqualityMode::from(mode), EqualityMode::GreaterOrEqual);
            }
            ref other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.command.target().config, PathBuf::from("./keyfile.json"));
    }

    #[test]
    fn test_dataset_is_required() {
        assert!(Cli::try_parse_from(["keyfile", "exists"]).is_err());
    }
}
