//! CLI module for keyfile
//!
//! One-shot commands over a file-backed catalog:
//! - create / exists / dealloc: dataset lifecycle
//! - write / update: records as JSON lines on stdin
//! - find / scan / delete: keyed and sequential access

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ModeArg, Target};
pub use commands::{
    create, dealloc, delete, execute, exists, find, run, run_command, scan, update, write, Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_records, write_error, write_response};
