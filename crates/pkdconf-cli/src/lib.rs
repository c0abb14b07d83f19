//! Command-line decoding and parameter-script loading for pkdconf.
//!
//! Decodes the `+name`/`-name` simulation grammar against a schema, keeps
//! unclaimed tokens for the engine, renders grouped help, and reads parameter
//! scripts into mappings for the precedence merge.

pub mod cli_args;
pub mod cli_types;
pub mod decode;
pub mod help;
pub mod residual;
pub mod script_file;

pub use cli_args::Cli;
pub use cli_types::*;
pub use decode::{decode_command_line, CommandLine, DecodeError};
pub use help::render_help;
pub use residual::{looks_like_option, ResidualArguments};
pub use script_file::*;
