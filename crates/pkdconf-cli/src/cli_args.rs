use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::CliOutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "pkdconf",
    about = "Resolve simulation parameters from the command line and parameter scripts",
    version
)]
pub struct Cli {
    #[arg(
        long = "param-file",
        env = "PKDCONF_PARAM_FILES",
        value_delimiter = ',',
        help = "Extra parameter script (.par, .toml or .json) merged after the entry point. Repeatable; earlier files win."
    )]
    pub param_files: Vec<PathBuf>,

    #[arg(
        long,
        env = "PKDCONF_FORMAT",
        value_enum,
        default_value_t = CliOutputFormat::Text,
        help = "Output format for the resolved configuration"
    )]
    pub format: CliOutputFormat,

    #[arg(
        long = "no-entry-point-script",
        action = ArgAction::SetTrue,
        help = "Do not load the entry point as a parameter script"
    )]
    pub no_entry_point_script: bool,

    #[arg(
        long = "check-types",
        env = "PKDCONF_CHECK_TYPES",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Fail when a resolved value does not match its declared type"
    )]
    pub check_types: bool,

    #[arg(
        last = true,
        allow_hyphen_values = true,
        value_name = "TOKENS",
        help = "Simulation command line, decoded with the +name/-name grammar"
    )]
    pub tokens: Vec<String>,
}
