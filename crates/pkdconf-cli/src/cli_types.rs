use clap::ValueEnum;

/// Rendering of the resolved configuration on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliOutputFormat {
    #[default]
    Text,
    Json,
}
