use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;

use pkdconf_catalog::{simulation_schema, PROGRAM_NAME};
use pkdconf_cli::{
    decode_command_line, load_script_mapping, render_help, Cli, CliOutputFormat, CommandLine,
    ResidualArguments, ScriptFormat,
};
use pkdconf_core::{MergeReport, ResolvedParameters, TypeMismatch};

/// One merged parameter script and what it contributed.
#[derive(Debug, Serialize)]
pub(crate) struct ScriptMerge {
    pub path: String,
    #[serde(flatten)]
    pub report: MergeReport,
}

/// Everything handed to the engine after resolution.
#[derive(Debug, Serialize)]
pub(crate) struct ResolutionOutput<'a, 's> {
    pub parameters: &'a ResolvedParameters<'s>,
    pub entry_point: Option<&'a str>,
    pub engine_argv: Vec<String>,
    pub scripts: Vec<ScriptMerge>,
    pub type_mismatches: Vec<TypeMismatch>,
}

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let schema = simulation_schema()?;
    let CommandLine {
        mut parameters,
        residual,
        help_requested,
    } = decode_command_line(schema, cli.tokens.iter().cloned())?;

    if help_requested {
        println!("{}", render_help(schema, PROGRAM_NAME));
        return Ok(());
    }

    let mut scripts = Vec::new();
    for path in script_sources(&cli, &residual)? {
        let mapping = load_script_mapping(&path)?;
        let report = parameters.merge(&mapping);
        tracing::info!(
            path = %path.display(),
            applied = report.applied.len(),
            shadowed = report.shadowed.len(),
            ignored = report.ignored.len(),
            "merged parameter script"
        );
        if report.is_noop() {
            tracing::debug!(path = %path.display(), "parameter script changed nothing");
        }
        scripts.push(ScriptMerge {
            path: path.display().to_string(),
            report,
        });
    }

    let type_mismatches = parameters.audit_types();
    for mismatch in &type_mismatches {
        tracing::warn!(
            destination = %mismatch.destination,
            expected = mismatch.expected,
            found = mismatch.found,
            "resolved value does not match its declared type"
        );
    }
    if cli.check_types && !type_mismatches.is_empty() {
        let names = type_mismatches
            .iter()
            .map(|mismatch| {
                format!(
                    "{} (expected {}, found {})",
                    mismatch.destination, mismatch.expected, mismatch.found
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        bail!("type check failed: {names}");
    }

    let output = ResolutionOutput {
        parameters: &parameters,
        entry_point: residual.entry_point.as_deref(),
        engine_argv: residual.engine_argv(PROGRAM_NAME),
        scripts,
        type_mismatches,
    };
    match cli.format {
        CliOutputFormat::Text => println!("{}", render_text(&output)),
        CliOutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(())
}

/// Scripts to merge, highest precedence first: the entry point when it names a
/// parameter script, then each `--param-file` in order.
fn script_sources(cli: &Cli, residual: &ResidualArguments) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    if !cli.no_entry_point_script {
        if let Some(entry_point) = residual.entry_point.as_deref() {
            let path = Path::new(entry_point);
            if ScriptFormat::from_path(path).is_none() {
                tracing::debug!(entry_point, "entry point is not a parameter script");
            } else if path.is_file() {
                sources.push(path.to_path_buf());
            } else {
                bail!(
                    "entry point parameter script {} does not exist (pass --no-entry-point-script to hand it to the engine unread)",
                    path.display()
                );
            }
        }
    }
    sources.extend(cli.param_files.iter().cloned());
    Ok(sources)
}

fn render_text(output: &ResolutionOutput<'_, '_>) -> String {
    let mut lines = output
        .parameters
        .iter()
        .map(|(name, value, specified)| {
            let marker = if specified { " *" } else { "" };
            format!("{name} = {value}{marker}")
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push(format!(
        "entry point: {}",
        output.entry_point.unwrap_or("(none)")
    ));
    lines.push(format!("engine argv: {}", output.engine_argv.join(" ")));
    lines.join("\n")
}
