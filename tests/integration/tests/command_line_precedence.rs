use std::fs;

use pkdconf_catalog::{simulation_schema, PROGRAM_NAME};
use pkdconf_cli::{decode_command_line, load_script_mapping, render_help};
use pkdconf_core::ParamValue;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn integration_catalog_defaults_pass_the_type_audit() {
    let schema = simulation_schema().expect("catalog schema");
    let command_line = decode_command_line(schema, Vec::<String>::new()).expect("decode");

    assert!(command_line.parameters.audit_types().is_empty());
    assert_eq!(command_line.parameters.tracker().count(), 0);
    assert_eq!(command_line.residual.engine_argv(PROGRAM_NAME), vec!["pkdgrav3"]);
}

#[test]
fn integration_command_line_beats_entry_point_script_which_beats_later_scripts() {
    let temp = tempdir().expect("tempdir");
    let entry = temp.path().join("cosmo.par");
    let extra = temp.path().join("extra.toml");
    fs::write(
        &entry,
        "import math\n\
         dBoxSize = 999.0\n\
         bPeriodic = True\n\
         nSteps = 100\n\
         achOutName = 'cosmo'\n",
    )
    .expect("write par");
    fs::write(&extra, "nSteps = 5\ndTheta = 0.55\nachOutName = \"extra\"\n").expect("write toml");

    let schema = simulation_schema().expect("catalog schema");
    let entry_text = entry.to_str().expect("utf8 path");
    let mut command_line =
        decode_command_line(schema, ["-mpc", "50", "-o", "cli", entry_text, "-sz", "32"])
            .expect("decode");
    assert_eq!(command_line.residual.entry_point.as_deref(), Some(entry_text));

    let parameters = &mut command_line.parameters;
    let entry_report = parameters.merge(&load_script_mapping(&entry).expect("load par"));
    let extra_report = parameters.merge(&load_script_mapping(&extra).expect("load toml"));

    assert_eq!(parameters.get_f64("dBoxSize"), Ok(50.0));
    assert_eq!(parameters.get_text("achOutName"), Ok("cli"));
    assert_eq!(parameters.get_bool("bPeriodic"), Ok(true));
    assert_eq!(parameters.get_i64("nSteps"), Ok(100));
    assert_eq!(parameters.get_f64("dTheta"), Ok(0.55));
    assert_eq!(
        entry_report.shadowed,
        vec!["achOutName".to_string(), "dBoxSize".to_string()]
    );
    assert_eq!(extra_report.applied, vec!["dTheta".to_string()]);
    assert_eq!(
        command_line.residual.engine_argv(PROGRAM_NAME),
        vec![entry_text, "-sz", "32"]
    );
}

#[test]
fn integration_disable_spelling_matching_the_default_still_outranks_scripts() {
    let schema = simulation_schema().expect("catalog schema");
    let mut command_line = decode_command_line(schema, ["-p", "+ewald"]).expect("decode");
    let parameters = &mut command_line.parameters;

    assert_eq!(parameters.get_bool("bPeriodic"), Ok(false));
    assert!(parameters.is_specified("bPeriodic"));

    let report = parameters.merge(
        &[
            ("bPeriodic".to_string(), ParamValue::Bool(true)),
            ("bEwald".to_string(), ParamValue::Bool(false)),
        ]
        .into_iter()
        .collect(),
    );

    assert_eq!(parameters.get_bool("bPeriodic"), Ok(false));
    assert_eq!(parameters.get_bool("bEwald"), Ok(true));
    assert_eq!(
        report.shadowed,
        vec!["bEwald".to_string(), "bPeriodic".to_string()]
    );
    assert!(report.applied.is_empty());
}

#[test]
fn integration_resolution_serializes_values_and_tracker() {
    let schema = simulation_schema().expect("catalog schema");
    let mut command_line = decode_command_line(schema, ["+p", "-orbit", "12"]).expect("decode");
    command_line
        .parameters
        .merge(&[("dOmega0".to_string(), ParamValue::Float(0.31))].into_iter().collect());

    let payload = serde_json::to_value(&command_line.parameters).expect("serialize");
    assert_eq!(payload["values"]["bPeriodic"], json!(true));
    assert_eq!(payload["values"]["lstOrbits"], json!([12]));
    assert_eq!(payload["values"]["dOmega0"], json!(0.31));
    assert_eq!(payload["specified"]["dOmega0"], json!(true));
    assert_eq!(payload["specified"]["dTheta"], json!(false));
}

#[test]
fn integration_help_covers_every_registered_spelling() {
    let schema = simulation_schema().expect("catalog schema");
    let help = render_help(schema, PROGRAM_NAME);

    for (_, descriptor) in schema.descriptors() {
        for spelling in descriptor.spellings() {
            assert!(
                help.contains(&spelling.text),
                "help is missing {}",
                spelling.text
            );
        }
    }
    assert!(help.contains("-ewald, +ewald"));
}
