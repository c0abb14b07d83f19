#![no_main]

use libfuzzer_sys::fuzz_target;
use pkdconf_catalog::simulation_schema;
use pkdconf_cli::decode_command_line;

fuzz_target!(|data: &[u8]| {
    let Ok(schema) = simulation_schema() else {
        return;
    };
    let raw = String::from_utf8_lossy(data);
    let tokens = raw.split('\0').map(str::to_string).collect::<Vec<_>>();
    if let Ok(command_line) = decode_command_line(schema, tokens.clone()) {
        let argv = command_line.residual.engine_argv("pkdgrav3");
        assert!(argv.len() <= tokens.len() + 1);
        assert!(command_line.parameters.tracker().count() <= schema.len());
    }
});
