#![no_main]

use libfuzzer_sys::fuzz_target;
use pkdconf_cli::parse_par_script;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    if let Ok(mapping) = parse_par_script(&raw) {
        assert!(mapping.len() <= raw.lines().count());
    }
});
