use std::collections::BTreeMap;

use serde::Serialize;

use crate::arguments::{ParsedArguments, SpecifiedTracker};
use crate::schema::Schema;
use crate::value::ParamValue;

/// Values supplied by one parameter script, keyed by destination name.
pub type ScriptMapping = BTreeMap<String, ParamValue>;

/// Outcome of one merge pass, per script key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Installed from the script and now tracked as specified.
    pub applied: Vec<String>,
    /// Known destinations an earlier source had already specified.
    pub shadowed: Vec<String>,
    /// Keys with no matching destination.
    pub ignored: Vec<String>,
}

impl MergeReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Merges `script` into `arguments`.
///
/// A destination already marked in `specified` keeps its value, so the command
/// line outranks every script and the first script to set a destination
/// outranks later ones. Installed values are not coerced.
pub fn merge_script_values(
    schema: &Schema,
    script: &ScriptMapping,
    arguments: &mut ParsedArguments,
    specified: &mut SpecifiedTracker,
) -> MergeReport {
    let mut report = MergeReport::default();
    for (key, value) in script {
        let Some(id) = schema.lookup(key) else {
            tracing::debug!(key = %key, "ignoring script value without a matching parameter");
            report.ignored.push(key.clone());
            continue;
        };
        if specified.is_specified(id) {
            tracing::debug!(
                destination = %key,
                "keeping previously specified value over script value"
            );
            report.shadowed.push(key.clone());
            continue;
        }
        arguments.set(id, value.clone());
        specified.mark(id);
        report.applied.push(key.clone());
    }
    report
}
