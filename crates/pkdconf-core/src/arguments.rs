use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::merge::{merge_script_values, MergeReport, ScriptMapping};
use crate::schema::{DestinationId, Schema};
use crate::value::ParamValue;

/// Error returned by the typed accessors of [`ResolvedParameters`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueAccessError {
    #[error("unknown parameter `{0}`")]
    Unknown(String),
    #[error("parameter `{name}` holds {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Current value of every destination, indexed by [`DestinationId`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArguments {
    values: Vec<ParamValue>,
}

impl ParsedArguments {
    pub fn from_defaults(schema: &Schema) -> Self {
        Self {
            values: schema
                .descriptors()
                .map(|(_, descriptor)| descriptor.initial_value())
                .collect(),
        }
    }

    pub fn get(&self, id: DestinationId) -> &ParamValue {
        &self.values[id.index()]
    }

    pub fn set(&mut self, id: DestinationId, value: ParamValue) {
        self.values[id.index()] = value;
    }

    /// Appends to the sequence at `id`; a non-sequence value is replaced by a
    /// one-element sequence.
    pub fn append(&mut self, id: DestinationId, value: ParamValue) {
        let slot = &mut self.values[id.index()];
        match slot {
            ParamValue::List(items) => items.push(value),
            _ => *slot = ParamValue::List(vec![value]),
        }
    }
}

/// Parallel record of which destinations an authoritative source has set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifiedTracker {
    flags: Vec<bool>,
}

impl SpecifiedTracker {
    pub fn new(schema: &Schema) -> Self {
        Self {
            flags: vec![false; schema.len()],
        }
    }

    pub fn mark(&mut self, id: DestinationId) {
        self.flags[id.index()] = true;
    }

    pub fn is_specified(&self, id: DestinationId) -> bool {
        self.flags[id.index()]
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|flag| **flag).count()
    }
}

/// A resolved value whose shape does not match its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMismatch {
    pub destination: String,
    pub expected: &'static str,
    pub found: &'static str,
}

/// Values plus tracker for one schema: the configuration handed to the engine.
#[derive(Debug, Clone)]
pub struct ResolvedParameters<'s> {
    schema: &'s Schema,
    arguments: ParsedArguments,
    specified: SpecifiedTracker,
}

impl<'s> ResolvedParameters<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            arguments: ParsedArguments::from_defaults(schema),
            specified: SpecifiedTracker::new(schema),
        }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn arguments(&self) -> &ParsedArguments {
        &self.arguments
    }

    pub fn tracker(&self) -> &SpecifiedTracker {
        &self.specified
    }

    /// Installs a command-line value and marks the destination specified.
    pub fn specify(&mut self, id: DestinationId, value: ParamValue) {
        self.arguments.set(id, value);
        self.specified.mark(id);
    }

    /// Appends a command-line value for a repeatable destination and marks it
    /// specified.
    pub fn specify_appended(&mut self, id: DestinationId, value: ParamValue) {
        self.arguments.append(id, value);
        self.specified.mark(id);
    }

    /// Applies one script mapping under first-writer-wins precedence.
    pub fn merge(&mut self, script: &ScriptMapping) -> MergeReport {
        merge_script_values(self.schema, script, &mut self.arguments, &mut self.specified)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.schema.lookup(name).map(|id| self.arguments.get(id))
    }

    /// Unknown names report `false`.
    pub fn is_specified(&self, name: &str) -> bool {
        self.schema
            .lookup(name)
            .is_some_and(|id| self.specified.is_specified(id))
    }

    pub fn is_set(&self, name: &str) -> Result<bool, ValueAccessError> {
        Ok(!self.value(name)?.is_unset())
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ValueAccessError> {
        let value = self.value(name)?;
        value.as_bool().ok_or_else(|| mismatch(name, "bool", value))
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, ValueAccessError> {
        let value = self.value(name)?;
        value.as_i64().ok_or_else(|| mismatch(name, "int", value))
    }

    pub fn get_f64(&self, name: &str) -> Result<f64, ValueAccessError> {
        let value = self.value(name)?;
        value.as_f64().ok_or_else(|| mismatch(name, "float", value))
    }

    pub fn get_text(&self, name: &str) -> Result<&str, ValueAccessError> {
        let value = self.value(name)?;
        value.as_text().ok_or_else(|| mismatch(name, "text", value))
    }

    pub fn get_list(&self, name: &str) -> Result<&[ParamValue], ValueAccessError> {
        let value = self.value(name)?;
        value.as_list().ok_or_else(|| mismatch(name, "list", value))
    }

    /// Reports every destination whose value does not fit its declared kind.
    /// Values are left untouched.
    pub fn audit_types(&self) -> Vec<TypeMismatch> {
        self.schema
            .descriptors()
            .filter_map(|(id, descriptor)| {
                let value = self.arguments.get(id);
                if descriptor.kind.accepts(value) {
                    return None;
                }
                Some(TypeMismatch {
                    destination: descriptor.destination.clone(),
                    expected: descriptor.kind.expected_label(),
                    found: value.kind_label(),
                })
            })
            .collect()
    }

    /// `(destination, value, specified)` in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'s str, &ParamValue, bool)> + '_ {
        self.schema.descriptors().map(move |(id, descriptor)| {
            (
                descriptor.destination.as_str(),
                self.arguments.get(id),
                self.specified.is_specified(id),
            )
        })
    }

    fn value(&self, name: &str) -> Result<&ParamValue, ValueAccessError> {
        self.get(name)
            .ok_or_else(|| ValueAccessError::Unknown(name.to_string()))
    }
}

fn mismatch(name: &str, expected: &'static str, value: &ParamValue) -> ValueAccessError {
    ValueAccessError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: value.kind_label(),
    }
}

struct ValuesView<'a, 's>(&'a ResolvedParameters<'s>);

impl Serialize for ValuesView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.schema.len()))?;
        for (destination, value, _) in self.0.iter() {
            map.serialize_entry(destination, value)?;
        }
        map.end()
    }
}

struct SpecifiedView<'a, 's>(&'a ResolvedParameters<'s>);

impl Serialize for SpecifiedView<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.schema.len()))?;
        for (destination, _, specified) in self.0.iter() {
            map.serialize_entry(destination, &specified)?;
        }
        map.end()
    }
}

impl Serialize for ResolvedParameters<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResolvedParameters", 2)?;
        state.serialize_field("values", &ValuesView(self))?;
        state.serialize_field("specified", &SpecifiedView(self))?;
        state.end()
    }
}
