use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::value::{ParamValue, ValueType};

/// Prefix of the toggle spelling that forces a boolean to true.
pub const ENABLE_PREFIX: char = '+';
/// Prefix of the toggle spelling that forces a boolean to false, and of every
/// valued flag.
pub const DISABLE_PREFIX: char = '-';
/// Spelling that requests the help listing instead of a value.
pub const HELP_SPELLING: &str = "--help";
/// Spelling that ends option decoding.
pub const END_OF_OPTIONS: &str = "--";

/// Error raised while registering option descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("destination `{0}` is declared more than once")]
    DuplicateDestination(String),
    #[error("spelling `{spelling}` of `{destination}` is already registered for `{existing}`")]
    DuplicateSpelling {
        spelling: String,
        destination: String,
        existing: String,
    },
    #[error("option `{destination}` has malformed name `{name}`: {reason}")]
    MalformedName {
        destination: String,
        name: String,
        reason: &'static str,
    },
    #[error("default of `{destination}` is not a {expected} value")]
    InvalidDefault {
        destination: String,
        expected: &'static str,
    },
}

/// Stable index of a destination inside one [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DestinationId(usize);

impl DestinationId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Zero-argument switch reachable as `+name` and `-name`.
    Toggle,
    /// `-name VALUE`, last occurrence wins.
    Scalar(ValueType),
    /// `-name VALUE`, every occurrence appends.
    Repeatable(ValueType),
}

impl OptionKind {
    /// Whether a resolved value has the shape this kind produces.
    pub fn accepts(self, value: &ParamValue) -> bool {
        match self {
            OptionKind::Toggle => matches!(value, ParamValue::Bool(_)),
            OptionKind::Scalar(value_type) => value_type.accepts(value),
            OptionKind::Repeatable(value_type) => match value {
                ParamValue::Unset => true,
                ParamValue::List(items) => items
                    .iter()
                    .all(|item| !item.is_unset() && value_type.accepts(item)),
                _ => false,
            },
        }
    }

    pub fn expected_label(self) -> &'static str {
        match self {
            OptionKind::Toggle => "bool",
            OptionKind::Scalar(value_type) => value_type.as_str(),
            OptionKind::Repeatable(ValueType::Float) => "list of float",
            OptionKind::Repeatable(ValueType::Int) => "list of int",
            OptionKind::Repeatable(ValueType::Text) => "list of text",
        }
    }
}

/// What matching a spelling does to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellingAction {
    Enable,
    Disable,
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spelling {
    pub text: String,
    pub action: SpellingAction,
}

/// Declaration of one configurable setting.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    pub name: String,
    pub destination: String,
    pub kind: OptionKind,
    /// Declared default; `Unset` when the declaration gave none.
    pub default: ParamValue,
    pub help: String,
    pub exclusive_set: Option<String>,
}

impl OptionDescriptor {
    pub fn toggle(name: &str, destination: &str, default: Option<bool>, help: &str) -> Self {
        Self {
            name: name.to_string(),
            destination: destination.to_string(),
            kind: OptionKind::Toggle,
            default: default.map(ParamValue::Bool).unwrap_or_default(),
            help: help.to_string(),
            exclusive_set: None,
        }
    }

    pub fn scalar(
        name: &str,
        destination: &str,
        value_type: ValueType,
        default: ParamValue,
        help: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            destination: destination.to_string(),
            kind: OptionKind::Scalar(value_type),
            default,
            help: help.to_string(),
            exclusive_set: None,
        }
    }

    pub fn repeatable(name: &str, destination: &str, value_type: ValueType, help: &str) -> Self {
        Self {
            name: name.to_string(),
            destination: destination.to_string(),
            kind: OptionKind::Repeatable(value_type),
            default: ParamValue::Unset,
            help: help.to_string(),
            exclusive_set: None,
        }
    }

    /// Places the option in a set whose members may not be combined on one
    /// command line.
    pub fn exclusive_in(mut self, set: &str) -> Self {
        self.exclusive_set = Some(set.to_string());
        self
    }

    /// Value the destination holds before any source touches it.
    pub fn initial_value(&self) -> ParamValue {
        match self.kind {
            OptionKind::Toggle => ParamValue::Bool(self.default.as_bool().unwrap_or(false)),
            OptionKind::Scalar(_) => self.default.clone(),
            OptionKind::Repeatable(_) => ParamValue::List(Vec::new()),
        }
    }

    /// Spellings in help order. A toggle with a truthy default lists its
    /// disable form first.
    pub fn spellings(&self) -> Vec<Spelling> {
        match self.kind {
            OptionKind::Toggle => {
                let enable = Spelling {
                    text: format!("{ENABLE_PREFIX}{}", self.name),
                    action: SpellingAction::Enable,
                };
                let disable = Spelling {
                    text: format!("{DISABLE_PREFIX}{}", self.name),
                    action: SpellingAction::Disable,
                };
                if self.default.as_bool().unwrap_or(false) {
                    vec![disable, enable]
                } else {
                    vec![enable, disable]
                }
            }
            OptionKind::Scalar(_) | OptionKind::Repeatable(_) => vec![Spelling {
                text: format!("{DISABLE_PREFIX}{}", self.name),
                action: SpellingAction::Value,
            }],
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let malformed = |reason| SchemaError::MalformedName {
            destination: self.destination.clone(),
            name: self.name.clone(),
            reason,
        };
        if self.destination.trim().is_empty() {
            return Err(malformed("destination is empty"));
        }
        if self.name.is_empty() {
            return Err(malformed("name is empty"));
        }
        let is_prefix = |character: char| character == ENABLE_PREFIX || character == DISABLE_PREFIX;
        if self.name.starts_with(is_prefix) {
            return Err(malformed("name must not carry a prefix character"));
        }
        if self
            .name
            .chars()
            .any(|character| character.is_whitespace() || character == '=')
        {
            return Err(malformed("name must not contain whitespace or `=`"));
        }

        let default_fits = match self.kind {
            OptionKind::Toggle => matches!(self.default, ParamValue::Unset | ParamValue::Bool(_)),
            OptionKind::Scalar(value_type) => value_type.accepts(&self.default),
            OptionKind::Repeatable(_) => self.kind.accepts(&self.default),
        };
        if !default_fits {
            return Err(SchemaError::InvalidDefault {
                destination: self.destination.clone(),
                expected: self.kind.expected_label(),
            });
        }
        Ok(())
    }
}

/// Display grouping of descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    pub label: String,
    pub members: Vec<DestinationId>,
}

/// Immutable registry of every option, built through [`SchemaBuilder`].
#[derive(Debug, Clone)]
pub struct Schema {
    description: String,
    descriptors: Vec<OptionDescriptor>,
    groups: Vec<OptionGroup>,
    by_destination: HashMap<String, DestinationId>,
    by_spelling: HashMap<String, (DestinationId, SpellingAction)>,
}

impl Schema {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptor(&self, id: DestinationId) -> &OptionDescriptor {
        &self.descriptors[id.0]
    }

    pub fn descriptors(&self) -> impl Iterator<Item = (DestinationId, &OptionDescriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| (DestinationId(index), descriptor))
    }

    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    pub fn lookup(&self, destination: &str) -> Option<DestinationId> {
        self.by_destination.get(destination).copied()
    }

    pub fn resolve_spelling(&self, token: &str) -> Option<(DestinationId, SpellingAction)> {
        self.by_spelling.get(token).copied()
    }

    pub fn spelling_count(&self) -> usize {
        self.by_spelling.len()
    }
}

#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new(description: &str) -> Self {
        Self {
            schema: Schema {
                description: description.to_string(),
                descriptors: Vec::new(),
                groups: Vec::new(),
                by_destination: HashMap::new(),
                by_spelling: HashMap::new(),
            },
        }
    }

    /// Registers a descriptor under `group`, creating the group on first use.
    pub fn register(
        &mut self,
        group: &str,
        descriptor: OptionDescriptor,
    ) -> Result<DestinationId, SchemaError> {
        descriptor.validate()?;
        if self.schema.by_destination.contains_key(&descriptor.destination) {
            return Err(SchemaError::DuplicateDestination(descriptor.destination));
        }

        let spellings = descriptor.spellings();
        for spelling in &spellings {
            if let Some((existing, _)) = self.schema.by_spelling.get(&spelling.text) {
                return Err(SchemaError::DuplicateSpelling {
                    spelling: spelling.text.clone(),
                    destination: descriptor.destination.clone(),
                    existing: self.schema.descriptors[existing.0].destination.clone(),
                });
            }
        }

        let id = DestinationId(self.schema.descriptors.len());
        for spelling in spellings {
            self.schema
                .by_spelling
                .insert(spelling.text, (id, spelling.action));
        }
        self.schema
            .by_destination
            .insert(descriptor.destination.clone(), id);
        self.schema.descriptors.push(descriptor);

        match self
            .schema
            .groups
            .iter_mut()
            .find(|existing| existing.label == group)
        {
            Some(existing) => existing.members.push(id),
            None => self.schema.groups.push(OptionGroup {
                label: group.to_string(),
                members: vec![id],
            }),
        }
        Ok(id)
    }

    pub fn register_group<I>(&mut self, group: &str, descriptors: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = OptionDescriptor>,
    {
        for descriptor in descriptors {
            self.register(group, descriptor)?;
        }
        Ok(())
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::{OptionDescriptor, OptionKind, SchemaBuilder, SchemaError, SpellingAction};
    use crate::value::{ParamValue, ValueType};

    fn spelling_texts(descriptor: &OptionDescriptor) -> Vec<String> {
        descriptor
            .spellings()
            .into_iter()
            .map(|spelling| spelling.text)
            .collect()
    }

    #[test]
    fn unit_toggle_spelling_order_follows_declared_default() {
        let falsy = OptionDescriptor::toggle("p", "bPeriodic", Some(false), "periodic");
        let truthy = OptionDescriptor::toggle("ewald", "bEwald", Some(true), "ewald");
        let undeclared = OptionDescriptor::toggle("x", "bX", None, "x");

        assert_eq!(spelling_texts(&falsy), vec!["+p", "-p"]);
        assert_eq!(spelling_texts(&truthy), vec!["-ewald", "+ewald"]);
        assert_eq!(spelling_texts(&undeclared), vec!["+x", "-x"]);
        assert_eq!(undeclared.initial_value(), ParamValue::Bool(false));
    }

    #[test]
    fn unit_repeatable_starts_empty_and_scalar_keeps_default() {
        let orbit = OptionDescriptor::repeatable("orbit", "lstOrbits", ValueType::Int, "ids");
        let soft = OptionDescriptor::scalar(
            "e",
            "dSoft",
            ValueType::Float,
            ParamValue::Float(0.0),
            "soft",
        );

        assert_eq!(orbit.initial_value(), ParamValue::List(Vec::new()));
        assert_eq!(soft.initial_value(), ParamValue::Float(0.0));
        assert_eq!(spelling_texts(&orbit), vec!["-orbit"]);
    }

    #[test]
    fn functional_builder_indexes_destinations_spellings_and_groups() {
        let mut builder = SchemaBuilder::new("test");
        builder
            .register_group(
                "Periodic Boundaries",
                [
                    OptionDescriptor::toggle("p", "bPeriodic", Some(false), "periodic"),
                    OptionDescriptor::scalar(
                        "L",
                        "dPeriod",
                        ValueType::Float,
                        ParamValue::Float(1.0),
                        "box",
                    ),
                ],
            )
            .expect("register periodic group");
        builder
            .register(
                "Cosmology",
                OptionDescriptor::scalar(
                    "mpc",
                    "dBoxSize",
                    ValueType::Float,
                    ParamValue::Float(1.0),
                    "box size",
                ),
            )
            .expect("register box size");
        let schema = builder.build();

        let periodic = schema.lookup("bPeriodic").expect("bPeriodic registered");
        assert_eq!(
            schema.resolve_spelling("+p"),
            Some((periodic, SpellingAction::Enable))
        );
        assert_eq!(
            schema.resolve_spelling("-p"),
            Some((periodic, SpellingAction::Disable))
        );
        assert_eq!(
            schema.resolve_spelling("-mpc").map(|(_, action)| action),
            Some(SpellingAction::Value)
        );
        assert_eq!(schema.resolve_spelling("+mpc"), None);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.spelling_count(), 4);
        assert_eq!(schema.groups().len(), 2);
        assert_eq!(schema.groups()[0].members.len(), 2);
        assert_eq!(schema.descriptor(periodic).kind, OptionKind::Toggle);
    }

    #[test]
    fn regression_duplicate_destination_is_rejected() {
        let mut builder = SchemaBuilder::new("test");
        builder
            .register("a", OptionDescriptor::toggle("p", "bPeriodic", None, ""))
            .expect("first registration");
        let error = builder
            .register("a", OptionDescriptor::toggle("q", "bPeriodic", None, ""))
            .expect_err("duplicate destination should fail");
        assert_eq!(
            error,
            SchemaError::DuplicateDestination("bPeriodic".to_string())
        );
    }

    #[test]
    fn regression_spelling_collision_names_both_destinations() {
        let mut builder = SchemaBuilder::new("test");
        builder
            .register("a", OptionDescriptor::toggle("p", "bPeriodic", None, ""))
            .expect("first registration");
        let error = builder
            .register(
                "a",
                OptionDescriptor::scalar("p", "dP", ValueType::Float, ParamValue::Unset, ""),
            )
            .expect_err("colliding spelling should fail");
        assert_eq!(
            error,
            SchemaError::DuplicateSpelling {
                spelling: "-p".to_string(),
                destination: "dP".to_string(),
                existing: "bPeriodic".to_string(),
            }
        );
    }

    #[test]
    fn regression_malformed_names_and_defaults_are_rejected() {
        let mut builder = SchemaBuilder::new("test");
        let prefixed = builder
            .register("a", OptionDescriptor::toggle("+p", "bP", None, ""))
            .expect_err("prefixed name should fail");
        assert!(matches!(prefixed, SchemaError::MalformedName { .. }));

        let spaced = builder
            .register(
                "a",
                OptionDescriptor::scalar("m pc", "dBox", ValueType::Float, ParamValue::Unset, ""),
            )
            .expect_err("whitespace in name should fail");
        assert!(spaced.to_string().contains("whitespace"));

        let wrong_default = builder
            .register(
                "a",
                OptionDescriptor::scalar("n", "nSteps", ValueType::Int, ParamValue::Float(1.5), ""),
            )
            .expect_err("float default for int flag should fail");
        assert_eq!(
            wrong_default,
            SchemaError::InvalidDefault {
                destination: "nSteps".to_string(),
                expected: "int",
            }
        );
    }
}
