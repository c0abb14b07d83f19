use std::fmt;

use serde::{Deserialize, Serialize};

/// A parameter value as held by the resolved argument record.
///
/// Values are shape-tagged but not schema-checked: a script may install any
/// shape for any destination, and the type audit reports mismatches later.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    #[default]
    Unset,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn kind_label(&self) -> &'static str {
        match self {
            ParamValue::Unset => "none",
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
            ParamValue::List(_) => "list",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ParamValue::Unset)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integers widen to floats; nothing else converts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(value) => Some(*value),
            ParamValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(value: Vec<ParamValue>) -> Self {
        ParamValue::List(value)
    }
}

// Rendered in parameter-file notation so help defaults read like `.par` input.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Unset => f.write_str("None"),
            ParamValue::Bool(true) => f.write_str("True"),
            ParamValue::Bool(false) => f.write_str("False"),
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::Float(value) => write!(f, "{value:?}"),
            ParamValue::Text(value) => f.write_str(value),
            ParamValue::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        ParamValue::Text(text) => write!(f, "'{text}'")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

/// Declared coercion target for a valued option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Float,
    Int,
    Text,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Float => "float",
            ValueType::Int => "int",
            ValueType::Text => "text",
        }
    }

    /// Converts a raw command-line token, returning `None` when the token does
    /// not parse as this type.
    pub fn coerce(self, token: &str) -> Option<ParamValue> {
        match self {
            ValueType::Float => token.trim().parse::<f64>().ok().map(ParamValue::Float),
            ValueType::Int => token.trim().parse::<i64>().ok().map(ParamValue::Int),
            ValueType::Text => Some(ParamValue::Text(token.to_string())),
        }
    }

    /// Whether `value` has a shape this type accepts. `Unset` always passes.
    pub fn accepts(self, value: &ParamValue) -> bool {
        match (self, value) {
            (_, ParamValue::Unset) => true,
            (ValueType::Float, ParamValue::Float(_) | ParamValue::Int(_)) => true,
            (ValueType::Int, ParamValue::Int(_)) => true,
            (ValueType::Text, ParamValue::Text(_)) => true,
            _ => false,
        }
    }
}
