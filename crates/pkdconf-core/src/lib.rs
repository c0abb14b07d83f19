//! Parameter schema and precedence resolution for pkdconf.
//!
//! Provides the option descriptor registry, the resolved-value record with its
//! parallel specification tracker, and the first-writer-wins merge used to fold
//! parameter scripts under command-line values.

pub mod arguments;
pub mod merge;
pub mod schema;
pub mod value;

pub use arguments::{
    ParsedArguments, ResolvedParameters, SpecifiedTracker, TypeMismatch, ValueAccessError,
};
pub use merge::{merge_script_values, MergeReport, ScriptMapping};
pub use schema::{
    DestinationId, OptionDescriptor, OptionGroup, OptionKind, Schema, SchemaBuilder, SchemaError,
    Spelling, SpellingAction, DISABLE_PREFIX, ENABLE_PREFIX, END_OF_OPTIONS, HELP_SPELLING,
};
pub use value::{ParamValue, ValueType};
