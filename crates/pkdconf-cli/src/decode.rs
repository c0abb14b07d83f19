use std::collections::HashMap;

use thiserror::Error;

use pkdconf_core::{
    DestinationId, OptionDescriptor, OptionKind, ResolvedParameters, Schema, SpellingAction,
    END_OF_OPTIONS, HELP_SPELLING,
};

use crate::residual::{looks_like_option, ResidualArguments};

/// Fatal problem with a user-supplied command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("argument {spelling}: invalid {expected} value for {destination}: '{token}'")]
    Coercion {
        destination: String,
        spelling: String,
        token: String,
        expected: &'static str,
    },
    #[error("argument {spelling}: expected one value for {destination}")]
    MissingValue {
        destination: String,
        spelling: String,
    },
    #[error("argument {spelling}: not allowed with argument {other}")]
    ExclusiveConflict { spelling: String, other: String },
}

/// First-pass result of decoding a command line.
#[derive(Debug, Clone)]
pub struct CommandLine<'s> {
    pub parameters: ResolvedParameters<'s>,
    pub residual: ResidualArguments,
    pub help_requested: bool,
}

/// Decodes `tokens` against `schema`.
///
/// Toggles take no value; valued flags take the next token or an inline
/// `-name=value`. Tokens the schema does not know are kept for the engine, and
/// everything after `--` is kept verbatim. Decoding stops at `--help`, so
/// later tokens are neither validated nor kept.
pub fn decode_command_line<'s, I, S>(
    schema: &'s Schema,
    tokens: I,
) -> Result<CommandLine<'s>, DecodeError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens = tokens.into_iter().map(Into::into).collect::<Vec<String>>();
    let mut decoder = Decoder {
        schema,
        parameters: ResolvedParameters::new(schema),
        exclusive_seen: HashMap::new(),
    };
    let mut residual = ResidualArguments::default();
    let mut help_requested = false;

    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index].as_str();
        index += 1;

        if token == END_OF_OPTIONS {
            residual.extend_verbatim(tokens[index..].iter().cloned());
            break;
        }
        if token == HELP_SPELLING {
            help_requested = true;
            break;
        }

        if let Some((id, spelling, inline)) = split_inline_value(schema, token) {
            decoder.decode_value(id, spelling, inline)?;
            continue;
        }

        match schema.resolve_spelling(token) {
            Some((id, SpellingAction::Enable)) => decoder.decode_toggle(id, token, true)?,
            Some((id, SpellingAction::Disable)) => decoder.decode_toggle(id, token, false)?,
            Some((id, SpellingAction::Value)) => {
                let value = match tokens.get(index) {
                    Some(next) if !is_option_token(schema, next) => {
                        index += 1;
                        next.as_str()
                    }
                    _ => {
                        return Err(DecodeError::MissingValue {
                            destination: schema.descriptor(id).destination.clone(),
                            spelling: token.to_string(),
                        })
                    }
                };
                decoder.decode_value(id, token, value)?;
            }
            None => residual.accept(token),
        }
    }

    Ok(CommandLine {
        parameters: decoder.parameters,
        residual,
        help_requested,
    })
}

struct Decoder<'s> {
    schema: &'s Schema,
    parameters: ResolvedParameters<'s>,
    exclusive_seen: HashMap<&'s str, (DestinationId, String)>,
}

impl<'s> Decoder<'s> {
    fn decode_toggle(
        &mut self,
        id: DestinationId,
        spelling: &str,
        enabled: bool,
    ) -> Result<(), DecodeError> {
        self.claim_exclusive(id, spelling)?;
        tracing::debug!(
            destination = %self.schema.descriptor(id).destination,
            spelling,
            enabled,
            "decoded toggle"
        );
        self.parameters.specify(id, enabled.into());
        Ok(())
    }

    fn decode_value(
        &mut self,
        id: DestinationId,
        spelling: &str,
        token: &str,
    ) -> Result<(), DecodeError> {
        self.claim_exclusive(id, spelling)?;
        let descriptor = self.schema.descriptor(id);
        let (value_type, repeatable) = match descriptor.kind {
            OptionKind::Scalar(value_type) => (value_type, false),
            OptionKind::Repeatable(value_type) => (value_type, true),
            OptionKind::Toggle => return Err(coercion_error(descriptor, spelling, token)),
        };
        let value = value_type
            .coerce(token)
            .ok_or_else(|| coercion_error(descriptor, spelling, token))?;
        tracing::debug!(
            destination = %descriptor.destination,
            spelling,
            value = %value,
            "decoded valued flag"
        );
        if repeatable {
            self.parameters.specify_appended(id, value);
        } else {
            self.parameters.specify(id, value);
        }
        Ok(())
    }

    fn claim_exclusive(&mut self, id: DestinationId, spelling: &str) -> Result<(), DecodeError> {
        let Some(set) = self.schema.descriptor(id).exclusive_set.as_deref() else {
            return Ok(());
        };
        match self.exclusive_seen.get(set) {
            Some((claimed, other)) if *claimed != id => Err(DecodeError::ExclusiveConflict {
                spelling: spelling.to_string(),
                other: other.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.exclusive_seen.insert(set, (id, spelling.to_string()));
                Ok(())
            }
        }
    }
}

fn coercion_error(descriptor: &OptionDescriptor, spelling: &str, token: &str) -> DecodeError {
    let expected = match descriptor.kind {
        OptionKind::Scalar(value_type) | OptionKind::Repeatable(value_type) => value_type.as_str(),
        OptionKind::Toggle => "bool",
    };
    DecodeError::Coercion {
        destination: descriptor.destination.clone(),
        spelling: spelling.to_string(),
        token: token.to_string(),
        expected,
    }
}

/// Splits `-name=value` when `-name` is a registered valued spelling.
fn split_inline_value<'t>(
    schema: &Schema,
    token: &'t str,
) -> Option<(DestinationId, &'t str, &'t str)> {
    let (spelling, value) = token.split_once('=')?;
    match schema.resolve_spelling(spelling) {
        Some((id, SpellingAction::Value)) => Some((id, spelling, value)),
        _ => None,
    }
}

/// A following token cannot serve as a value when it is a registered spelling,
/// the terminator, or otherwise option-shaped.
fn is_option_token(schema: &Schema, token: &str) -> bool {
    token == END_OF_OPTIONS
        || schema.resolve_spelling(token).is_some()
        || split_inline_value(schema, token).is_some()
        || looks_like_option(token)
}
