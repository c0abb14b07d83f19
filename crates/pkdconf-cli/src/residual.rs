use pkdconf_core::{DISABLE_PREFIX, ENABLE_PREFIX};

/// Command-line tokens the schema did not claim, destined for the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidualArguments {
    /// First positional token, usually the parameter or analysis script.
    pub entry_point: Option<String>,
    /// Remaining unclaimed tokens in their original order.
    pub tokens: Vec<String>,
}

impl ResidualArguments {
    /// Takes the first non-empty positional token as the entry point and
    /// queues everything else.
    pub fn accept(&mut self, token: &str) {
        if self.entry_point.is_none() && !token.is_empty() && !looks_like_option(token) {
            self.entry_point = Some(token.to_string());
        } else {
            self.tokens.push(token.to_string());
        }
    }

    /// Queues tokens without considering them for the entry point.
    pub fn extend_verbatim<I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.tokens.extend(tokens);
    }

    /// Argument vector for the engine: the entry point (or `program_name`)
    /// followed by the unclaimed tokens.
    pub fn engine_argv(&self, program_name: &str) -> Vec<String> {
        let program = self.entry_point.as_deref().unwrap_or(program_name);
        std::iter::once(program.to_string())
            .chain(self.tokens.iter().cloned())
            .collect()
    }
}

/// Whether a token is spelled like an option rather than a positional value.
/// Negative numbers and a bare sign count as positional.
pub fn looks_like_option(token: &str) -> bool {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if first != ENABLE_PREFIX && first != DISABLE_PREFIX {
        return false;
    }
    if chars.as_str().is_empty() {
        return false;
    }
    !(first == DISABLE_PREFIX && is_plain_number(chars.as_str()))
}

fn is_plain_number(text: &str) -> bool {
    let mut saw_digit = false;
    let mut saw_dot = false;
    for character in text.chars() {
        match character {
            '0'..='9' => saw_digit = true,
            '.' if !saw_dot => saw_dot = true,
            _ => return false,
        }
    }
    saw_digit
}
