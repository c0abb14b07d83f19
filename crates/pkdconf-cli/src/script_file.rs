use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use pkdconf_core::{ParamValue, ScriptMapping};

/// On-disk notation of a parameter script, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Par,
    Toml,
    Json,
}

impl ScriptFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "par" => Some(Self::Par),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Reads the parameter script at `path` into a mapping keyed by destination.
pub fn load_script_mapping(path: &Path) -> Result<ScriptMapping> {
    let format = ScriptFormat::from_path(path).ok_or_else(|| {
        anyhow!(
            "unsupported parameter script {} (expected .par, .toml or .json)",
            path.display()
        )
    })?;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read parameter script {}", path.display()))?;
    let mapping = match format {
        ScriptFormat::Par => parse_par_script(&raw),
        ScriptFormat::Toml => parse_toml_script(&raw),
        ScriptFormat::Json => parse_json_script(&raw),
    }
    .with_context(|| format!("failed to parse parameter script {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        keys = mapping.len(),
        "loaded parameter script"
    );
    Ok(mapping)
}

/// Parses `name = literal` assignment lines.
///
/// Blank lines, comments, imports and statements that are not a top-level
/// assignment are skipped. A value that leaves a bracket open continues on the
/// following lines.
pub fn parse_par_script(raw: &str) -> Result<ScriptMapping> {
    let mut mapping = ScriptMapping::new();
    let mut lines = raw.lines().enumerate();
    while let Some((index, line)) = lines.next() {
        let line_number = index + 1;
        if line.starts_with(char::is_whitespace) {
            skip_line(line_number, line);
            continue;
        }
        let statement = strip_comment(line).trim();
        if statement.is_empty() {
            continue;
        }
        let Some((name, value)) = split_assignment(statement) else {
            skip_line(line_number, line);
            continue;
        };
        let mut value = value.trim().to_string();
        while bracket_depth(&value) > 0 {
            let Some((_, continuation)) = lines.next() else {
                break;
            };
            value.push(' ');
            value.push_str(strip_comment(continuation).trim());
        }
        let value = parse_literal(&value).ok_or_else(|| {
            anyhow!("line {line_number}: value assigned to `{name}` is not a literal")
        })?;
        mapping.insert(name.to_string(), value);
    }
    Ok(mapping)
}

pub fn parse_toml_script(raw: &str) -> Result<ScriptMapping> {
    let table = raw.parse::<toml::Table>()?;
    table
        .into_iter()
        .map(|(key, value)| {
            let converted = toml_to_param(value)
                .with_context(|| format!("unsupported value for `{key}`"))?;
            Ok((key, converted))
        })
        .collect()
}

pub fn parse_json_script(raw: &str) -> Result<ScriptMapping> {
    let serde_json::Value::Object(object) = serde_json::from_str::<serde_json::Value>(raw)?
    else {
        bail!("top-level JSON value must be an object");
    };
    object
        .into_iter()
        .map(|(key, value)| {
            let converted = json_to_param(value)
                .with_context(|| format!("unsupported value for `{key}`"))?;
            Ok((key, converted))
        })
        .collect()
}

fn skip_line(line_number: usize, line: &str) {
    if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
        tracing::debug!(line_number, "skipping non-assignment parameter line");
    }
}

fn toml_to_param(value: toml::Value) -> Result<ParamValue> {
    Ok(match value {
        toml::Value::String(text) => ParamValue::Text(text),
        toml::Value::Integer(number) => ParamValue::Int(number),
        toml::Value::Float(number) => ParamValue::Float(number),
        toml::Value::Boolean(flag) => ParamValue::Bool(flag),
        toml::Value::Datetime(datetime) => ParamValue::Text(datetime.to_string()),
        toml::Value::Array(items) => ParamValue::List(
            items
                .into_iter()
                .map(toml_to_param)
                .collect::<Result<Vec<_>>>()?,
        ),
        toml::Value::Table(_) => bail!("nested tables are not parameters"),
    })
}

fn json_to_param(value: serde_json::Value) -> Result<ParamValue> {
    Ok(match value {
        serde_json::Value::Null => ParamValue::Unset,
        serde_json::Value::Bool(flag) => ParamValue::Bool(flag),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(integer) => ParamValue::Int(integer),
            None => number
                .as_f64()
                .map(ParamValue::Float)
                .ok_or_else(|| anyhow!("number {number} is out of range"))?,
        },
        serde_json::Value::String(text) => ParamValue::Text(text),
        serde_json::Value::Array(items) => ParamValue::List(
            items
                .into_iter()
                .map(json_to_param)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_json::Value::Object(_) => bail!("nested objects are not parameters"),
    })
}

/// Tracks whether a scan sits inside a quoted string, honouring backslash
/// escapes.
#[derive(Debug, Default)]
struct QuoteState {
    open: Option<char>,
    escaped: bool,
}

impl QuoteState {
    /// Advances over `character` and reports whether it is code rather than
    /// part of a string literal.
    fn is_code(&mut self, character: char) -> bool {
        match self.open {
            None if matches!(character, '\'' | '"') => {
                self.open = Some(character);
                false
            }
            None => true,
            Some(open) => {
                if self.escaped {
                    self.escaped = false;
                } else if character == '\\' {
                    self.escaped = true;
                } else if character == open {
                    self.open = None;
                }
                false
            }
        }
    }
}

fn strip_comment(line: &str) -> &str {
    let mut quotes = QuoteState::default();
    for (offset, character) in line.char_indices() {
        if quotes.is_code(character) && character == '#' {
            return &line[..offset];
        }
    }
    line
}

/// Open brackets minus closed brackets outside string literals.
fn bracket_depth(text: &str) -> i64 {
    let mut quotes = QuoteState::default();
    text.chars()
        .filter(|character| quotes.is_code(*character))
        .map(|character| match character {
            '[' | '(' => 1,
            ']' | ')' => -1,
            _ => 0,
        })
        .sum()
}

fn split_assignment(statement: &str) -> Option<(&str, &str)> {
    let (name, value) = statement.split_once('=')?;
    if value.starts_with('=') {
        return None;
    }
    let name = name.trim();
    let mut characters = name.chars();
    let first = characters.next()?;
    let is_identifier = (first.is_ascii_alphabetic() || first == '_')
        && characters.all(|character| character.is_ascii_alphanumeric() || character == '_');
    is_identifier.then_some((name, value))
}

fn parse_literal(text: &str) -> Option<ParamValue> {
    match text {
        "True" => return Some(ParamValue::Bool(true)),
        "False" => return Some(ParamValue::Bool(false)),
        "None" => return Some(ParamValue::Unset),
        _ => {}
    }
    if let Some(inner) = strip_delimiters(text, '[', ']') {
        return parse_sequence(inner);
    }
    if let Some(inner) = strip_delimiters(text, '(', ')') {
        // Parentheses without a top-level comma only group.
        if inner.trim().is_empty() || split_top_level(inner).len() > 1 {
            return parse_sequence(inner);
        }
        return parse_literal(inner.trim());
    }
    if text.starts_with(|character: char| character == '\'' || character == '"') {
        return parse_string(text).map(ParamValue::Text);
    }
    parse_number(text)
}

fn parse_sequence(inner: &str) -> Option<ParamValue> {
    let pieces = split_top_level(inner);
    let last = pieces.len() - 1;
    let mut items = Vec::new();
    for (position, item) in pieces.into_iter().enumerate() {
        let item = item.trim();
        if item.is_empty() && position == last {
            continue;
        }
        let value = parse_literal(item)?;
        if matches!(value, ParamValue::List(_)) {
            return None;
        }
        items.push(value);
    }
    Some(ParamValue::List(items))
}

/// Splits on commas that sit outside strings and nested brackets.
fn split_top_level(inner: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut quotes = QuoteState::default();
    let mut depth = 0i64;
    let mut start = 0;
    for (offset, character) in inner.char_indices() {
        if !quotes.is_code(character) {
            continue;
        }
        match character {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(&inner[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    pieces.push(&inner[start..]);
    pieces
}

fn strip_delimiters(text: &str, open: char, close: char) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    text.strip_prefix(open)?.strip_suffix(close)
}

/// Decodes one quoted string literal. The closing quote must end `text`.
fn parse_string(text: &str) -> Option<String> {
    let mut characters = text.chars();
    let quote = characters.next()?;
    let mut decoded = String::new();
    let mut closed = false;
    while let Some(character) = characters.next() {
        if closed {
            return None;
        }
        match character {
            '\\' => match characters.next()? {
                'n' => decoded.push('\n'),
                't' => decoded.push('\t'),
                escaped @ ('\\' | '\'' | '"') => decoded.push(escaped),
                other => {
                    decoded.push('\\');
                    decoded.push(other);
                }
            },
            _ if character == quote => closed = true,
            _ => decoded.push(character),
        }
    }
    closed.then_some(decoded)
}

fn parse_number(text: &str) -> Option<ParamValue> {
    let compact = text.replace('_', "");
    if let Ok(integer) = compact.parse::<i64>() {
        return Some(ParamValue::Int(integer));
    }
    let looks_numeric = compact
        .chars()
        .all(|character| character.is_ascii_digit() || matches!(character, '.' | 'e' | 'E' | '+' | '-'));
    if !looks_numeric {
        return None;
    }
    compact.parse::<f64>().ok().map(ParamValue::Float)
}
