// ExifTool output parsing for camera metadata

use std::path::Path;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::Result;
use crate::tools::CommandTemplate;

/// One `Key : Value` line of exiftool output, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExifEntry {
    pub key: String,
    pub value: Value,
}

impl ExifEntry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        ExifEntry {
            key: key.into(),
            value,
        }
    }
}

/// Run exiftool and parse whatever it printed.
pub fn extract(template: &CommandTemplate, path: &Path) -> Result<Vec<ExifEntry>> {
    let text = template.run(path)?;
    let entries = parse(&text);
    log::debug!("exiftool reported {} tags for {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse exiftool's human-readable dump.
/// Lines split at the first colon; duplicate keys are kept in order.
pub fn parse(text: &str) -> Vec<ExifEntry> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(ExifEntry::new(key, coerce_value(value.trim())))
        })
        .collect()
}

/// Coercions tried in order; the first that succeeds wins.
const COERCIONS: [fn(&str) -> Option<Value>; 3] = [parse_int, parse_unsigned, parse_float];

/// Integer, then float, else the string as-is. Digit strings too long for
/// `u64` (serial numbers, IDs) stay strings rather than losing digits.
pub fn coerce_value(raw: &str) -> Value {
    COERCIONS
        .iter()
        .find_map(|coerce| coerce(raw))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_int(raw: &str) -> Option<Value> {
    raw.parse::<i64>().ok().map(Value::from)
}

fn parse_unsigned(raw: &str) -> Option<Value> {
    raw.parse::<u64>().ok().map(Value::from)
}

fn parse_float(raw: &str) -> Option<Value> {
    if is_integer_text(raw) {
        return None;
    }
    // Number::from_f64 rejects NaN and infinities, which stay strings
    raw.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}

fn is_integer_text(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
