//! Forgiving field deserializers for configurations coming from the browser.
//!
//! The client edits configurations as loosely typed form state and users can
//! import hand-edited JSON, so scalar fields arrive as strings, numbers, booleans
//! or `null`. These helpers coerce them once, at the boundary, so the rest of the
//! system only ever sees the typed model.

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::command::Permission;

/// Coerce any scalar to a string; `null` becomes empty.
pub fn string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string, found {}",
            kind(&other)
        ))),
    }
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` are false.
pub fn truthy<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Opt-out flags: only a literal `false` turns them off.
pub fn not_false<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(!matches!(Value::deserialize(de)?, Value::Bool(false)))
}

/// Whole seconds from a number or numeric string; negatives and garbage clamp to 0.
pub fn seconds<'de, D>(de: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(de)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match raw {
        Some(f) if f.is_finite() && f > 0.0 => f.floor() as u64,
        _ => 0,
    })
}

/// Sequences default to empty when absent, `null` or not an array.
pub fn seq<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(de)? {
        Value::Array(items) => serde_json::from_value(Value::Array(items)).map_err(D::Error::custom),
        _ => Ok(Vec::new()),
    }
}

/// Falls back to `T::default()` for `null` or anything that does not parse.
pub fn or_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(de)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Permission names from an array (or a comma-separated string). Unknown names
/// are dropped so an old export never blocks an import.
pub fn permissions<'de, D>(de: D) -> Result<Vec<Permission>, D::Error>
where
    D: Deserializer<'de>,
{
    let names: Vec<String> = match Value::deserialize(de)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        Value::String(s) => s.split(',').map(|p| p.trim().to_owned()).collect(),
        _ => Vec::new(),
    };

    let mut out = Vec::with_capacity(names.len());
    for name in names.iter().filter(|n| !n.is_empty()) {
        match name.parse::<Permission>() {
            Ok(p) if !out.contains(&p) => out.push(p),
            Ok(_) => {}
            Err(_) => tracing::warn!(permission = %name, "Dropping unknown permission"),
        }
    }
    Ok(out)
}

pub(crate) fn default_true() -> bool {
    true
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
