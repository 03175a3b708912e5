//! Custom deserializers for flexible parameter parsing in servicenow-mcp.
//!
//! Agents do not always send arguments with the exact JSON type the schema
//! advertises. These accept the common alternatives and normalize them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes an integer that may arrive as a number or numeric string.
///
/// # Accepted Formats
///
/// * **Integer**: `5`
/// * **Float**: `5.0` (rounded)
/// * **String numeric**: `"5"`
/// * **Empty string / null**: treated as absent
///
/// ```json
/// { "limit": 25 }
/// { "limit": "25" }
/// ```
pub fn de_option_i64_forgiving<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let opt = Option::<Value>::deserialize(deserializer)?;
    let Some(v) = opt else { return Ok(None) };
    match v {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Some(i64::try_from(u).unwrap_or(i64::MAX)))
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                Ok(Some(f.round() as i64))
            } else {
                Err(D::Error::custom("invalid numeric for integer"))
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Some(i));
            }
            match s.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Some(f.round() as i64)),
                _ => Err(D::Error::custom(format!("Invalid integer '{}'", s))),
            }
        }
        other => Err(D::Error::custom(format!(
            "invalid type for integer: {}",
            other
        ))),
    }
}

/// Deserializes a field projection as the comma-separated string the Table
/// API expects.
///
/// # Accepted Formats
///
/// * **String**: `"number,short_description"` (passed through)
/// * **Array of strings**: `["number", "short_description"]` (joined with `,`)
pub fn de_field_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let opt = Option::<Value>::deserialize(deserializer)?;
    match opt {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Array(items)) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => names.push(s),
                    other => {
                        return Err(D::Error::custom(format!(
                            "field names must be strings, got {}",
                            other
                        )));
                    }
                }
            }
            Ok(names.join(","))
        }
        Some(other) => Err(D::Error::custom(format!(
            "invalid type for field list: {}",
            other
        ))),
    }
}

/// Deserializes a record payload as JSON text.
///
/// The tool contract is a JSON-encoded string, but agents frequently send the
/// object itself. Objects are re-encoded so the usual parse step still runs.
/// Strings are kept verbatim, malformed or not.
pub fn de_payload_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Deserializes an optional string where `null` means empty.
pub fn de_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
