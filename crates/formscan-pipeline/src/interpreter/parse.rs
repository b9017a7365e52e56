//! Parse boundary between the model reply and the field mapping.
//!
//! Nothing past this module sees untyped JSON.

use formscan_core::types::{FieldMapping, Schema};
use serde_json::{Map, Value};

/// Keys of the nested date shape, in day/month/year order.
const DATE_KEYS: [[&str; 3]; 2] = [["day", "month", "year"], ["יום", "חודש", "שנה"]];

/// A reply that fits the schema's shape.
#[derive(Debug)]
pub(super) struct ParsedReply {
    pub fields: FieldMapping,
    pub warnings: Vec<String>,
}

/// Parses a model reply into a schema-shaped mapping.
///
/// Returns the failure reason if the reply is not a JSON object or a schema
/// field holds a value that cannot be read as a string.
pub(super) fn parse_reply(content: &str, schema: &Schema) -> Result<ParsedReply, String> {
    let object = parse_object(content)?;

    let mut entries = Vec::with_capacity(object.len());
    flatten(None, object, schema, &mut entries);

    let mut fields = FieldMapping::for_schema(schema);
    let mut warnings = Vec::new();
    for (key, value) in entries {
        if schema.contains(&key) {
            let value = coerce(&key, value, &mut warnings)?;
            fields.set(&key, value);
        } else {
            warnings.push(format!("Dropped unknown field '{}' from model reply", key));
        }
    }

    Ok(ParsedReply { fields, warnings })
}

fn parse_object(content: &str) -> Result<Map<String, Value>, String> {
    let body = strip_code_fences(content);
    if body.is_empty() {
        return Err("reply is empty".to_owned());
    }

    let value = serde_json::from_str::<Value>(body).or_else(|error| {
        embedded_object(body)
            .and_then(|inner| serde_json::from_str::<Value>(inner).ok())
            .ok_or_else(|| format!("reply is not valid JSON: {}", error))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected a JSON object, got {}", kind(&other))),
    }
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip an info string such as `json`.
    let rest = if rest.trim_start().starts_with('{') {
        rest
    } else {
        rest.split_once('\n').map_or("", |(_, body)| body)
    };

    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn embedded_object(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

/// Flattens nested sections whose dotted names are schema fields.
fn flatten(
    prefix: Option<&str>,
    object: Map<String, Value>,
    schema: &Schema,
    out: &mut Vec<(String, Value)>,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key,
        };

        if schema.contains(&name) {
            out.push((name, value));
            continue;
        }

        match value {
            Value::Object(inner) if is_section(&name, schema) => {
                flatten(Some(&name), inner, schema, out)
            }
            value => out.push((name, value)),
        }
    }
}

fn is_section(name: &str, schema: &Schema) -> bool {
    let prefix = format!("{}.", name);
    schema.field_names().any(|field| field.starts_with(&prefix))
}

fn coerce(name: &str, value: Value, warnings: &mut Vec<String>) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(scalar(&s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Object(map) => match date_parts(&map) {
            Some([Some(day), Some(month), Some(year)]) => {
                Ok(Some(format!("{:0>2}/{:0>2}/{}", day, month, year)))
            }
            Some([None, None, None]) => Ok(None),
            Some(_) => {
                warnings.push(format!("Ignored incomplete date for field '{}'", name));
                Ok(None)
            }
            None => Err(format!("field '{}' holds a nested object", name)),
        },
        Value::Array(_) => Err(format!("field '{}' holds an array", name)),
    }
}

fn scalar(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Reads a `{day, month, year}` object; `None` if the object has another shape.
fn date_parts(map: &Map<String, Value>) -> Option<[Option<String>; 3]> {
    if map.is_empty() {
        return None;
    }

    DATE_KEYS.iter().find_map(|keys| {
        if !map.keys().all(|k| keys.contains(&k.as_str())) {
            return None;
        }

        let mut parts: [Option<String>; 3] = Default::default();
        for (slot, key) in parts.iter_mut().zip(keys) {
            *slot = match map.get(*key) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => scalar(s),
                Some(Value::Number(n)) => Some(n.to_string()),
                Some(_) => return None,
            };
        }
        Some(parts)
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
