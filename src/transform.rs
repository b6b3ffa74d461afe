use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::DEFAULT_TITLE;
use crate::error::{PrepError, Result};
use crate::normalize::Normalizer;

/// One point of the visualization, flattened from a raw cluster record.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub id: Value,
    pub x: f64,
    pub y: f64,
    pub base_color: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub year: Value,
    pub institution: String,
    pub region: String,
    pub filename: Value,
    pub topic_id: u32,
    pub authors: Vec<String>,
}

/// Builds the output record for one parsed line.
///
/// `raw` must be a JSON object. Pass-through fields (`id`, `year`, `filename`)
/// are copied without coercion; `x`/`y` must be numbers or numeric strings.
pub fn transform_record(
    raw: &Value,
    cluster_id: u32,
    base_color: &str,
    normalizer: &Normalizer,
) -> Result<OutputRecord> {
    let record = raw.as_object().ok_or_else(|| PrepError::InvalidField {
        field: "record",
        reason: format!("expected a JSON object, found {}", json_kind(raw)),
    })?;

    let metadata = normalizer.normalize_record(record);

    Ok(OutputRecord {
        id: passthrough(record, "id"),
        x: coordinate(record, "x")?,
        y: coordinate(record, "y")?,
        base_color: base_color.to_string(),
        title: text_or(record, "title", DEFAULT_TITLE),
        abstract_text: text_or(record, "abstract", ""),
        year: passthrough(record, "year"),
        institution: metadata.institution,
        region: metadata.region,
        filename: passthrough(record, "filename"),
        topic_id: cluster_id,
        authors: authors(record)?,
    })
}

fn passthrough(record: &Map<String, Value>, key: &str) -> Value {
    record.get(key).cloned().unwrap_or(Value::Null)
}

fn text_or(record: &Map<String, Value>, key: &str, default: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(value) => value_text(value),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Absent or null coordinates are 0.0; unparsable ones fail the record.
fn coordinate(record: &Map<String, Value>, key: &'static str) -> Result<f64> {
    let value = match record.get(key) {
        None | Some(Value::Null) => return Ok(0.0),
        Some(value) => value,
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    // NaN and infinities have no JSON representation
    parsed.filter(|v| v.is_finite()).ok_or_else(|| PrepError::InvalidField {
        field: key,
        reason: format!("cannot convert {} to a float", value),
    })
}

fn authors(record: &Map<String, Value>) -> Result<Vec<String>> {
    match record.get("authors") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().map(value_text).collect()),
        Some(other) => Err(PrepError::InvalidField {
            field: "authors",
            reason: format!("expected an array, found {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
