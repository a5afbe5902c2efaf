//! CelesTrak OMM JSON arrays
use super::{record_from_fields, Format, OmmFields};
use crate::domain::ElementRecord;
use crate::errors::{ElementsError, ElementsResult};
use serde_json::{Map, Value};

/// Decode a JSON array of OMM objects; one bad object rejects the array.
///
/// Objects go through the same named-field parser as CSV rows and XML
/// segments, so a bad value is reported against its OMM field name.
pub fn parse(text: &str) -> ElementsResult<Vec<ElementRecord>> {
    let objects: Vec<Map<String, Value>> = serde_json::from_str(text)
        .map_err(|e| ElementsError::malformed(Format::Json, e.to_string()))?;

    objects
        .iter()
        .map(|object| record_from_fields(&omm_fields(object)))
        .collect()
}

/// Scalar members as raw text. `null` and nested values count as absent.
fn omm_fields(object: &Map<String, Value>) -> OmmFields {
    let mut fields = OmmFields::default();
    for (name, value) in object {
        match value {
            Value::String(text) => fields.insert(name.as_str(), text.as_str()),
            Value::Number(number) => fields.insert(name.as_str(), number.to_string()),
            Value::Bool(flag) => fields.insert(name.as_str(), flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => {}
        }
    }
    fields
}
