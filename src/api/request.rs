use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::validation::{validate, ItemShape};

/// Identifier supplied by the URL path, e.g. `itemId` in `/items/{itemId}`
#[derive(Debug, Clone, Copy)]
pub struct PathIdentifier<'a> {
    pub field: &'static str,
    pub value: Option<&'a str>,
}

impl<'a> PathIdentifier<'a> {
    pub fn new(field: &'static str, value: Option<&'a str>) -> Self {
        Self { field, value }
    }
}

/// Decode, reconcile and validate a request body.
///
/// When `path` is given, its value must be present. A body value for the same
/// field must agree with it; an omitted or blank (`null`, `""`, `0`, `false`)
/// body value is filled in from the path. Nothing here touches storage.
pub fn parse_request_body<T: DeserializeOwned>(
    body: &[u8],
    shape: ItemShape,
    path: Option<PathIdentifier<'_>>,
) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::invalid_json())?;

    let mut record = match value {
        Value::Object(map) => map,
        _ => return Err(ApiError::bad_request("Request body must be a JSON object")),
    };

    if let Some(PathIdentifier { field, value }) = path {
        let url_key = value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("Missing {} in URL", field)))?;

        match record.get(field) {
            None => {}
            Some(value) if is_blank(value) => {}
            Some(Value::String(s)) if s == url_key => {}
            Some(_) => {
                return Err(ApiError::bad_request(format!(
                    "Bad request - {} in body and URL do not match",
                    field
                )))
            }
        }

        record.insert(field.to_string(), Value::String(url_key.to_string()));
    }

    validate(shape, &mut record)?;

    serde_json::from_value(Value::Object(record)).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
