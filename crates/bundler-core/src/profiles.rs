//! Profile catalog parsing

use crate::error::{BundleError, Result};
use serde_json::Value;

/// Top-level profile names of a catalog, in document order
pub fn profile_names(catalog: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(catalog).map_err(|source| BundleError::ParseFailure {
        what: "profile catalog",
        source,
    })?;

    match value {
        Value::Object(profiles) => Ok(profiles.keys().cloned().collect()),
        other => Err(BundleError::ParseFailure {
            what: "profile catalog",
            source: serde::de::Error::custom(format!(
                "expected a JSON object of profiles, found {}",
                json_kind(&other)
            )),
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
