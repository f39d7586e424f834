//! JSON-schema validation of taxonomy documents.
//!
//! Only available with the `schema-validation` feature. The schema itself is
//! not interpreted here; documents are handed to `jsonschema` as read.

use serde_json::Value;

use crate::{Error, Result};

/// Validates one raw taxonomy document against `schema`.
pub(crate) fn validate(namespace: &str, document: &Value, schema: &Value) -> Result<()> {
    let validator = jsonschema::validator_for(schema).map_err(|e| Error::InvalidSchema {
        message: e.to_string(),
    })?;
    let violations: Vec<String> = validator
        .iter_errors(document)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::SchemaViolation {
            namespace: namespace.to_string(),
            violations,
        })
    }
}
