//! Read-only plantation sources.
//!
//! The dashboard's CRUD stores own plantation records; the engine only reads
//! them. A [`PlantationSource`] is anything that can hand over the current
//! collection, e.g. an exported JSON file.
//!
//! Accepted JSON documents:
//! - a bare array of plantations
//! - `{ "plantations": [...] }`
//! - the persisted-store envelope `{ "state": { "plantations": [...] }, "version": N }`
//!
//! Anything else is a contract violation and fails with
//! [`Error::InvalidInput`]. Individual records that fail to parse are skipped
//! with a warning so one bad row does not blank the whole dashboard.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::Plantation;

/// A read-only provider of the current plantation collection.
pub trait PlantationSource {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Load the current plantations.
    fn plantations(&self) -> Result<Vec<Plantation>>;
}

impl PlantationSource for [Plantation] {
    fn describe(&self) -> String {
        format!("in-memory collection ({} plantations)", self.len())
    }

    fn plantations(&self) -> Result<Vec<Plantation>> {
        Ok(self.to_vec())
    }
}

impl PlantationSource for Vec<Plantation> {
    fn describe(&self) -> String {
        self.as_slice().describe()
    }

    fn plantations(&self) -> Result<Vec<Plantation>> {
        Ok(self.clone())
    }
}

/// Plantations exported to a JSON file.
#[derive(Debug, Clone)]
pub struct JsonPlantationFile {
    path: PathBuf,
}

impl JsonPlantationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlantationSource for JsonPlantationFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn plantations(&self) -> Result<Vec<Plantation>> {
        let content = std::fs::read_to_string(&self.path)?;
        let plantations = load_plantations_from_str(&content)?;
        tracing::info!(
            path = %self.path.display(),
            count = plantations.len(),
            "Loaded plantations"
        );
        Ok(plantations)
    }
}

/// Locate the plantation array inside a JSON document.
fn plantation_array(document: Value) -> Result<Vec<Value>> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("plantations") {
                return Ok(items);
            }
            if let Some(Value::Object(mut state)) = map.remove("state") {
                if let Some(Value::Array(items)) = state.remove("plantations") {
                    return Ok(items);
                }
            }
            Err(Error::InvalidInput(
                "expected a plantations array, found an object without one".to_string(),
            ))
        }
        other => Err(Error::InvalidInput(format!(
            "expected a plantations array, found {}",
            json_kind(&other)
        ))),
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

/// Parse plantations from a JSON document.
pub fn load_plantations_from_str(json: &str) -> Result<Vec<Plantation>> {
    let document: Value = serde_json::from_str(json)?;
    let items = plantation_array(document)?;
    let total = items.len();

    let mut plantations = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Plantation>(item) {
            Ok(plantation) => plantations.push(plantation),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed plantation record");
            }
        }
    }

    if plantations.len() < total {
        tracing::warn!(
            skipped = total - plantations.len(),
            total,
            "Some plantation records could not be parsed"
        );
    }

    Ok(plantations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ONE: &str = r#"{
        "id": "p-1",
        "seedName": "Arabica",
        "stage": "planted",
        "startDate": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-02T00:00:00Z",
        "walletAddress": "0xabc"
    }"#;

    #[test]
    fn test_bare_array() {
        let plantations = load_plantations_from_str(&format!("[{ONE}]")).unwrap();
        assert_eq!(plantations.len(), 1);
        assert_eq!(plantations[0].id, "p-1");
    }

    #[test]
    fn test_wrapped_documents() {
        let wrapped = format!(r#"{{"plantations": [{ONE}]}}"#);
        assert_eq!(load_plantations_from_str(&wrapped).unwrap().len(), 1);

        let persisted = format!(r#"{{"state": {{"plantations": [{ONE}, {ONE}]}}, "version": 0}}"#);
        assert_eq!(load_plantations_from_str(&persisted).unwrap().len(), 2);
    }

    #[test]
    fn test_non_array_is_contract_violation() {
        for doc in ["42", "\"plantations\"", "null", r#"{"items": []}"#] {
            let err = load_plantations_from_str(doc).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{doc}: {err}");
        }
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = load_plantations_from_str("[{").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_malformed_records_skipped() {
        let doc = format!(r#"[{ONE}, {{"id": "broken"}}]"#);
        let plantations = load_plantations_from_str(&doc).unwrap();
        assert_eq!(plantations.len(), 1);
    }

    #[test]
    fn test_empty_array() {
        assert!(load_plantations_from_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{ONE}]").unwrap();

        let source = JsonPlantationFile::new(file.path());
        assert_eq!(source.path(), file.path());
        assert_eq!(source.plantations().unwrap().len(), 1);
        assert_eq!(source.describe(), file.path().display().to_string());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = JsonPlantationFile::new("/nonexistent/canopy/plantations.json");
        assert!(matches!(source.plantations(), Err(Error::Io(_))));
    }

    #[test]
    fn test_in_memory_source() {
        let plantations = load_plantations_from_str(&format!("[{ONE}]")).unwrap();
        assert_eq!(plantations.plantations().unwrap(), plantations);
        assert!(plantations.describe().contains("1 plantations"));
    }
}
