//! Loading result records exported by the results API

use crate::error::{BenchLensError, Result};
use crate::types::TestRun;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Accepted JSON layouts: a bare array, or the API's `{"data": [...]}`
/// envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordDocument {
    Records(Vec<TestRun>),
    Envelope { data: Vec<TestRun> },
}

/// Parse records from a JSON document
pub fn parse_records(content: &str) -> Result<Vec<TestRun>> {
    let document: RecordDocument = serde_json::from_str(content).map_err(|e| {
        BenchLensError::InvalidDataset(format!(
            "expected a record array or {{\"data\": [...]}}: {}",
            e
        ))
    })?;

    Ok(match document {
        RecordDocument::Records(records) => records,
        RecordDocument::Envelope { data } => data,
    })
}

/// Load records from a JSON file
pub fn load_records(path: &Path) -> Result<Vec<TestRun>> {
    let content = std::fs::read_to_string(path)?;
    let records = parse_records(&content)?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
