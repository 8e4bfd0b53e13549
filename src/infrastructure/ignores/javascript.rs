//! package.json scanner
//!
//! JSON has no comments, so the npm family reserves a top-level manifest
//! array instead: `"sbomignore": ["name", ...]`. Entries are package names,
//! never coordinates.

use serde_json::Value;

use super::{IgnoreEntry, IGNORE_MARKER};
use crate::application::errors::AnalysisError;

pub fn ignored_deps(manifest: &str) -> Result<Vec<IgnoreEntry>, AnalysisError> {
    let content: Value =
        serde_json::from_str(manifest).map_err(|e| AnalysisError::InvalidManifest {
            reason: format!("package.json is not valid JSON: {e}"),
        })?;
    Ok(content
        .get(IGNORE_MARKER)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(|name| IgnoreEntry::Name(name.to_string()))
                .collect()
        })
        .unwrap_or_default())
}
