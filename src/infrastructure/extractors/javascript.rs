//! npm and pnpm extractors
//!
//! `npm ls --all --json` prints a nested object: the root package's name and
//! version at the top, then a `dependencies` object per node keyed by package
//! name, each entry carrying a resolved `version` and its own nested
//! `dependencies`. pnpm prints the same shape wrapped in a one-project array.
//! Entries without a `version` field are unresolved optional dependencies
//! and are skipped together with their subtree.

use serde_json::Value;

use crate::application::errors::AnalysisError;
use crate::domain::{PackageRef, Sbom};
use crate::infrastructure::extractors::{AnalysisDepth, ExtractionInput};

pub fn extract(input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
    let listing: Value =
        serde_json::from_str(input.tool_output).map_err(|e| AnalysisError::UnexpectedOutput {
            reason: format!("package listing is not valid JSON: {e}"),
        })?;
    // pnpm wraps the project in a single-element array
    let project = match &listing {
        Value::Array(items) => items.first().ok_or_else(|| AnalysisError::UnexpectedOutput {
            reason: "empty project array in package listing".to_string(),
        })?,
        other => other,
    };

    let root = PackageRef::npm(
        string_field(project, "name")?,
        string_field(project, "version")?,
    );
    tracing::debug!(root = %root, "parsing npm dependency listing");
    let mut sbom = Sbom::new();
    sbom.add_root(root.clone());
    if let Some(dependencies) = project.get("dependencies").and_then(Value::as_object) {
        let transitive = input.depth == AnalysisDepth::Stack;
        add_dependencies_of(&mut sbom, &root, dependencies, transitive);
    }
    Ok(sbom)
}

fn add_dependencies_of(
    sbom: &mut Sbom,
    from: &PackageRef,
    dependencies: &serde_json::Map<String, Value>,
    transitive: bool,
) {
    for (name, node) in dependencies {
        let Some(version) = node.get("version").and_then(Value::as_str) else {
            continue;
        };
        let package = PackageRef::npm(name, version);
        sbom.add_dependency(from, &package, None);
        if transitive {
            if let Some(nested) = node.get("dependencies").and_then(Value::as_object) {
                add_dependencies_of(sbom, &package, nested, true);
            }
        }
    }
}

fn string_field<'a>(node: &'a Value, field: &str) -> Result<&'a str, AnalysisError> {
    node.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AnalysisError::MissingField {
            field: field.to_string(),
        })
}
