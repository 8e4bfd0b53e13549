//! Go modules extractor
//!
//! `go mod graph` prints one `parent child` edge per line, every vertex a
//! `module@version` token except the main module, which has no version and
//! takes the precalculated main-module version instead. The first line's
//! parent is the root. An optional minimal-version-selection pass rewrites
//! every vertex to the version actually selected by the build, read from a
//! `go list -m all` side table.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

use crate::application::errors::AnalysisError;
use crate::domain::vcs::main_module_version;
use crate::domain::{PackageRef, Sbom};
use crate::infrastructure::extractors::{AnalysisDepth, ExtractionInput};

static VERTEX_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new("@").unwrap());

const GO_HOST_OS_ENV: &str = "GOHOSTOS";
const GO_HOST_ARCH_ENV: &str = "GOHOSTARCH";

pub fn extract(input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
    let qualifiers = purl_qualifiers(input.aux.go_env);
    let main_version = main_module_version(input.aux.tag_info);

    let mut edges: Vec<(&str, &str)> = Vec::new();
    for line in input.tool_output.lines().filter(|l| !l.trim().is_empty()) {
        let mut parts = line.split_whitespace();
        let (Some(parent), Some(child)) = (parts.next(), parts.next()) else {
            return Err(AnalysisError::UnexpectedOutput {
                reason: format!("module graph line is not an edge: {line:?}"),
            });
        };
        edges.push((parent, child));
    }
    let Some(&(root_vertex, _)) = edges.first() else {
        return Err(AnalysisError::UnexpectedOutput {
            reason: "empty module graph".to_string(),
        });
    };

    if input.settings.match_manifest_versions {
        check_manifest_versions(&edges, root_vertex, input.manifest)?;
    }

    let selected = if input.settings.go_mvs_logic_enabled {
        selected_versions(input.aux.go_selected_versions.unwrap_or(""))
    } else {
        HashMap::new()
    };

    let to_ref = |vertex: &str| -> Result<PackageRef, AnalysisError> {
        PackageRef::golang(
            &with_selected_version(&selected, vertex),
            &VERTEX_DELIMITER,
            &main_version,
            &qualifiers,
        )
    };

    let root = to_ref(root_vertex)?;
    tracing::debug!(root = %root, edges = edges.len(), "parsing go module graph");
    let mut sbom = Sbom::new();
    sbom.add_root(root.clone());
    match input.depth {
        AnalysisDepth::Stack => {
            for (parent, child) in &edges {
                sbom.add_dependency(&to_ref(parent)?, &to_ref(child)?, None);
            }
        }
        AnalysisDepth::Component => {
            for (_, child) in edges.iter().filter(|(p, _)| *p == root_vertex) {
                sbom.add_dependency(&root, &to_ref(child)?, None);
            }
        }
    }
    Ok(sbom)
}

/// Purl qualifiers for every Go coordinate: always `type=module`, plus the
/// host platform when a `go env` dump is available.
pub(crate) fn purl_qualifiers(go_env: Option<&str>) -> BTreeMap<String, String> {
    let mut qualifiers = BTreeMap::new();
    qualifiers.insert("type".to_string(), "module".to_string());
    if let Some(env) = go_env {
        if let Some(arch) = env_value(env, GO_HOST_ARCH_ENV) {
            qualifiers.insert("goarch".to_string(), arch);
        }
        if let Some(os) = env_value(env, GO_HOST_OS_ENV) {
            qualifiers.insert("goos".to_string(), os);
        }
    }
    qualifiers
}

fn env_value(go_env: &str, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    go_env.lines().find_map(|line| {
        line.trim()
            .strip_prefix(&prefix)
            .map(|v| v.replace('"', ""))
    })
}

/// `go list -m all` line format: `module selected-version`. Lines with any
/// other shape (the versionless main module included) are skipped.
fn selected_versions(listing: &str) -> HashMap<String, String> {
    listing
        .lines()
        .filter_map(|line| {
            let mut parts = line.trim().split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(module), Some(version), None) => {
                    Some((module.to_string(), version.to_string()))
                }
                _ => None,
            }
        })
        .collect()
}

fn with_selected_version(selected: &HashMap<String, String>, vertex: &str) -> String {
    let Some((module, _)) = vertex.split_once('@') else {
        return vertex.to_string();
    };
    match selected.get(module) {
        Some(version) => format!("{module}@{version}"),
        None => vertex.to_string(),
    }
}

/// Compare the root's direct graph children against the versions the
/// manifest requires. Any divergence aborts the analysis; the error names
/// the toggle that relaxes the check.
fn check_manifest_versions(
    edges: &[(&str, &str)],
    root_vertex: &str,
    manifest: &str,
) -> Result<(), AnalysisError> {
    let required = manifest_requirements(manifest);
    for (_, child) in edges.iter().filter(|(p, _)| *p == root_vertex) {
        let Some((name, installed)) = child.split_once('@') else {
            continue;
        };
        if let Some(manifest_version) = required.get(name) {
            if manifest_version != installed {
                return Err(AnalysisError::VersionMismatch {
                    name: name.to_string(),
                    manifest_version: manifest_version.clone(),
                    installed_version: installed.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// All `require` entries of a go.mod, single-line and block form alike.
/// Replace directives and lines without a version are skipped.
fn manifest_requirements(manifest: &str) -> HashMap<String, String> {
    let mut requirements = HashMap::new();
    let mut in_block = false;
    for line in manifest.lines() {
        let line = match line.split_once("//") {
            Some((code, _)) => code.trim(),
            None => line.trim(),
        };
        if line.is_empty() || line.contains("=>") {
            continue;
        }
        if in_block {
            if line.starts_with(')') {
                in_block = false;
                continue;
            }
            insert_requirement(&mut requirements, line);
        } else if line.starts_with("require") && line.contains('(') {
            in_block = true;
        } else if let Some(rest) = line.strip_prefix("require ") {
            insert_requirement(&mut requirements, rest);
        }
    }
    requirements
}

fn insert_requirement(requirements: &mut HashMap<String, String>, entry: &str) {
    let mut parts = entry.split_whitespace();
    if let (Some(name), Some(version)) = (parts.next(), parts.next()) {
        requirements.insert(name.to_string(), version.to_string());
    }
}
