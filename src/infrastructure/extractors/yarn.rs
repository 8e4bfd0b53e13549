//! Yarn classic and berry extractors
//!
//! Yarn 1.x (`yarn list --json`) prints `data.trees`, a flat array of
//! `name@version` nodes with nested `children`. A child marked `shadow` is a
//! back-reference to some top-level node of the same name, not a node of its
//! own, so edges are resolved through a name-keyed table built over the
//! top-level entries first.
//!
//! Yarn 2+ (`yarn info --json`) streams one JSON object per package locator.
//! The stream is massaged into a single array, the `@workspace:.` locator is
//! the project itself, and `@virtual:<hash>#npm:` locators collapse to their
//! concrete version.
//!
//! Neither listing names the project root; that comes from package.json.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::application::errors::AnalysisError;
use crate::domain::{PackageRef, Sbom};
use crate::infrastructure::extractors::{AnalysisDepth, ExtractionInput};

static LOCATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(@?[^@]+(?:/[^@]+)?)@npm:(.+)$").unwrap());
static VIRTUAL_LOCATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(@?[^@]+(?:/[^@]+)?)@virtual:[^#]+#npm:(.+)$").unwrap());

const WORKSPACE_ROOT_SUFFIX: &str = "@workspace:.";

/// The parts of package.json both processors need
struct JsManifest {
    root: PackageRef,
    direct_dependencies: HashSet<String>,
}

fn parse_manifest(manifest: &str) -> Result<JsManifest, AnalysisError> {
    let content: Value =
        serde_json::from_str(manifest).map_err(|e| AnalysisError::InvalidManifest {
            reason: format!("package.json is not valid JSON: {e}"),
        })?;
    let name = content
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| AnalysisError::MissingField {
            field: "name".to_string(),
        })?;
    let version = content
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| AnalysisError::MissingField {
            field: "version".to_string(),
        })?;
    let direct_dependencies = content
        .get("dependencies")
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default();
    Ok(JsManifest {
        root: PackageRef::npm(name, version),
        direct_dependencies,
    })
}

/// Split a `name@version` token at the last `@`, so scoped names like
/// `@babel/core@7.21.0` keep their leading `@`.
fn split_name_version(token: &str) -> Option<(&str, &str)> {
    let idx = token.rfind('@').filter(|&i| i > 0)?;
    Some((&token[..idx], &token[idx + 1..]))
}

pub fn extract_classic(input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
    let manifest = parse_manifest(input.manifest)?;
    let listing: Value =
        serde_json::from_str(input.tool_output).map_err(|e| AnalysisError::UnexpectedOutput {
            reason: format!("yarn list output is not valid JSON: {e}"),
        })?;
    let trees = listing
        .get("data")
        .and_then(|d| d.get("trees"))
        .and_then(Value::as_array);

    let mut sbom = Sbom::new();
    sbom.add_root(manifest.root.clone());
    let Some(trees) = trees else {
        return Ok(sbom);
    };
    tracing::debug!(root = %manifest.root, nodes = trees.len(), "parsing yarn classic listing");

    // First pass: the top-level entries are the real nodes; shadow children
    // resolve against this table by name.
    let mut by_name: HashMap<String, PackageRef> = HashMap::new();
    for node in trees {
        let Some(meta) = NodeMeta::parse(node) else {
            continue;
        };
        if manifest.direct_dependencies.contains(&meta.name) {
            sbom.add_dependency(&manifest.root, &meta.package, None);
        }
        by_name.insert(meta.name, meta.package);
    }

    if input.depth == AnalysisDepth::Stack {
        for node in trees {
            add_children(&mut sbom, node, &by_name);
        }
    }
    Ok(sbom)
}

fn add_children(sbom: &mut Sbom, node: &Value, by_name: &HashMap<String, PackageRef>) {
    let Some(parent) = NodeMeta::parse(node) else {
        return;
    };
    let Some(children) = node.get("children").and_then(Value::as_array) else {
        return;
    };
    for child_node in children {
        let Some(child) = NodeMeta::parse(child_node) else {
            continue;
        };
        let from = if parent.shadow {
            by_name.get(&parent.name)
        } else {
            Some(&parent.package)
        };
        let target = if child.shadow {
            by_name.get(&child.name)
        } else {
            Some(&child.package)
        };
        if let (Some(from), Some(target)) = (from, target) {
            sbom.add_dependency(from, target, None);
        }
        add_children(sbom, child_node, by_name);
    }
}

struct NodeMeta {
    name: String,
    package: PackageRef,
    shadow: bool,
}

impl NodeMeta {
    fn parse(node: &Value) -> Option<Self> {
        let token = node.get("name").and_then(Value::as_str)?;
        let (name, version) = split_name_version(token)?;
        Some(Self {
            name: name.to_string(),
            package: PackageRef::npm(name, version),
            shadow: node
                .get("shadow")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

/// Join the newline-delimited object stream `yarn info --json` emits into
/// one parseable JSON array.
fn normalize_berry_output(output: &str) -> String {
    let joined: String = output.trim().split(|c| c == '\n' || c == '\r').collect();
    format!("[{}]", joined.replace("}{", "},{"))
}

pub fn extract_berry(input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
    let manifest = parse_manifest(input.manifest)?;
    let normalized = normalize_berry_output(input.tool_output);
    let nodes: Vec<Value> =
        serde_json::from_str(&normalized).map_err(|e| AnalysisError::UnexpectedOutput {
            reason: format!("yarn info output is not valid JSON: {e}"),
        })?;
    tracing::debug!(root = %manifest.root, nodes = nodes.len(), "parsing yarn berry listing");

    let mut sbom = Sbom::new();
    sbom.add_root(manifest.root.clone());
    for node in &nodes {
        let Some(value) = node.get("value").and_then(Value::as_str) else {
            continue;
        };
        let is_root = value.ends_with(WORKSPACE_ROOT_SUFFIX);
        if input.depth == AnalysisDepth::Component && !is_root {
            continue;
        }
        let from = if is_root {
            Some(manifest.root.clone())
        } else {
            node_package(value, node)
        };
        let Some(from) = from else {
            continue;
        };
        let Some(deps) = node
            .get("children")
            .and_then(|c| c.get("Dependencies"))
            .and_then(Value::as_array)
        else {
            continue;
        };
        for dep in deps {
            let Some(locator) = dep.get("locator").and_then(Value::as_str) else {
                continue;
            };
            if let Some(target) = package_from_locator(locator) {
                sbom.add_dependency(&from, &target, None);
            }
        }
    }
    Ok(sbom)
}

/// A berry node's identity: name from its locator, resolved version from
/// its `children.Version` field.
fn node_package(value: &str, node: &Value) -> Option<PackageRef> {
    let (name, _) = split_name_version(value)?;
    let version = node
        .get("children")
        .and_then(|c| c.get("Version"))
        .and_then(Value::as_str)?;
    Some(PackageRef::npm(name, version))
}

fn package_from_locator(locator: &str) -> Option<PackageRef> {
    let captures = LOCATOR
        .captures(locator)
        .or_else(|| VIRTUAL_LOCATOR.captures(locator))?;
    Some(PackageRef::npm(&captures[1], &captures[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::infrastructure::extractors::AuxInput;

    const MANIFEST: &str = r#"{
        "name": "demo-app",
        "version": "1.0.0",
        "dependencies": { "express": "^4.18.0", "@babel/core": "^7.21.0" }
    }"#;

    fn input<'a>(
        tool_output: &'a str,
        depth: AnalysisDepth,
        settings: &'a AnalysisConfig,
    ) -> ExtractionInput<'a> {
        ExtractionInput {
            tool_output,
            manifest: MANIFEST,
            depth,
            aux: AuxInput::default(),
            settings,
        }
    }

    #[test]
    fn name_version_split_keeps_scoped_names() {
        assert_eq!(
            split_name_version("@babel/core@7.21.0"),
            Some(("@babel/core", "7.21.0"))
        );
        assert_eq!(split_name_version("express@4.18.2"), Some(("express", "4.18.2")));
        assert_eq!(split_name_version("@no-version"), None);
    }

    #[test]
    fn classic_resolves_shadow_children_through_top_level_nodes() {
        let listing = r#"{
            "data": { "trees": [
                { "name": "express@4.18.2", "children": [
                    { "name": "accepts@1.3.8", "shadow": true }
                ]},
                { "name": "accepts@1.3.8", "children": [
                    { "name": "mime-types@2.1.35", "shadow": true }
                ]},
                { "name": "mime-types@2.1.35", "children": [] }
            ]}
        }"#;
        let settings = AnalysisConfig::default();
        let sbom = extract_classic(&input(listing, AnalysisDepth::Stack, &settings)).unwrap();
        let root = PackageRef::npm("demo-app", "1.0.0");
        let express = PackageRef::npm("express", "4.18.2");
        let accepts = PackageRef::npm("accepts", "1.3.8");
        assert!(sbom.depends_on(&root, "express"));
        // accepts is a top-level listing node but not a manifest dependency
        assert!(!sbom.depends_on(&root, "accepts"));
        assert!(sbom.depends_on(&express, "accepts"));
        assert!(sbom.depends_on(&accepts, "mime-types"));
    }

    #[test]
    fn classic_component_skips_transitive_edges() {
        let listing = r#"{
            "data": { "trees": [
                { "name": "express@4.18.2", "children": [
                    { "name": "accepts@1.3.8", "shadow": true }
                ]},
                { "name": "accepts@1.3.8", "children": [] }
            ]}
        }"#;
        let settings = AnalysisConfig::default();
        let sbom = extract_classic(&input(listing, AnalysisDepth::Component, &settings)).unwrap();
        let root = PackageRef::npm("demo-app", "1.0.0");
        assert!(sbom.depends_on(&root, "express"));
        let express = PackageRef::npm("express", "4.18.2");
        assert!(!sbom.depends_on(&express, "accepts"));
    }

    #[test]
    fn berry_stream_is_normalized_and_parsed() {
        let stream = concat!(
            r#"{"value":"demo-app@workspace:.","children":{"Version":"1.0.0","Dependencies":[{"descriptor":"express@npm:^4.18.0","locator":"express@npm:4.18.2"}]}}"#,
            "\n",
            r#"{"value":"express@npm:4.18.2","children":{"Version":"4.18.2","Dependencies":[{"descriptor":"accepts@npm:~1.3.8","locator":"accepts@npm:1.3.8"}]}}"#,
            "\n",
            r#"{"value":"accepts@npm:1.3.8","children":{"Version":"1.3.8"}}"#
        );
        let settings = AnalysisConfig::default();
        let sbom = extract_berry(&input(stream, AnalysisDepth::Stack, &settings)).unwrap();
        let root = PackageRef::npm("demo-app", "1.0.0");
        let express = PackageRef::npm("express", "4.18.2");
        assert!(sbom.depends_on(&root, "express"));
        assert!(sbom.depends_on(&express, "accepts"));
    }

    #[test]
    fn berry_virtual_locators_collapse_to_concrete_versions() {
        let package =
            package_from_locator("@babel/helper-compilation-targets@virtual:abc123#npm:7.21.4")
                .unwrap();
        assert_eq!(package.coordinate(), "pkg:npm/@babel/helper-compilation-targets@7.21.4");
        assert!(package_from_locator("demo-app@workspace:.").is_none());
    }

    #[test]
    fn berry_component_keeps_workspace_edges_only() {
        let stream = concat!(
            r#"{"value":"demo-app@workspace:.","children":{"Version":"1.0.0","Dependencies":[{"locator":"express@npm:4.18.2"}]}}"#,
            r#"{"value":"express@npm:4.18.2","children":{"Version":"4.18.2","Dependencies":[{"locator":"accepts@npm:1.3.8"}]}}"#
        );
        let settings = AnalysisConfig::default();
        let sbom = extract_berry(&input(stream, AnalysisDepth::Component, &settings)).unwrap();
        assert!(sbom.contains(&PackageRef::npm("express", "4.18.2")));
        assert!(!sbom.contains(&PackageRef::npm("accepts", "1.3.8")));
    }
}
