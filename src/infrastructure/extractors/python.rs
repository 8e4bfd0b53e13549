//! pip extractor
//!
//! requirements.txt names the direct dependencies but carries no resolved
//! tree, so the installed-package table (`pipdeptree --json` shape) supplied
//! as tool output is the source of truth for versions and transitive edges.
//! Package names are case-insensitive; everything is matched lowercased.
//! requirements.txt has no project coordinate either, so the root is
//! synthesized from the aux project name (`root@0.0.0` otherwise).

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::application::errors::AnalysisError;
use crate::domain::{PackageRef, Sbom};
use crate::infrastructure::extractors::{AnalysisDepth, ExtractionInput};

const DEFAULT_ROOT_NAME: &str = "root";
const DEFAULT_ROOT_VERSION: &str = "0.0.0";

/// One installed package and the names of its direct dependencies
struct InstalledPackage {
    name: String,
    version: String,
    dependencies: Vec<String>,
}

pub fn extract(input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
    let installed = installed_packages(input.tool_output)?;
    let requirements = requirement_lines(input.manifest);

    if input.settings.match_manifest_versions {
        check_manifest_versions(&requirements, &installed)?;
    }

    let root = PackageRef::pypi(
        input.aux.project_name.unwrap_or(DEFAULT_ROOT_NAME),
        DEFAULT_ROOT_VERSION,
    );
    tracing::debug!(root = %root, installed = installed.len(), "parsing pip installed tree");
    let mut sbom = Sbom::new();
    sbom.add_root(root.clone());

    for requirement in &requirements {
        let name = requirement_name(requirement);
        let package = installed
            .get(&name)
            .ok_or_else(|| AnalysisError::UnexpectedOutput {
                reason: format!("required package {name:?} is not installed"),
            })?;
        let dep = PackageRef::pypi(&package.name, &package.version);
        sbom.add_dependency(&root, &dep, None);
        if input.depth == AnalysisDepth::Stack {
            add_transitive(&mut sbom, &dep, package, &installed, &mut HashSet::new());
        }
    }
    Ok(sbom)
}

fn add_transitive(
    sbom: &mut Sbom,
    from: &PackageRef,
    package: &InstalledPackage,
    installed: &HashMap<String, InstalledPackage>,
    visited: &mut HashSet<String>,
) {
    visited.insert(package.name.to_lowercase());
    for dep_name in &package.dependencies {
        let key = dep_name.to_lowercase();
        let Some(child) = installed.get(&key) else {
            continue;
        };
        let child_ref = PackageRef::pypi(&child.name, &child.version);
        sbom.add_dependency(from, &child_ref, None);
        if visited.insert(key) {
            add_transitive(sbom, &child_ref, child, installed, visited);
        }
    }
}

/// Parse the `pipdeptree --json` array into a lowercase-keyed table.
fn installed_packages(listing: &str) -> Result<HashMap<String, InstalledPackage>, AnalysisError> {
    let nodes: Vec<Value> =
        serde_json::from_str(listing).map_err(|e| AnalysisError::UnexpectedOutput {
            reason: format!("installed package listing is not valid JSON: {e}"),
        })?;
    let mut table = HashMap::new();
    for node in &nodes {
        let Some(package) = node.get("package") else {
            continue;
        };
        let (Some(name), Some(version)) = (
            package.get("package_name").and_then(Value::as_str),
            package.get("installed_version").and_then(Value::as_str),
        ) else {
            continue;
        };
        let dependencies = node
            .get("dependencies")
            .and_then(Value::as_array)
            .map(|deps| {
                deps.iter()
                    .filter_map(|d| d.get("package_name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        table.insert(
            name.to_lowercase(),
            InstalledPackage {
                name: name.to_string(),
                version: version.to_string(),
                dependencies,
            },
        );
    }
    Ok(table)
}

/// requirements.txt dependency lines, comments and blanks removed.
fn requirement_lines(manifest: &str) -> Vec<String> {
    manifest
        .lines()
        .map(|line| match line.split_once('#') {
            Some((code, _)) => code.trim(),
            None => line.trim(),
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// The package name of one requirement line, lowercased, version
/// specifiers and extras stripped.
pub(crate) fn requirement_name(line: &str) -> String {
    let end = line
        .find(|c: char| matches!(c, '=' | '>' | '<' | '~' | '!' | '[' | ';' | ' '))
        .unwrap_or(line.len());
    line[..end].trim().to_lowercase()
}

fn check_manifest_versions(
    requirements: &[String],
    installed: &HashMap<String, InstalledPackage>,
) -> Result<(), AnalysisError> {
    for requirement in requirements {
        let Some((_, manifest_version)) = requirement.split_once("==") else {
            continue;
        };
        let manifest_version = manifest_version.trim();
        let name = requirement_name(requirement);
        let Some(package) = installed.get(&name) else {
            continue;
        };
        if package.version.trim() != manifest_version {
            return Err(AnalysisError::VersionMismatch {
                name,
                manifest_version: manifest_version.to_string(),
                installed_version: package.version.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::infrastructure::extractors::AuxInput;

    const LISTING: &str = r#"[
        {"package": {"package_name": "Flask", "installed_version": "2.3.2"},
         "dependencies": [{"package_name": "Werkzeug"}, {"package_name": "Jinja2"}]},
        {"package": {"package_name": "Werkzeug", "installed_version": "2.3.6"},
         "dependencies": [{"package_name": "MarkupSafe"}]},
        {"package": {"package_name": "Jinja2", "installed_version": "3.1.2"},
         "dependencies": [{"package_name": "MarkupSafe"}]},
        {"package": {"package_name": "MarkupSafe", "installed_version": "2.1.3"},
         "dependencies": []},
        {"package": {"package_name": "requests", "installed_version": "2.31.0"},
         "dependencies": []}
    ]"#;

    fn input<'a>(
        manifest: &'a str,
        depth: AnalysisDepth,
        settings: &'a AnalysisConfig,
    ) -> ExtractionInput<'a> {
        ExtractionInput {
            tool_output: LISTING,
            manifest,
            depth,
            aux: AuxInput::default(),
            settings,
        }
    }

    #[test]
    fn requirement_names_are_normalized() {
        assert_eq!(requirement_name("Flask==2.3.2"), "flask");
        assert_eq!(requirement_name("requests >= 2.0"), "requests");
        assert_eq!(requirement_name("uvicorn[standard]"), "uvicorn");
    }

    #[test]
    fn stack_builds_transitive_tree_from_installed_table() {
        let settings = AnalysisConfig::default();
        let sbom = extract(&input("Flask==2.3.2\n", AnalysisDepth::Stack, &settings)).unwrap();
        let root = PackageRef::pypi("root", "0.0.0");
        let flask = PackageRef::pypi("Flask", "2.3.2");
        let jinja = PackageRef::pypi("Jinja2", "3.1.2");
        assert!(sbom.depends_on(&root, "flask"));
        assert!(sbom.depends_on(&flask, "werkzeug"));
        assert!(sbom.depends_on(&flask, "jinja2"));
        assert!(sbom.depends_on(&jinja, "markupsafe"));
        // requests is installed but not required
        assert!(!sbom.contains(&PackageRef::pypi("requests", "2.31.0")));
    }

    #[test]
    fn component_keeps_requirements_only() {
        let settings = AnalysisConfig::default();
        let sbom = extract(&input(
            "Flask==2.3.2\nrequests\n",
            AnalysisDepth::Component,
            &settings,
        ))
        .unwrap();
        assert!(sbom.contains(&PackageRef::pypi("Flask", "2.3.2")));
        assert!(sbom.contains(&PackageRef::pypi("requests", "2.31.0")));
        assert!(!sbom.contains(&PackageRef::pypi("Werkzeug", "2.3.6")));
    }

    #[test]
    fn missing_installed_package_is_fatal() {
        let settings = AnalysisConfig::default();
        let err = extract(&input("left-pad\n", AnalysisDepth::Stack, &settings)).unwrap_err();
        assert!(matches!(err, AnalysisError::UnexpectedOutput { .. }));
    }

    #[test]
    fn version_mismatch_respects_the_toggle() {
        let mut settings = AnalysisConfig::default();
        settings.match_manifest_versions = true;
        let err = extract(&input("Flask==2.0.0\n", AnalysisDepth::Stack, &settings))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::VersionMismatch { .. }));
        // comments and case differences do not trip the check
        settings.match_manifest_versions = true;
        assert!(extract(&input(
            "flask==2.3.2  # pinned\n",
            AnalysisDepth::Stack,
            &settings
        ))
        .is_ok());
    }
}
