//! Maven and Gradle tree extractors
//!
//! Both build tools print an indented text tree. Depth is encoded in
//! three-character marker groups (`+- `, `|  `, `\- `); the walk keeps a
//! parent stack keyed by depth, so a line at depth `d` attaches to the most
//! recent line at depth `d - 1`. Gradle output goes through a normalization
//! pass first that rewrites it into the same shape Maven prints.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::application::errors::AnalysisError;
use crate::domain::{ComponentScope, PackageRef, Sbom};
use crate::infrastructure::extractors::{AnalysisDepth, ExtractionInput};
use crate::infrastructure::ignores::maven as pom;

const RUNTIME_CLASSPATH: &str = "runtimeClasspath";
const COMPILE_CLASSPATH: &str = "compileClasspath";

static ROOT_PROJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"Root project '(.+)'").unwrap());
static PROPERTY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([^:\n]+):\s+(.+)$").unwrap());
static CONFLICT_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r":(.*):(.*) -> (.*)$").unwrap());
static JAR_INJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.*):(.*):(.*)$").unwrap());
static CONSTRAINT_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r" \(n\)$").unwrap());
static DEP_CONSTRAINT_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r" \(c\)$").unwrap());
static REPEAT_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r" \(\*\)").unwrap());
static HAS_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W*[a-z0-9.-]+:[a-z0-9.-]+:[0-9]+[.][0-9]+(.[0-9]+)?").unwrap());
static HAS_VERSION_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"version:\s?(')?[0-9]+[.][0-9]+(.[0-9]+)?(')?").unwrap());

/// Depth of a tree line: 0 for the root line, `n` for a line prefixed by
/// `n` three-character marker groups. `None` for blank lines.
pub(crate) fn indentation_level(line: &str) -> Option<usize> {
    if line.trim().is_empty() {
        return None;
    }
    let prefix = line
        .find(|c: char| !matches!(c, ' ' | '|' | '+' | '\\' | '-'))
        .unwrap_or(line.len());
    Some(prefix / 3)
}

/// Parse one tree line into a Maven coordinate.
///
/// Accepts `group:artifact:version` plus the longer packaging, classifier
/// and scope forms the dependency plugin prints. Verbose-mode noise such as
/// `(... - omitted for duplicate)` parses through the same path; lines that
/// do not yield a coordinate are discarded.
pub(crate) fn parse_dep_line(line: &str) -> Option<PackageRef> {
    let content = line.trim_start_matches(|c: char| matches!(c, ' ' | '|' | '+' | '\\' | '-'));
    let token = content
        .trim_start_matches('(')
        .split_whitespace()
        .next()?
        .trim_end_matches(')');
    let parts: Vec<&str> = token.split(':').collect();
    let (group, artifact, version) = match parts.len() {
        // group:artifact:version
        3 => (parts[0], parts[1], parts[2]),
        // group:artifact:packaging:version
        4 => (parts[0], parts[1], parts[3]),
        // group:artifact:packaging:version:scope
        5 => (parts[0], parts[1], parts[3]),
        // group:artifact:packaging:classifier:version:scope
        6 => (parts[0], parts[1], parts[4]),
        _ => return None,
    };
    if group.is_empty() || artifact.is_empty() || version.is_empty() {
        return None;
    }
    Some(PackageRef::maven(group, artifact, version))
}

/// Walk indented tree lines, attaching each line to the most recent line
/// one level shallower. Unparseable lines are skipped without disturbing
/// the parent stack.
pub(crate) fn parse_dependency_tree<'a, I>(
    root: &PackageRef,
    lines: I,
    sbom: &mut Sbom,
    scope: Option<ComponentScope>,
) where
    I: IntoIterator<Item = &'a str>,
{
    let mut stack: Vec<PackageRef> = vec![root.clone()];
    for line in lines {
        let Some(depth) = indentation_level(line) else {
            continue;
        };
        if depth == 0 {
            continue;
        }
        let Some(dep) = parse_dep_line(line) else {
            continue;
        };
        stack.truncate(depth);
        if let Some(parent) = stack.last().cloned() {
            sbom.add_dependency(&parent, &dep, scope);
        }
        stack.push(dep);
    }
}

pub fn extract_maven(input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
    match input.depth {
        AnalysisDepth::Stack => maven_stack(input.tool_output),
        AnalysisDepth::Component => maven_component(input),
    }
}

fn maven_stack(tree: &str) -> Result<Sbom, AnalysisError> {
    let mut lines = tree.lines().filter(|l| !l.trim().is_empty());
    let first = lines.next().ok_or_else(|| AnalysisError::UnexpectedOutput {
        reason: "empty maven dependency tree".to_string(),
    })?;
    let root = parse_dep_line(first).ok_or_else(|| AnalysisError::MalformedCoordinate {
        input: first.to_string(),
    })?;
    tracing::debug!(root = %root, "parsing maven dependency tree");
    let mut sbom = Sbom::new();
    sbom.add_root(root.clone());
    parse_dependency_tree(&root, lines, &mut sbom, None);
    Ok(sbom)
}

/// Component analysis: direct dependencies straight from the effective pom.
///
/// The effective pom carries no comments, so ignore directives and test
/// scopes are read from the original manifest and matched back by
/// group/artifact/version.
fn maven_component(input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
    let effective = input
        .aux
        .effective_manifest
        .ok_or_else(|| AnalysisError::MissingField {
            field: "effective pom".to_string(),
        })?;
    let root = pom::project_coordinates(effective)?;
    let manifest_deps = pom::scan_dependencies(input.manifest)?;
    let effective_deps = pom::scan_dependencies(effective)?;

    let mut sbom = Sbom::new();
    sbom.add_root(root.clone());
    for dep in &effective_deps {
        let is_test = manifest_deps
            .iter()
            .filter(|d| d.is_test())
            .any(|d| d.same_artifact(dep));
        if !is_test {
            if let Some(package) = dep.to_package_ref() {
                sbom.add_dependency(&root, &package, None);
            }
        }
    }
    Ok(sbom)
}

pub fn extract_gradle(input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
    let properties_output =
        input
            .aux
            .gradle_properties
            .ok_or_else(|| AnalysisError::MissingField {
                field: "gradle properties".to_string(),
            })?;
    let properties = parse_properties(properties_output);
    let group = properties
        .get("group")
        .ok_or_else(|| AnalysisError::MissingField {
            field: "gradle property 'group'".to_string(),
        })?;
    let version = properties
        .get("version")
        .ok_or_else(|| AnalysisError::MissingField {
            field: "gradle property 'version'".to_string(),
        })?;
    let root_name = ROOT_PROJECT
        .captures(input.tool_output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| AnalysisError::UnexpectedOutput {
            reason: "gradle output carries no 'Root project' line".to_string(),
        })?;
    let root = PackageRef::maven(group, root_name, version);
    tracing::debug!(root = %root, "parsing gradle dependency report");

    let runtime = extract_section(input.tool_output, RUNTIME_CLASSPATH);
    let compile = extract_section(input.tool_output, COMPILE_CLASSPATH);

    let mut sbom = Sbom::new();
    sbom.add_root(root.clone());
    for (section, scope) in [
        (runtime, ComponentScope::Required),
        (compile, ComponentScope::Optional),
    ] {
        let prepared = prepare_lines(&section);
        match input.depth {
            AnalysisDepth::Stack => {
                parse_dependency_tree(
                    &root,
                    prepared.iter().map(String::as_str),
                    &mut sbom,
                    Some(scope),
                );
            }
            AnalysisDepth::Component => {
                for line in prepared
                    .iter()
                    .filter(|l| indentation_level(l) == Some(1))
                {
                    if let Some(dep) = parse_dep_line(line) {
                        sbom.add_dependency(&root, &dep, Some(scope));
                    }
                }
            }
        }
    }
    Ok(sbom)
}

fn parse_properties(output: &str) -> HashMap<String, String> {
    PROPERTY_LINE
        .captures_iter(output)
        .map(|c| (c[1].trim().to_string(), c[2].trim().to_string()))
        .collect()
}

/// Lines of one configuration report: everything after the line starting
/// with `marker`, up to the first blank line.
fn extract_section(output: &str, marker: &str) -> Vec<String> {
    let mut collected = Vec::new();
    let mut started = false;
    for line in output.lines() {
        if line.starts_with(marker) {
            started = true;
            continue;
        }
        if started {
            if line.trim().is_empty() {
                break;
            }
            collected.push(line.to_string());
        }
    }
    collected
}

/// Rewrite gradle report lines into maven tree shape: collapse markers to
/// three columns, resolve `-> version` conflict arrows, inject a `jar`
/// packaging segment, strip `(n)`/`(c)`/`(*)` annotations and tag each
/// line with a `compile` scope column.
fn prepare_lines(section: &[String]) -> Vec<String> {
    let mut prepared = Vec::new();
    for line in section {
        if line.trim().is_empty() || line.ends_with(" FAILED") {
            continue;
        }
        let line = replace_line(line);
        if contains_version(&line) {
            prepared.push(format!("{line}:compile"));
        }
    }
    prepared
}

fn replace_line(line: &str) -> String {
    let line = line.replace("---", "-").replace("    ", "  ");
    let line = CONFLICT_ARROW.replace_all(&line, ":$1:$3");
    let line = JAR_INJECT.replace_all(&line, "$1:$2:jar:$3");
    let line = CONSTRAINT_MARK.replace_all(&line, "");
    let line = DEP_CONSTRAINT_MARK.replace_all(&line, "");
    REPEAT_MARK.replace_all(&line, "").into_owned()
}

fn contains_version(line: &str) -> bool {
    let stripped = line.replace("(n)", "");
    let stripped = stripped.trim();
    (HAS_VERSION.is_match(stripped) || HAS_VERSION_KEYWORD.is_match(stripped))
        && !stripped.contains("libs.")
}
