//! build.gradle / build.gradle.kts scanner
//!
//! A dependency declaration is flagged by a trailing `//` or `/*` comment
//! holding the ignore marker. Three declaration shapes resolve to
//! coordinates: the quoted `"group:artifact:version"` form, the
//! `group: name: version:` named-argument form, and the `libs.` version
//! catalog notation, which is resolved through `gradle/libs.versions.toml`.
//! A catalog alias with no match is dropped silently; unlike a version
//! mismatch, it cannot invalidate the analysis.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{IgnoreEntry, IGNORE_MARKER};
use crate::domain::PackageRef;

static NAMED_ARGUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(group|name|version):\s*['"](.*?)['"]"#).unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"](.*?)['"]"#).unwrap());

pub fn ignored_deps(manifest: &str, version_catalog: Option<&str>) -> Vec<IgnoreEntry> {
    let catalog = version_catalog.and_then(|content| match content.parse::<toml::Table>() {
        Ok(table) => Some(table),
        Err(e) => {
            tracing::debug!(error = %e, "unparsable gradle version catalog, aliases will not resolve");
            None
        }
    });

    manifest
        .lines()
        .filter(|line| line.contains(IGNORE_MARKER))
        .map(strip_comments)
        .filter(|declaration| !declaration.is_empty())
        .filter_map(|declaration| {
            if has_catalog_notation(&declaration) {
                resolve_catalog_alias(&declaration, catalog.as_ref())
            } else {
                parse_declaration(&declaration)
            }
        })
        .map(IgnoreEntry::Package)
        .collect()
}

/// The declaration text before any trailing comment.
fn strip_comments(line: &str) -> String {
    let mut declaration = line.trim();
    if let Some(idx) = declaration.find("//") {
        declaration = declaration[..idx].trim();
    }
    if let Some(idx) = declaration.find("/*") {
        declaration = declaration[..idx].trim();
    }
    declaration.to_string()
}

/// `libs.` notation carries at most one colon; a colon-rich line is a
/// regular declaration that merely mentions the word.
fn has_catalog_notation(declaration: &str) -> bool {
    let trimmed = declaration.trim();
    (trimmed.starts_with("library(") || trimmed.contains("libs."))
        && trimmed.matches(':').count() <= 1
}

fn parse_declaration(declaration: &str) -> Option<PackageRef> {
    if declaration.contains("group:")
        && declaration.contains("name:")
        && declaration.contains("version:")
    {
        let mut group = None;
        let mut name = None;
        let mut version = None;
        for capture in NAMED_ARGUMENT.captures_iter(declaration) {
            let value = capture[2].to_string();
            match &capture[1] {
                "group" => group = Some(value),
                "name" => name = Some(value),
                "version" => version = Some(value),
                _ => {}
            }
        }
        return Some(PackageRef::maven(&group?, &name?, &version?));
    }
    let quoted = QUOTED.captures(declaration)?;
    let parts: Vec<&str> = quoted[1].split(':').collect();
    if parts.len() == 3 {
        Some(PackageRef::maven(parts[0], parts[1], parts[2]))
    } else {
        None
    }
}

/// Resolve a `libs.some.alias` reference through the version catalog's
/// `[libraries]` table (`module` plus `version.ref` into `[versions]`).
fn resolve_catalog_alias(declaration: &str, catalog: Option<&toml::Table>) -> Option<PackageRef> {
    let catalog = match catalog {
        Some(catalog) => catalog,
        None => {
            tracing::debug!(declaration, "ignored alias without a version catalog, dropping");
            return None;
        }
    };
    let idx = declaration.find("libs.")?;
    let alias = declaration[idx + "libs.".len()..]
        .trim()
        .replace('.', "-")
        .replace(')', "");

    let library = catalog
        .get("libraries")
        .and_then(toml::Value::as_table)
        .and_then(|libraries| libraries.get(&alias))
        .and_then(toml::Value::as_table);
    let Some(library) = library else {
        tracing::debug!(alias, "version catalog has no entry for ignored alias, dropping");
        return None;
    };
    let module = library.get("module").and_then(toml::Value::as_str)?;
    let (group, name) = module.split_once(':')?;
    let version_ref = library
        .get("version")
        .and_then(toml::Value::as_table)
        .and_then(|v| v.get("ref"))
        .and_then(toml::Value::as_str)?;
    let version = catalog
        .get("versions")
        .and_then(toml::Value::as_table)
        .and_then(|versions| versions.get(version_ref))
        .and_then(toml::Value::as_str)?;
    Some(PackageRef::maven(group, name, version))
}
