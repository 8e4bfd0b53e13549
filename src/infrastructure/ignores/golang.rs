//! go.mod scanner
//!
//! A require entry is flagged by a trailing `// sbomignore` comment, also
//! accepted after an `// indirect` annotation. Structural lines (`module`,
//! `go`, block openers, `exclude`, `replace`, `retract`, `use`) never match
//! even when they carry the token. Matched entries become full Go
//! coordinates, with the same purl qualifiers the extractor applies, so the
//! coordinate filter pass lines up exactly.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{IgnoreEntry, IGNORE_MARKER};
use crate::application::errors::AnalysisError;
use crate::domain::vcs::main_module_version;
use crate::domain::PackageRef;
use crate::infrastructure::extractors::go::purl_qualifiers;
use crate::infrastructure::extractors::AuxInput;

static MARKER_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r".+//\s*{IGNORE_MARKER}")).unwrap());
static MARKER_AFTER_INDIRECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r".+//\sindirect (//)?\s*{IGNORE_MARKER}")).unwrap());
static DEPENDENCY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z.0-9/-]+\s{1,2}[vV][0-9]\.[0-9](\.[0-9]){0,2}.*").unwrap());
static NAME_VERSION_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{1,3}").unwrap());

const STRUCTURAL_PREFIXES: [&str; 8] = [
    "module ",
    "go ",
    "require (",
    "require(",
    "exclude ",
    "replace ",
    "retract ",
    "use ",
];

pub fn ignored_deps(
    manifest: &str,
    aux: &AuxInput<'_>,
) -> Result<Vec<IgnoreEntry>, AnalysisError> {
    let qualifiers = purl_qualifiers(aux.go_env);
    let main_version = main_module_version(aux.tag_info);

    manifest
        .lines()
        .filter(|line| is_ignored_line(line))
        .map(|line| {
            let entry = dependency_text(line);
            PackageRef::golang(&entry, &NAME_VERSION_DELIMITER, &main_version, &qualifiers)
                .map(IgnoreEntry::Package)
        })
        .collect()
}

fn is_ignored_line(line: &str) -> bool {
    if !line.contains(IGNORE_MARKER) {
        return false;
    }
    if !MARKER_COMMENT.is_match(line) && !MARKER_AFTER_INDIRECT.is_match(line) {
        return false;
    }
    let trimmed = line.trim();
    if trimmed.contains("=>") || STRUCTURAL_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return false;
    }
    trimmed.starts_with("require ") || DEPENDENCY_LINE.is_match(trimmed)
}

/// The `path version` token pair of a matched line, comment and `require`
/// keyword removed.
fn dependency_text(line: &str) -> String {
    let trimmed = line.trim();
    let before_comment = match trimmed.find("//") {
        Some(idx) => trimmed[..idx].trim(),
        None => trimmed,
    };
    before_comment
        .strip_prefix("require ")
        .unwrap_or(before_comment)
        .trim()
        .to_string()
}
