//! Version-control tag model for Go main-module versions
//!
//! Go module graphs omit the version of the main module. The original
//! toolchain derives it from the repository's tag state; here the git data
//! arrives as a [`TagInfo`] produced by an external collaborator, and this
//! module only computes the resulting version string.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder used when the project is not under version control (or the
/// repository has no commits).
pub const DEFAULT_MAIN_MODULE_VERSION: &str = "v0.0.0";

static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)(\d+)$").unwrap());
static SUFFIX_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*-[a-zA-Z0-9]+$|.*\.[a-zA-Z0-9]+$").unwrap());
static DESCRIBE_DIGEST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^g[0-9a-f]{12}$").unwrap());

/// Snapshot of a repository's tag state, as reported by git
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagInfo {
    /// Latest reachable tag name; empty when the repo carries no tags
    pub tag_name: String,
    /// True when HEAD is exactly the tagged commit
    pub current_commit_pointed_by_tag: bool,
    /// Full hex digest of HEAD; empty for a repo without commits
    pub commit_digest: String,
    /// Commit timestamp of HEAD
    pub commit_timestamp: Option<NaiveDateTime>,
}

impl TagInfo {
    /// Interpret `git describe --abbrev=12` output.
    ///
    /// `<tag>-<n>-g<hash12>` means HEAD is `n` commits past `<tag>`; a bare
    /// tag name means HEAD is exactly the tagged commit. Tag names may
    /// themselves contain dashes.
    pub fn from_describe(
        describe: &str,
        commit_digest: &str,
        commit_timestamp: Option<NaiveDateTime>,
    ) -> Self {
        let describe = describe.trim();
        let parts: Vec<&str> = describe.split('-').collect();
        let (tag_name, pointed, digest) = if parts.len() > 2
            && DESCRIBE_DIGEST.is_match(parts[parts.len() - 1])
            && parts[parts.len() - 2].chars().all(|c| c.is_ascii_digit())
        {
            (
                parts[..parts.len() - 2].join("-"),
                false,
                parts[parts.len() - 1].trim_start_matches('g').to_string(),
            )
        } else {
            (describe.to_string(), true, commit_digest.to_string())
        };
        Self {
            tag_name,
            current_commit_pointed_by_tag: pointed,
            commit_digest: if digest.is_empty() {
                commit_digest.to_string()
            } else {
                digest
            },
            commit_timestamp,
        }
    }
}

/// Compute the "next" version for a tag the build has moved past.
///
/// A tag ending in a numeral gets that numeral incremented and `-0`
/// appended; a tag ending in a `.`/`-` suffixed token just gets `-0`
/// appended. Anything else yields an empty string.
pub fn next_tag_version(tag: &TagInfo) -> String {
    if let Some(caps) = TRAILING_NUMBER.captures(&tag.tag_name) {
        let number: u64 = caps[2].parse().unwrap_or(0);
        return format!("{}{}-0", &caps[1], number + 1);
    }
    if SUFFIX_TOKEN.is_match(&tag.tag_name) {
        return format!("{}-0", tag.tag_name);
    }
    String::new()
}

/// Synthesize a Go pseudo-version:
/// `<next>.<yyyyMMddHHmmss>-<first 12 hex of the commit digest>`
pub fn pseudo_version(tag: &TagInfo, next_version: &str) -> String {
    let timestamp = tag
        .commit_timestamp
        .map(|ts| ts.format("%Y%m%d%H%M%S").to_string())
        .unwrap_or_else(|| "00000000000000".to_string());
    let digest12: String = tag.commit_digest.chars().take(12).collect();
    format!("{next_version}.{timestamp}-{digest12}")
}

/// Resolve the main-module version from the repository's tag state.
///
/// - no repository → the fixed placeholder
/// - HEAD exactly tagged → the tag itself
/// - HEAD past a tag → pseudo-version from the next tag version
/// - commits but no tags → pseudo-version from the placeholder
pub fn main_module_version(tag: Option<&TagInfo>) -> String {
    let Some(tag) = tag else {
        return DEFAULT_MAIN_MODULE_VERSION.to_string();
    };
    if tag.tag_name.trim().is_empty() {
        if tag.commit_digest.trim().is_empty() {
            return DEFAULT_MAIN_MODULE_VERSION.to_string();
        }
        return pseudo_version(tag, DEFAULT_MAIN_MODULE_VERSION);
    }
    if tag.current_commit_pointed_by_tag {
        tag.tag_name.clone()
    } else {
        pseudo_version(tag, &next_tag_version(tag))
    }
}
