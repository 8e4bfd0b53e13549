//! requirements.txt scanner
//!
//! A requirement line is flagged by a trailing `# sbomignore` comment. A
//! pinned line (`name==version`) yields a full coordinate; an unpinned one
//! yields a name-only entry, since the resolved version lives in the
//! installed environment, not the manifest.

use super::{IgnoreEntry, IGNORE_MARKER};
use crate::domain::PackageRef;
use crate::infrastructure::extractors::python::requirement_name;

pub fn ignored_deps(manifest: &str) -> Vec<IgnoreEntry> {
    manifest
        .lines()
        .filter_map(|line| {
            let (requirement, comment) = line.split_once('#')?;
            if comment.trim() != IGNORE_MARKER {
                return None;
            }
            let requirement = requirement.trim();
            if requirement.is_empty() {
                return None;
            }
            let name = requirement_name(requirement);
            match requirement.split_once("==") {
                Some((_, version)) => Some(IgnoreEntry::Package(PackageRef::pypi(
                    &name,
                    version.trim(),
                ))),
                None => Some(IgnoreEntry::Name(name)),
            }
        })
        .collect()
}
