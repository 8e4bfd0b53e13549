//! Ignore-directive scanners
//!
//! Each ecosystem lets a project mark dependencies for exclusion with a
//! `sbomignore` token placed in the comment syntax its manifest supports.
//! Scanners read the manifest only; they never look at the extracted graph.

pub mod golang;
pub mod gradle;
pub mod javascript;
pub mod maven;
pub mod python;

use crate::domain::PackageRef;

/// The token that marks a manifest entry as excluded
pub const IGNORE_MARKER: &str = "sbomignore";

/// One scanned ignore directive.
///
/// Manifests that state full coordinates produce `Package` entries, which
/// take part in the coordinate filter pass. Manifests that only name the
/// package (npm's ignore array, unpinned requirements lines) produce `Name`
/// entries, which only ever match by name.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreEntry {
    Package(PackageRef),
    Name(String),
}

impl IgnoreEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Package(package) => &package.name,
            Self::Name(name) => name,
        }
    }

    pub fn package(&self) -> Option<&PackageRef> {
        match self {
            Self::Package(package) => Some(package),
            Self::Name(_) => None,
        }
    }
}
