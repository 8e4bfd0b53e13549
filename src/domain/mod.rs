//! Core domain model: coordinates, the SBOM graph, and the VCS tag model

pub mod package_ref;
pub mod sbom;
pub mod vcs;

pub use package_ref::{ComponentScope, Ecosystem, PackageRef};
pub use sbom::{BelongingCondition, IgnoreMethod, Sbom};
