//! Analysis error types

use thiserror::Error;

/// Environment toggle named in version-mismatch errors so users can relax
/// the check without digging through documentation.
pub const MATCH_MANIFEST_VERSIONS_TOGGLE: &str = "SBOMGRAPH__ANALYSIS__MATCH_MANIFEST_VERSIONS";

/// Errors raised while turning raw dependency enumerations into an SBOM.
///
/// Every variant is fatal for the running analysis; there are no retries
/// and no partial graphs.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Unable to parse package coordinate: {input}")]
    MalformedCoordinate { input: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unexpected package-manager output: {reason}")]
    UnexpectedOutput { reason: String },

    #[error("Unknown manifest file: {filename}")]
    UnknownManifest { filename: String },

    #[error(
        "Can't continue with analysis - versions mismatch for dependency name={name}, \
         manifest version={manifest_version}, installed version={installed_version}; to allow \
         a version mismatch between installed and requested packages, set \
         {MATCH_MANIFEST_VERSIONS_TOGGLE}=false"
    )]
    VersionMismatch {
        name: String,
        manifest_version: String,
        installed_version: String,
    },

    #[error("Invalid manifest: {reason}")]
    InvalidManifest { reason: String },

    #[error("Unable to generate JSON from SBOM")]
    Serialization(#[source] serde_json::Error),
}
