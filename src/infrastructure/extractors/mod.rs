//! Ecosystem tree extractors
//!
//! Each extractor turns the raw dependency enumeration produced by an
//! external package-manager invocation into a populated [`Sbom`]. The set of
//! extractors is closed: one tagged variant per ecosystem/tool family, all
//! dispatched through [`Extractor::extract`]. Manifest filenames resolve to
//! extractors through an explicit [`ExtractorRegistry`] table built at
//! startup and injected, never global state.

pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod yarn;

use crate::application::errors::AnalysisError;
use crate::config::AnalysisConfig;
use crate::domain::vcs::TagInfo;
use crate::domain::{Ecosystem, Sbom};
use crate::infrastructure::ignores::IgnoreEntry;

/// How much of the tree an analysis wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisDepth {
    /// Full transitive tree (stack analysis)
    #[default]
    Stack,
    /// Direct dependencies only (component analysis)
    Component,
}

/// Collaborator-supplied side channels an extractor may need.
///
/// The core never spawns processes; whoever invokes the package manager
/// also captures these auxiliary outputs and hands them over as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuxInput<'a> {
    /// `gradle properties` output (root group/version)
    pub gradle_properties: Option<&'a str>,
    /// `gradle/libs.versions.toml` content for alias resolution
    pub version_catalog: Option<&'a str>,
    /// Maven effective pom (component analysis input)
    pub effective_manifest: Option<&'a str>,
    /// `go env` output (GOHOSTOS/GOHOSTARCH qualifiers)
    pub go_env: Option<&'a str>,
    /// `go list -m all` output (selected-version side table)
    pub go_selected_versions: Option<&'a str>,
    /// Repository tag state for the Go main-module version
    pub tag_info: Option<&'a TagInfo>,
    /// Project name for ecosystems whose manifest names no root (pip)
    pub project_name: Option<&'a str>,
}

/// One analysis input: the raw tool output plus the manifest it came from
#[derive(Debug, Clone, Copy)]
pub struct ExtractionInput<'a> {
    /// Raw stdout of the enumeration command (tree, graph or JSON listing)
    pub tool_output: &'a str,
    /// Manifest file content (pom.xml, build.gradle, go.mod, package.json,
    /// requirements.txt)
    pub manifest: &'a str,
    pub depth: AnalysisDepth,
    pub aux: AuxInput<'a>,
    pub settings: &'a AnalysisConfig,
}

/// Closed set of ecosystem extractors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Maven,
    Gradle,
    GoModules,
    Npm,
    Pnpm,
    YarnClassic,
    YarnBerry,
    Pip,
}

impl Extractor {
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::Maven => Ecosystem::Maven,
            Self::Gradle => Ecosystem::Gradle,
            Self::GoModules => Ecosystem::Golang,
            Self::Npm => Ecosystem::Npm,
            Self::Pnpm => Ecosystem::Pnpm,
            Self::YarnClassic | Self::YarnBerry => Ecosystem::Yarn,
            Self::Pip => Ecosystem::PyPi,
        }
    }

    /// Build the dependency graph from one raw enumeration.
    pub fn extract(&self, input: &ExtractionInput<'_>) -> Result<Sbom, AnalysisError> {
        match self {
            Self::Maven => java::extract_maven(input),
            Self::Gradle => java::extract_gradle(input),
            Self::GoModules => go::extract(input),
            Self::Npm | Self::Pnpm => javascript::extract(input),
            Self::YarnClassic => yarn::extract_classic(input),
            Self::YarnBerry => yarn::extract_berry(input),
            Self::Pip => python::extract(input),
        }
    }

    /// Scan the manifest for ignore directives, returning the entries
    /// to exclude.
    pub fn ignored_deps(
        &self,
        input: &ExtractionInput<'_>,
    ) -> Result<Vec<IgnoreEntry>, AnalysisError> {
        match self {
            Self::Maven => crate::infrastructure::ignores::maven::ignored_deps(input.manifest),
            Self::Gradle => Ok(crate::infrastructure::ignores::gradle::ignored_deps(
                input.manifest,
                input.aux.version_catalog,
            )),
            Self::GoModules => {
                crate::infrastructure::ignores::golang::ignored_deps(input.manifest, &input.aux)
            }
            Self::Npm | Self::Pnpm | Self::YarnClassic | Self::YarnBerry => {
                crate::infrastructure::ignores::javascript::ignored_deps(input.manifest)
            }
            Self::Pip => Ok(crate::infrastructure::ignores::python::ignored_deps(
                input.manifest,
            )),
        }
    }
}

/// Immutable manifest-filename → extractor table.
///
/// Built once at startup and injected wherever resolution is needed.
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    entries: Vec<(&'static str, Extractor)>,
}

impl ExtractorRegistry {
    /// The standard table covering every supported manifest.
    ///
    /// `package.json` maps to npm; use [`ExtractorRegistry::resolve_javascript`]
    /// when the lock file identifies a different package manager.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                ("pom.xml", Extractor::Maven),
                ("build.gradle", Extractor::Gradle),
                ("build.gradle.kts", Extractor::Gradle),
                ("go.mod", Extractor::GoModules),
                ("package.json", Extractor::Npm),
                ("requirements.txt", Extractor::Pip),
            ],
        }
    }

    pub fn resolve(&self, manifest_filename: &str) -> Result<Extractor, AnalysisError> {
        self.entries
            .iter()
            .find(|(name, _)| *name == manifest_filename)
            .map(|(_, extractor)| *extractor)
            .ok_or_else(|| AnalysisError::UnknownManifest {
                filename: manifest_filename.to_string(),
            })
    }

    /// Narrow a `package.json` project to its actual package manager.
    ///
    /// The lock file name identifies the family; for yarn, the tool's major
    /// version (reported by the collaborator that invoked `yarn --version`)
    /// splits classic (1.x) from berry (2.x+).
    pub fn resolve_javascript(
        &self,
        lock_file: &str,
        yarn_major_version: Option<u32>,
    ) -> Result<Extractor, AnalysisError> {
        match lock_file {
            "package-lock.json" => Ok(Extractor::Npm),
            "pnpm-lock.yaml" => Ok(Extractor::Pnpm),
            "yarn.lock" => match yarn_major_version {
                Some(major) if major >= 2 => Ok(Extractor::YarnBerry),
                Some(_) => Ok(Extractor::YarnClassic),
                None => Ok(Extractor::YarnClassic),
            },
            other => Err(AnalysisError::UnknownManifest {
                filename: other.to_string(),
            }),
        }
    }

    pub fn supported_manifests(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}
