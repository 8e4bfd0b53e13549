//! sbomgraph - Canonical dependency graphs from package-manager output
//!
//! This crate converts the dependency enumerations printed by package
//! managers (Maven, Gradle, Go modules, npm, pnpm, Yarn, pip) into one
//! canonical dependency graph, serialized as a CycloneDX 1.4 JSON document,
//! honoring per-manifest ignore directives along the way.
//!
//! # Modules
//!
//! - [`config`] — Strongly-typed configuration with TOML and environment variable support
//! - [`domain`] — Package coordinates, the SBOM graph, version-control helpers
//! - [`application`] — The analysis pipeline and its error types
//! - [`infrastructure`] — Per-ecosystem tree extractors and ignore scanners
//! - [`logging`] — Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! sbomgraph/
//! ├── domain/           # Pure graph and coordinate logic
//! ├── application/      # Analysis pipeline use case
//! ├── infrastructure/
//! │   ├── extractors/   # One extractor per ecosystem tool family
//! │   └── ignores/      # One ignore-directive scanner per manifest kind
//! ├── config/           # Configuration management
//! └── logging/          # tracing setup
//! ```
//!
//! The core is synchronous and performs no I/O of its own: whoever invokes
//! the package manager hands over its raw output (plus any auxiliary dumps
//! such as `gradle properties` or `go env`) as plain text.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sbomgraph::application::AnalysisService;
//! use sbomgraph::infrastructure::extractors::{AnalysisDepth, AuxInput, ExtractorRegistry};
//! use sbomgraph::Config;
//!
//! let service = AnalysisService::new(Config::load()?, ExtractorRegistry::standard());
//! let input = service.input(&tool_output, &manifest, AnalysisDepth::Stack, AuxInput::default());
//! let cyclonedx_json = service.analyze("go.mod", &input)?;
//! ```
//!
//! Environment variables use the `SBOMGRAPH__` prefix with double
//! underscore separators:
//!
//! ```bash
//! SBOMGRAPH__ANALYSIS__MATCH_MANIFEST_VERSIONS=true
//! SBOMGRAPH__IGNORE__METHOD=sensitive
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
