//! Configuration management
//!
//! Strongly-typed configuration loaded from optional TOML files plus
//! environment variables. Environment overrides use the `SBOMGRAPH__`
//! prefix with double-underscore separators:
//!
//! ```bash
//! SBOMGRAPH__ANALYSIS__MATCH_MANIFEST_VERSIONS=true
//! SBOMGRAPH__IGNORE__METHOD=sensitive
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::sbom::IgnoreMethod;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub ignore: IgnoreConfig,
    pub logging: LoggingConfig,
}

/// Switches affecting extraction behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fail the whole analysis when a manifest-declared version disagrees
    /// with the resolved/installed one (Go and Python paths)
    pub match_manifest_versions: bool,
    /// Rewrite Go node versions to the build's selected versions
    /// (`go list -m all` side table)
    pub go_mvs_logic_enabled: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            match_manifest_versions: false,
            go_mvs_logic_enabled: false,
        }
    }
}

/// Ignore-filtering policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Removal policy: transitive-prune (insensitive, default) or
    /// exact-removal (sensitive)
    pub method: IgnoreMethod,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `info` or `sbomgraph=debug`
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// `config/default.toml` and `config/local.toml` are optional; the
    /// environment is applied last and wins.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SBOMGRAPH").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),
}
