//! Canonical package coordinates
//!
//! A [`PackageRef`] is the canonical identifier for a dependency across every
//! supported ecosystem: purl type, optional namespace, name, version and an
//! ordered qualifier map. Extractors build these from raw tool output; the
//! SBOM graph keys its nodes on the rendered coordinate string.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::application::errors::AnalysisError;

/// Package ecosystem, named by its purl type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ecosystem {
    Maven,
    Npm,
    Pnpm,
    Yarn,
    Golang,
    PyPi,
    Gradle,
}

impl Ecosystem {
    /// The purl type string for this ecosystem.
    ///
    /// Gradle coordinates are Maven coordinates, so both map to `maven`;
    /// npm, pnpm and yarn all resolve against the npm registry.
    pub fn purl_type(&self) -> &'static str {
        match self {
            Self::Maven | Self::Gradle => "maven",
            Self::Npm | Self::Pnpm | Self::Yarn => "npm",
            Self::Golang => "golang",
            Self::PyPi => "pypi",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.purl_type())
    }
}

/// Component scope tag carried by a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentScope {
    Required,
    Optional,
    Runtime,
    Test,
    Excluded,
}

impl ComponentScope {
    /// Parse a scope tag case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" => Some(Self::Required),
            "optional" => Some(Self::Optional),
            "runtime" => Some(Self::Runtime),
            "test" => Some(Self::Test),
            "excluded" => Some(Self::Excluded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::Excluded => "excluded",
        }
    }
}

/// Canonical dependency identifier
///
/// Immutable once constructed. Two refs are coordinate-equal iff every field
/// matches; name-equality compares only [`PackageRef::name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRef {
    pub ecosystem: Ecosystem,
    pub namespace: Option<String>,
    pub name: String,
    pub version: String,
    /// Ordered key→value qualifiers (e.g. `scope=test`, `type=module`)
    pub qualifiers: BTreeMap<String, String>,
}

impl PackageRef {
    pub fn new(
        ecosystem: Ecosystem,
        namespace: Option<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            ecosystem,
            namespace,
            name: name.into(),
            version: version.into(),
            qualifiers: BTreeMap::new(),
        }
    }

    pub fn with_qualifier(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.qualifiers.insert(key.into(), value.into());
        self
    }

    pub fn with_qualifiers(mut self, qualifiers: BTreeMap<String, String>) -> Self {
        self.qualifiers.extend(qualifiers);
        self
    }

    /// Maven/Gradle coordinate: namespace=groupId, name=artifactId.
    pub fn maven(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self::new(
            Ecosystem::Maven,
            Some(group_id.to_string()),
            artifact_id,
            version,
        )
    }

    /// npm-family coordinate. A `"@scope/pkg"` name splits into
    /// namespace `"@scope"` and name `"pkg"`.
    pub fn npm(name: &str, version: &str) -> Self {
        match name.split_once('/') {
            Some((scope, pkg)) => {
                Self::new(Ecosystem::Npm, Some(scope.to_string()), pkg, version)
            }
            None => Self::new(Ecosystem::Npm, None, name, version),
        }
    }

    /// Go module coordinate from a `"module[/sub]@version"` token.
    ///
    /// The namespace is the module path up to the last slash; the name is the
    /// last segment. A token without a version (the main module, or a
    /// `require` line lacking one) falls back to `main_module_version`.
    /// The `delimiter` is a regex separating name from version (`@` for
    /// `go mod graph` edges, whitespace for `go.mod` lines).
    pub fn golang(
        token: &str,
        delimiter: &regex::Regex,
        main_module_version: &str,
        qualifiers: &BTreeMap<String, String>,
    ) -> Result<Self, AnalysisError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AnalysisError::MalformedCoordinate {
                input: token.to_string(),
            });
        }
        let (namespace, name_and_version) = match token.rfind('/') {
            Some(idx) => (Some(token[..idx].to_string()), &token[idx + 1..]),
            None => (None, token),
        };
        let mut parts = delimiter.splitn(name_and_version, 2);
        let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(|| {
            AnalysisError::MalformedCoordinate {
                input: token.to_string(),
            }
        })?;
        let version = parts
            .next()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(main_module_version);
        Ok(
            Self::new(Ecosystem::Golang, namespace, name, version)
                .with_qualifiers(qualifiers.clone()),
        )
    }

    /// PyPI coordinate; names are case-insensitive and stored lowercased.
    pub fn pypi(name: &str, version: &str) -> Self {
        Self::new(Ecosystem::PyPi, None, name.to_lowercase(), version)
    }

    /// The name with its namespace prefix when one exists, e.g.
    /// `@babel/core` or `github.com/spf13/cobra`.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}/{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Render the canonical coordinate string:
    /// `pkg:<type>/[<namespace>/]<name>@<version>[?k=v&...]`
    ///
    /// Qualifier order follows the BTreeMap key order, so identical refs
    /// always render identically.
    pub fn coordinate(&self) -> String {
        let mut out = format!("pkg:{}/", self.ecosystem.purl_type());
        if let Some(ns) = &self.namespace {
            out.push_str(ns);
            out.push('/');
        }
        out.push_str(&self.name);
        out.push('@');
        out.push_str(&self.version);
        if !self.qualifiers.is_empty() {
            out.push('?');
            let mut first = true;
            for (k, v) in &self.qualifiers {
                if !first {
                    out.push('&');
                }
                out.push_str(k);
                out.push('=');
                out.push_str(v);
                first = false;
            }
        }
        out
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate())
    }
}
