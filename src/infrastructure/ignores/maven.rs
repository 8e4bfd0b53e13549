//! pom.xml scanner
//!
//! Walks the pom as a flat XML event stream, aggregating the fields of each
//! `<dependency>` block. An XML comment holding the ignore marker anywhere
//! inside the block flags it. The same scan serves the effective-pom
//! component path, which is why scope and validity are carried alongside
//! the ignore flag.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{IgnoreEntry, IGNORE_MARKER};
use crate::application::errors::AnalysisError;
use crate::domain::PackageRef;

/// Aggregated `<dependency>` block
#[derive(Debug, Clone, Default)]
pub struct PomDependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    /// `*` when the pom states no explicit scope
    pub scope: String,
    pub ignored: bool,
}

impl PomDependency {
    fn new() -> Self {
        Self {
            scope: "*".to_string(),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.group_id.is_some() && self.artifact_id.is_some() && self.version.is_some()
    }

    pub fn is_test(&self) -> bool {
        self.scope.trim() == "test"
    }

    /// Same artifact regardless of scope or ignore flag.
    pub fn same_artifact(&self, other: &PomDependency) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.version == other.version
    }

    /// Coordinate with a `scope` qualifier when the pom states one.
    pub fn to_package_ref(&self) -> Option<PackageRef> {
        let (group, artifact, version) = (
            self.group_id.as_deref()?,
            self.artifact_id.as_deref()?,
            self.version.as_deref()?,
        );
        let package = PackageRef::maven(group, artifact, version);
        if self.scope == "*" {
            Some(package)
        } else {
            Some(package.with_qualifier("scope", self.scope.clone()))
        }
    }
}

/// All `<dependency>` blocks of a pom, in document order.
pub fn scan_dependencies(pom: &str) -> Result<Vec<PomDependency>, AnalysisError> {
    let mut reader = Reader::from_str(pom);
    let mut buf = Vec::new();
    let mut dependencies = Vec::new();
    let mut current: Option<PomDependency> = None;
    let mut current_tag: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "dependency" {
                    current = Some(PomDependency::new());
                    current_tag = None;
                } else if current.is_some() {
                    current_tag = Some(name);
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "dependency" {
                    if let Some(dependency) = current.take() {
                        dependencies.push(dependency);
                    }
                }
                current_tag = None;
            }
            Ok(Event::Text(t)) => {
                if let (Some(dependency), Some(tag)) = (current.as_mut(), current_tag.as_deref()) {
                    let text = reader
                        .decoder()
                        .decode(t.as_ref())
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    match tag {
                        "groupId" => dependency.group_id = Some(text),
                        "artifactId" => dependency.artifact_id = Some(text),
                        "version" => dependency.version = Some(text),
                        "scope" => {
                            dependency.scope = if text.is_empty() {
                                "*".to_string()
                            } else {
                                text
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Comment(t)) => {
                if let Some(dependency) = current.as_mut() {
                    let comment = reader.decoder().decode(t.as_ref()).unwrap_or_default();
                    if comment.trim() == IGNORE_MARKER {
                        dependency.ignored = true;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AnalysisError::InvalidManifest {
                    reason: format!("pom parse error: {e}"),
                });
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(dependencies)
}

/// The project's own coordinates: the first complete groupId/artifactId/
/// version triple directly under `<project>`.
pub fn project_coordinates(pom: &str) -> Result<PackageRef, AnalysisError> {
    let mut reader = Reader::from_str(pom);
    let mut buf = Vec::new();
    let mut in_project = false;
    let mut depth = 0usize;
    let mut current_tag: Option<String> = None;
    let mut project = PomDependency::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "project" {
                    in_project = true;
                    depth = 0;
                } else if in_project {
                    depth += 1;
                    current_tag = (depth == 1).then_some(name);
                }
            }
            Ok(Event::End(_)) => {
                if in_project && depth > 0 {
                    depth -= 1;
                }
                current_tag = None;
            }
            Ok(Event::Text(t)) => {
                if let Some(tag) = current_tag.as_deref() {
                    let text = reader
                        .decoder()
                        .decode(t.as_ref())
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    match tag {
                        "groupId" => project.group_id = Some(text),
                        "artifactId" => project.artifact_id = Some(text),
                        "version" => project.version = Some(text),
                        _ => {}
                    }
                    if project.is_valid() {
                        if let Some(package) = project.to_package_ref() {
                            return Ok(package);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AnalysisError::InvalidManifest {
                    reason: format!("pom parse error: {e}"),
                });
            }
            _ => {}
        }
        buf.clear();
    }
    Err(AnalysisError::MissingField {
        field: "project groupId/artifactId/version".to_string(),
    })
}

/// Ignore directives of a pom, as full coordinates.
pub fn ignored_deps(pom: &str) -> Result<Vec<IgnoreEntry>, AnalysisError> {
    Ok(scan_dependencies(pom)?
        .into_iter()
        .filter(|d| d.ignored)
        .filter_map(|d| d.to_package_ref())
        .map(IgnoreEntry::Package)
        .collect())
}
