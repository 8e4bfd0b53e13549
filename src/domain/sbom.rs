//! The canonical dependency graph (SBOM)
//!
//! [`Sbom`] is a node/edge store keyed on rendered coordinate strings
//! (bom-refs). It supports root designation, edge insertion with node
//! auto-materialization, ignore-filtering under two removal policies, and
//! serialization to a CycloneDX 1.4 JSON document.
//!
//! The underlying data is conceptually a DAG, but extractors may feed it
//! cycles (Go module graphs) or repeated shared subtrees (Yarn classic,
//! Gradle `(*)` collapse); revisiting a coordinate never duplicates a node
//! and never recurses infinitely because adjacency is grouped before any
//! walk.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::package_ref::{ComponentScope, PackageRef};
use crate::application::errors::AnalysisError;

/// CycloneDX spec version emitted by [`Sbom::to_json_string`]
const SPEC_VERSION: &str = "1.4";

/// Which fields of a component an ignore entry is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BelongingCondition {
    /// Match on the package name only
    #[default]
    Name,
    /// Match on the full rendered coordinate
    Coordinate,
}

/// Removal policy applied by [`Sbom::filter_ignored_deps`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnoreMethod {
    /// Remove matched nodes and the full transitive edge-closure reachable
    /// from each match, even when a descendant is still reachable from a
    /// surviving ancestor. Whole-subtree pruning, not reference counting.
    #[default]
    Insensitive,
    /// Remove exactly the matched nodes and the edges touching them;
    /// orphaned descendants survive.
    Sensitive,
}

/// A single graph node: one coordinate plus an optional scope tag
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub package: PackageRef,
    pub scope: Option<ComponentScope>,
}

/// Canonical dependency graph with CycloneDX serialization
#[derive(Debug, Clone)]
pub struct Sbom {
    /// bom-ref → component; BTreeMap keeps serialization deterministic
    components: BTreeMap<String, Component>,
    /// bom-ref → direct dependency bom-refs, in insertion order
    dependencies: BTreeMap<String, Vec<String>>,
    root: Option<PackageRef>,
    belonging_condition: BelongingCondition,
    ignore_method: IgnoreMethod,
}

impl Sbom {
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
            dependencies: BTreeMap::new(),
            root: None,
            belonging_condition: BelongingCondition::default(),
            ignore_method: IgnoreMethod::default(),
        }
    }

    pub fn with_settings(belonging_condition: BelongingCondition, method: IgnoreMethod) -> Self {
        let mut sbom = Self::new();
        sbom.belonging_condition = belonging_condition;
        sbom.ignore_method = method;
        sbom
    }

    /// Designate the root component for the scanned project.
    ///
    /// The root node is always created, is excluded from ignore-filtering,
    /// and can only be removed through [`Sbom::remove_root_component`].
    pub fn add_root(&mut self, package: PackageRef) -> &mut Self {
        let bom_ref = package.coordinate();
        self.root = Some(package.clone());
        self.components.insert(
            bom_ref.clone(),
            Component {
                package,
                scope: None,
            },
        );
        self.dependencies.entry(bom_ref).or_default();
        self
    }

    pub fn root(&self) -> Option<&PackageRef> {
        self.root.as_ref()
    }

    /// Insert a directed edge `source → target`.
    ///
    /// Both endpoints auto-materialize nodes when absent; a newly created
    /// node is tagged with `scope`. Identical duplicate edges are
    /// suppressed; source multiplicities carry no meaning in the exchange
    /// document.
    pub fn add_dependency(
        &mut self,
        source: &PackageRef,
        target: &PackageRef,
        scope: Option<ComponentScope>,
    ) -> &mut Self {
        let source_ref = source.coordinate();
        let target_ref = target.coordinate();
        self.ensure_component(&source_ref, source, scope);
        self.ensure_component(&target_ref, target, scope);
        let deps = self.dependencies.entry(source_ref).or_default();
        if !deps.contains(&target_ref) {
            deps.push(target_ref.clone());
        }
        self.dependencies.entry(target_ref).or_default();
        self
    }

    fn ensure_component(&mut self, bom_ref: &str, package: &PackageRef, scope: Option<ComponentScope>) {
        if !self.components.contains_key(bom_ref) {
            self.components.insert(
                bom_ref.to_string(),
                Component {
                    package: package.clone(),
                    scope,
                },
            );
        }
    }

    /// Switch the match predicate used by [`Sbom::filter_ignored_deps`].
    ///
    /// Callers commonly filter by coordinate first and then again by name,
    /// to catch same-named packages whose version was rewritten during
    /// resolution.
    pub fn set_belonging_condition(&mut self, condition: BelongingCondition) {
        self.belonging_condition = condition;
    }

    pub fn set_ignore_method(&mut self, method: IgnoreMethod) {
        self.ignore_method = method;
    }

    /// Remove ignored dependencies according to the configured method.
    ///
    /// `ignored` entries are names or rendered coordinates, depending on the
    /// current [`BelongingCondition`]. The root node never matches.
    pub fn filter_ignored_deps<S: AsRef<str>>(&mut self, ignored: &[S]) -> &mut Self {
        let initial = self.matching_refs(ignored);
        let refs_to_remove = match self.ignore_method {
            IgnoreMethod::Sensitive => initial,
            IgnoreMethod::Insensitive => self.transitive_closure(initial),
        };
        self.remove_refs(&refs_to_remove);
        self
    }

    fn matching_refs<S: AsRef<str>>(&self, ignored: &[S]) -> Vec<String> {
        let root_ref = self.root.as_ref().map(PackageRef::coordinate);
        self.components
            .iter()
            .filter(|(bom_ref, _)| root_ref.as_deref() != Some(bom_ref.as_str()))
            .filter(|(bom_ref, component)| match self.belonging_condition {
                BelongingCondition::Name => ignored.iter().any(|i| {
                    i.as_ref() == component.package.name
                        || i.as_ref() == component.package.qualified_name()
                }),
                BelongingCondition::Coordinate => {
                    ignored.iter().any(|i| i.as_ref() == bom_ref.as_str())
                }
            })
            .map(|(bom_ref, _)| bom_ref.clone())
            .collect()
    }

    /// Expand an initial match set to everything reachable via outgoing
    /// edges. Deliberately ignores other incoming edges: a descendant is
    /// pruned even when a surviving ancestor still references it.
    fn transitive_closure(&self, initial: Vec<String>) -> Vec<String> {
        let mut seen: HashSet<String> = initial.iter().cloned().collect();
        let mut queue: Vec<String> = initial;
        let mut result = Vec::new();
        while let Some(current) = queue.pop() {
            if let Some(children) = self.dependencies.get(&current) {
                for child in children {
                    if seen.insert(child.clone()) {
                        queue.push(child.clone());
                    }
                }
            }
            result.push(current);
        }
        result
    }

    fn remove_refs(&mut self, refs: &[String]) {
        if refs.is_empty() {
            return;
        }
        let doomed: HashSet<&str> = refs.iter().map(String::as_str).collect();
        self.components.retain(|bom_ref, _| !doomed.contains(bom_ref.as_str()));
        self.dependencies.retain(|bom_ref, _| !doomed.contains(bom_ref.as_str()));
        for deps in self.dependencies.values_mut() {
            deps.retain(|d| !doomed.contains(d.as_str()));
        }
    }

    /// True iff a direct child of `parent` carries `name`.
    ///
    /// Used after a coordinate filter to verify whether a by-name rule is
    /// still worth applying.
    pub fn depends_on(&self, parent: &PackageRef, name: &str) -> bool {
        let Some(children) = self.dependencies.get(&parent.coordinate()) else {
            return false;
        };
        children.iter().any(|child_ref| {
            self.components
                .get(child_ref)
                .is_some_and(|c| c.package.name == name)
        })
    }

    /// Detach only the root node and its adjacency entry.
    pub fn remove_root_component(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        let root_ref = root.coordinate();
        self.components.remove(&root_ref);
        self.dependencies.remove(&root_ref);
        for deps in self.dependencies.values_mut() {
            deps.retain(|d| d != &root_ref);
        }
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn contains(&self, package: &PackageRef) -> bool {
        self.components.contains_key(&package.coordinate())
    }

    pub fn direct_dependencies_of(&self, package: &PackageRef) -> Vec<&PackageRef> {
        self.dependencies
            .get(&package.coordinate())
            .into_iter()
            .flatten()
            .filter_map(|r| self.components.get(r).map(|c| &c.package))
            .collect()
    }

    /// Serialize to the CycloneDX 1.4 JSON exchange document.
    ///
    /// Identical node/edge sets serialize identically apart from the
    /// serial number and the generation timestamp.
    pub fn to_json_string(&self) -> Result<String, AnalysisError> {
        let root_ref = self.root.as_ref().map(PackageRef::coordinate);
        let components: Vec<serde_json::Value> = self
            .components
            .iter()
            .map(|(bom_ref, component)| {
                self.component_json(bom_ref, component, root_ref.as_deref())
            })
            .collect();
        let dependencies: Vec<serde_json::Value> = self
            .dependencies
            .iter()
            .map(|(bom_ref, deps)| {
                json!({
                    "ref": bom_ref,
                    "dependsOn": deps,
                })
            })
            .collect();

        let mut metadata = json!({
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        });
        if let Some(root_ref) = root_ref.as_deref() {
            if let Some(component) = self.components.get(root_ref) {
                metadata["component"] = self.component_json(root_ref, component, Some(root_ref));
            }
        }

        let document = json!({
            "bomFormat": "CycloneDX",
            "specVersion": SPEC_VERSION,
            "serialNumber": format!("urn:uuid:{}", uuid::Uuid::new_v4()),
            "version": 1,
            "metadata": metadata,
            "components": components,
            "dependencies": dependencies,
        });

        serde_json::to_string(&document).map_err(AnalysisError::Serialization)
    }

    fn component_json(
        &self,
        bom_ref: &str,
        component: &Component,
        root_ref: Option<&str>,
    ) -> serde_json::Value {
        let package = &component.package;
        let mut value = json!({
            "bom-ref": bom_ref,
            "type": if root_ref == Some(bom_ref) { "application" } else { "library" },
            "name": package.name,
            "version": package.version,
            "purl": bom_ref,
        });
        if let Some(ns) = &package.namespace {
            value["group"] = json!(ns);
        }
        if let Some(scope) = component.scope {
            value["scope"] = json!(scope.as_str());
        }
        value
    }
}

impl Default for Sbom {
    fn default() -> Self {
        Self::new()
    }
}
