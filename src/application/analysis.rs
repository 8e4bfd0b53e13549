//! Analysis pipeline
//!
//! One `analyze` call runs the whole conversion: resolve the extractor for
//! the manifest, build the graph from the raw tool output, apply the ignore
//! directives, serialize to CycloneDX. Each call works on its own [`Sbom`];
//! the service itself is stateless and synchronous.

use crate::application::errors::AnalysisError;
use crate::config::Config;
use crate::domain::{BelongingCondition, PackageRef, Sbom};
use crate::infrastructure::extractors::{
    AnalysisDepth, AuxInput, ExtractionInput, Extractor, ExtractorRegistry,
};
use crate::infrastructure::ignores::IgnoreEntry;

pub struct AnalysisService {
    config: Config,
    registry: ExtractorRegistry,
}

impl AnalysisService {
    pub fn new(config: Config, registry: ExtractorRegistry) -> Self {
        Self { config, registry }
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Bundle raw collaborator output with this service's analysis settings.
    pub fn input<'a>(
        &'a self,
        tool_output: &'a str,
        manifest: &'a str,
        depth: AnalysisDepth,
        aux: AuxInput<'a>,
    ) -> ExtractionInput<'a> {
        ExtractionInput {
            tool_output,
            manifest,
            depth,
            aux,
            settings: &self.config.analysis,
        }
    }

    /// Convert one dependency enumeration into a CycloneDX JSON document.
    pub fn analyze(
        &self,
        manifest_filename: &str,
        input: &ExtractionInput<'_>,
    ) -> Result<String, AnalysisError> {
        let extractor = self.registry.resolve(manifest_filename)?;
        self.analyze_with(extractor, input)
    }

    pub fn analyze_with(
        &self,
        extractor: Extractor,
        input: &ExtractionInput<'_>,
    ) -> Result<String, AnalysisError> {
        self.build_graph(extractor, input)?.to_json_string()
    }

    /// Extract and filter the graph without serializing it.
    pub fn build_graph(
        &self,
        extractor: Extractor,
        input: &ExtractionInput<'_>,
    ) -> Result<Sbom, AnalysisError> {
        let mut sbom = extractor.extract(input)?;
        let ignored = extractor.ignored_deps(input)?;
        tracing::info!(
            ecosystem = %extractor.ecosystem(),
            components = sbom.component_count(),
            ignored = ignored.len(),
            "dependency graph extracted"
        );
        if ignored.is_empty() {
            return Ok(sbom);
        }

        sbom.set_ignore_method(self.config.ignore.method);

        // First pass: exact coordinates.
        let coordinates: Vec<String> = ignored
            .iter()
            .filter_map(IgnoreEntry::package)
            .map(PackageRef::coordinate)
            .collect();
        sbom.set_belonging_condition(BelongingCondition::Coordinate);
        sbom.filter_ignored_deps(&coordinates);

        // Second pass: by name. A coordinate entry re-enters here only when
        // the root still depends on its name, meaning resolution rewrote the
        // version the manifest stated. Name-only entries always apply.
        let root = sbom.root().cloned();
        let names: Vec<String> = ignored
            .iter()
            .filter(|entry| match entry {
                IgnoreEntry::Name(_) => true,
                IgnoreEntry::Package(package) => root
                    .as_ref()
                    .is_some_and(|r| sbom.depends_on(r, &package.name)),
            })
            .map(|entry| entry.name().to_string())
            .collect();
        sbom.set_belonging_condition(BelongingCondition::Name);
        sbom.filter_ignored_deps(&names);
        Ok(sbom)
    }
}
