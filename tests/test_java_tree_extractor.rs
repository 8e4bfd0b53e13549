//! Integration tests for the Maven and Gradle extractors

mod common;

use common::*;
use sbomgraph::application::{AnalysisError, AnalysisService};
use sbomgraph::config::Config;
use sbomgraph::domain::PackageRef;
use sbomgraph::infrastructure::extractors::{AuxInput, Extractor, ExtractorRegistry};

fn service() -> AnalysisService {
    AnalysisService::new(Config::default(), ExtractorRegistry::standard())
}

#[test]
fn maven_stack_analysis_walks_the_whole_tree() {
    let svc = service();
    let analysis = Config::default().analysis;
    let input = stack_input(maven_tree(), sample_pom_xml(), AuxInput::default(), &analysis);
    let sbom = svc.build_graph(Extractor::Maven, &input).unwrap();

    let root = PackageRef::maven("com.acme", "webapp", "1.0.0");
    let spring_web = PackageRef::maven("org.springframework", "spring-web", "5.3.20");
    let junit = PackageRef::maven("junit", "junit", "4.11");
    assert_eq!(sbom.root(), Some(&root));
    assert!(sbom.depends_on(&root, "spring-web"));
    assert!(sbom.depends_on(&spring_web, "spring-core"));
    assert!(sbom.depends_on(&junit, "hamcrest-core"));
    // the ignored log4j branch is gone
    assert!(!sbom.depends_on(&root, "log4j-core"));
}

#[test]
fn maven_component_analysis_reads_the_effective_pom() {
    let effective = r#"<project>
  <groupId>com.acme</groupId>
  <artifactId>webapp</artifactId>
  <version>1.0.0</version>
  <dependencies>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-web</artifactId>
      <version>5.3.20</version>
      <scope>compile</scope>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.11</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>"#;
    let svc = service();
    let analysis = Config::default().analysis;
    let aux = AuxInput {
        effective_manifest: Some(effective),
        ..Default::default()
    };
    let input = component_input("", sample_pom_xml(), aux, &analysis);
    let sbom = svc.build_graph(Extractor::Maven, &input).unwrap();

    let root = PackageRef::maven("com.acme", "webapp", "1.0.0");
    assert_eq!(sbom.root(), Some(&root));
    // spring-web survives with its effective scope as a qualifier
    let spring_web = PackageRef::maven("org.springframework", "spring-web", "5.3.20")
        .with_qualifier("scope", "compile");
    assert!(sbom.contains(&spring_web));
    // junit is test-scoped in the original manifest and is dropped
    assert!(!sbom.depends_on(&root, "junit"));
}

#[test]
fn maven_component_analysis_requires_the_effective_pom() {
    let svc = service();
    let analysis = Config::default().analysis;
    let input = component_input("", sample_pom_xml(), AuxInput::default(), &analysis);
    assert!(matches!(
        svc.build_graph(Extractor::Maven, &input),
        Err(AnalysisError::MissingField { .. })
    ));
}

#[test]
fn gradle_stack_analysis_resolves_catalog_ignores() {
    let svc = service();
    let analysis = Config::default().analysis;
    let aux = AuxInput {
        gradle_properties: Some(gradle_properties()),
        version_catalog: Some(version_catalog()),
        ..Default::default()
    };
    let input = stack_input(gradle_report(), sample_build_gradle(), aux, &analysis);
    let sbom = svc.build_graph(Extractor::Gradle, &input).unwrap();

    let root = PackageRef::maven("com.acme", "demo-app", "1.2.3");
    assert_eq!(sbom.root(), Some(&root));
    // the conflict arrow resolves slf4j to its selected version
    assert!(sbom.contains(&PackageRef::maven("org.slf4j", "slf4j-api", "2.0.7")));
    assert!(sbom.contains(&PackageRef::maven("com.google.guava", "guava", "31.1-jre")));
    // commons-text is ignored through its catalog alias; its child goes too
    assert!(!sbom.depends_on(&root, "commons-text"));
    assert!(!sbom.contains(&PackageRef::maven(
        "org.apache.commons",
        "commons-lang3",
        "3.12.0"
    )));
}

#[test]
fn gradle_analysis_requires_the_properties_output() {
    let svc = service();
    let analysis = Config::default().analysis;
    let input = stack_input(gradle_report(), sample_build_gradle(), AuxInput::default(), &analysis);
    assert!(matches!(
        svc.build_graph(Extractor::Gradle, &input),
        Err(AnalysisError::MissingField { .. })
    ));
}

#[test]
fn gradle_component_analysis_keeps_direct_dependencies_only() {
    let svc = service();
    let analysis = Config::default().analysis;
    let aux = AuxInput {
        gradle_properties: Some(gradle_properties()),
        ..Default::default()
    };
    // manifest without ignore directives, so the whole report survives
    let input = component_input(gradle_report(), "", aux, &analysis);
    let sbom = svc.build_graph(Extractor::Gradle, &input).unwrap();

    let root = PackageRef::maven("com.acme", "demo-app", "1.2.3");
    assert!(sbom.depends_on(&root, "commons-text"));
    assert!(sbom.depends_on(&root, "slf4j-api"));
    // the transitive commons-lang3 never enters at component depth
    assert!(!sbom.contains(&PackageRef::maven(
        "org.apache.commons",
        "commons-lang3",
        "3.12.0"
    )));
}
