//! Benchmarks for dependency graph extraction

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sbomgraph::config::AnalysisConfig;
use sbomgraph::infrastructure::extractors::{
    AnalysisDepth, AuxInput, ExtractionInput, Extractor,
};

const MAVEN_TREE: &str = "\
com.example:demo:jar:1.0.0
+- org.springframework:spring-web:jar:5.3.20:compile
|  +- org.springframework:spring-beans:jar:5.3.20:compile
|  \\- org.springframework:spring-core:jar:5.3.20:compile
+- com.fasterxml.jackson.core:jackson-databind:jar:2.13.2:compile
|  +- com.fasterxml.jackson.core:jackson-annotations:jar:2.13.2:compile
|  \\- com.fasterxml.jackson.core:jackson-core:jar:2.13.2:compile
\\- junit:junit:jar:4.11:test
   \\- org.hamcrest:hamcrest-core:jar:1.3:test
";

const GO_GRAPH: &str = "\
github.com/acme/widget github.com/spf13/cobra@v1.7.0
github.com/acme/widget golang.org/x/text@v0.3.7
github.com/spf13/cobra@v1.7.0 github.com/spf13/pflag@v1.0.5
github.com/spf13/cobra@v1.7.0 github.com/inconshreveable/mousetrap@v1.1.0
golang.org/x/text@v0.3.7 golang.org/x/tools@v0.1.12
";

fn input<'a>(tool_output: &'a str, settings: &'a AnalysisConfig) -> ExtractionInput<'a> {
    ExtractionInput {
        tool_output,
        manifest: "",
        depth: AnalysisDepth::Stack,
        aux: AuxInput::default(),
        settings,
    }
}

fn bench_maven_tree(c: &mut Criterion) {
    let settings = AnalysisConfig::default();

    c.bench_function("maven_tree_extraction", |b| {
        b.iter(|| {
            let _ = Extractor::Maven.extract(&input(black_box(MAVEN_TREE), &settings));
        });
    });
}

fn bench_go_graph(c: &mut Criterion) {
    let settings = AnalysisConfig::default();

    c.bench_function("go_graph_extraction", |b| {
        b.iter(|| {
            let _ = Extractor::GoModules.extract(&input(black_box(GO_GRAPH), &settings));
        });
    });
}

fn bench_cyclonedx_serialization(c: &mut Criterion) {
    let settings = AnalysisConfig::default();
    let sbom = Extractor::Maven
        .extract(&input(MAVEN_TREE, &settings))
        .expect("benchmark tree must parse");

    c.bench_function("cyclonedx_serialization", |b| {
        b.iter(|| {
            let _ = black_box(&sbom).to_json_string();
        });
    });
}

criterion_group!(
    benches,
    bench_maven_tree,
    bench_go_graph,
    bench_cyclonedx_serialization
);
criterion_main!(benches);
