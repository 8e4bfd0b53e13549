//! Test data fixtures for sbomgraph

use sbomgraph::config::AnalysisConfig;
use sbomgraph::infrastructure::extractors::{AnalysisDepth, AuxInput, ExtractionInput};

/// Bundle raw output into a full-tree extraction input
pub fn stack_input<'a>(
    tool_output: &'a str,
    manifest: &'a str,
    aux: AuxInput<'a>,
    settings: &'a AnalysisConfig,
) -> ExtractionInput<'a> {
    ExtractionInput {
        tool_output,
        manifest,
        depth: AnalysisDepth::Stack,
        aux,
        settings,
    }
}

/// Bundle raw output into a direct-dependencies-only extraction input
pub fn component_input<'a>(
    tool_output: &'a str,
    manifest: &'a str,
    aux: AuxInput<'a>,
    settings: &'a AnalysisConfig,
) -> ExtractionInput<'a> {
    ExtractionInput {
        tool_output,
        manifest,
        depth: AnalysisDepth::Component,
        aux,
        settings,
    }
}

/// Sample `mvn dependency:tree` output for testing
pub fn maven_tree() -> &'static str {
    "\
com.acme:webapp:jar:1.0.0
+- org.springframework:spring-web:jar:5.3.20:compile
|  \\- org.springframework:spring-core:jar:5.3.20:compile
+- org.apache.logging.log4j:log4j-core:jar:2.17.0:compile
|  \\- org.apache.logging.log4j:log4j-api:jar:2.17.0:compile
\\- junit:junit:jar:4.11:test
   \\- org.hamcrest:hamcrest-core:jar:1.3:test
"
}

/// Sample pom.xml content; log4j-core carries an ignore directive
pub fn sample_pom_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <groupId>com.acme</groupId>
  <artifactId>webapp</artifactId>
  <version>1.0.0</version>
  <dependencies>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-web</artifactId>
      <version>5.3.20</version>
    </dependency>
    <dependency>
      <!--sbomignore-->
      <groupId>org.apache.logging.log4j</groupId>
      <artifactId>log4j-core</artifactId>
      <version>2.17.0</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.11</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
"#
}

/// Sample `gradle dependencies` report for testing
pub fn gradle_report() -> &'static str {
    "\
> Task :dependencies

------------------------------------------------------------
Root project 'demo-app'
------------------------------------------------------------

compileClasspath - Compile classpath for source set 'main'.
+--- org.apache.commons:commons-text:1.10.0
|    \\--- org.apache.commons:commons-lang3:3.12.0

runtimeClasspath - Runtime classpath of source set 'main'.
+--- org.slf4j:slf4j-api:1.7.30 -> 2.0.7
+--- com.google.guava:guava:31.1-jre

(c) - dependency constraint
"
}

/// Sample `gradle properties` output for testing
pub fn gradle_properties() -> &'static str {
    "group: com.acme\nversion: 1.2.3\n"
}

/// Sample build.gradle content; commons-text is ignored via its catalog alias
pub fn sample_build_gradle() -> &'static str {
    "\
dependencies {
    implementation(libs.commons.text) // sbomignore
    implementation 'org.slf4j:slf4j-api:1.7.30'
    implementation 'com.google.guava:guava:31.1-jre'
}
"
}

/// Sample gradle/libs.versions.toml content for testing
pub fn version_catalog() -> &'static str {
    r#"
[versions]
commons-text = "1.10.0"

[libraries]
commons-text = { module = "org.apache.commons:commons-text", version.ref = "commons-text" }
"#
}

/// Sample `go mod graph` output for testing
pub fn go_mod_graph() -> &'static str {
    "\
github.com/acme/widget github.com/spf13/cobra@v1.7.0
github.com/acme/widget golang.org/x/text@v0.3.7
github.com/spf13/cobra@v1.7.0 github.com/spf13/pflag@v1.0.5
"
}

/// Sample go.mod content; golang.org/x/text carries an ignore directive
pub fn sample_go_mod() -> &'static str {
    "\
module github.com/acme/widget

go 1.21

require (
\tgithub.com/spf13/cobra v1.7.0
\tgolang.org/x/text v0.3.7 // indirect // sbomignore
)
"
}

/// Sample `go env` output for testing
pub fn go_env() -> &'static str {
    "GOHOSTARCH=\"amd64\"\nGOHOSTOS=\"linux\"\n"
}

/// Sample `npm ls --all --json` output for testing
pub fn npm_listing() -> &'static str {
    r#"{
  "name": "demo-app",
  "version": "1.0.0",
  "dependencies": {
    "express": {
      "version": "4.18.2",
      "dependencies": {
        "accepts": { "version": "1.3.8" }
      }
    },
    "@babel/core": { "version": "7.21.0" },
    "fsevents": { "optional": true }
  }
}"#
}

/// Sample package.json content with a reserved ignore array
pub fn npm_manifest_with_ignores() -> &'static str {
    r#"{
  "name": "demo-app",
  "version": "1.0.0",
  "dependencies": {
    "express": "^4.18.0",
    "@babel/core": "^7.21.0"
  },
  "sbomignore": ["@babel/core"]
}"#
}

/// Sample `pnpm ls --depth Infinity --json` output: the npm shape wrapped
/// in a one-project array
pub fn pnpm_listing() -> &'static str {
    r#"[{
  "name": "demo-app",
  "version": "1.0.0",
  "dependencies": {
    "express": {
      "version": "4.18.2",
      "dependencies": {
        "accepts": { "version": "1.3.8" }
      }
    }
  }
}]"#
}

/// Sample package.json content for the yarn processors
pub fn js_manifest() -> &'static str {
    r#"{
  "name": "demo-app",
  "version": "1.0.0",
  "dependencies": {
    "body-parser": "^1.20.0"
  }
}"#
}

/// Sample `yarn list --json` output; the bytes child is a shadow
/// back-reference to the top-level bytes node
pub fn yarn_classic_listing() -> &'static str {
    r#"{
  "type": "tree",
  "data": {
    "type": "list",
    "trees": [
      {
        "name": "body-parser@1.20.2",
        "children": [
          { "name": "bytes@3.1.2", "children": [], "shadow": true }
        ],
        "shadow": false
      },
      { "name": "bytes@3.1.2", "children": [], "shadow": false }
    ]
  }
}"#
}

/// Sample `yarn info --all --recursive --json` stream: one object per line,
/// including a virtual locator
pub fn yarn_berry_stream() -> &'static str {
    "{\"value\":\"demo-app@workspace:.\",\"children\":{\"Version\":\"1.0.0\",\"Dependencies\":[{\"descriptor\":\"body-parser@npm:^1.20.0\",\"locator\":\"body-parser@npm:1.20.2\"},{\"descriptor\":\"left-pad@npm:^1.3.0\",\"locator\":\"left-pad@virtual:abc123#npm:1.3.0\"}]}}\n\
{\"value\":\"body-parser@npm:1.20.2\",\"children\":{\"Version\":\"1.20.2\",\"Dependencies\":[{\"descriptor\":\"bytes@npm:^3.1.2\",\"locator\":\"bytes@npm:3.1.2\"}]}}\n\
{\"value\":\"bytes@npm:3.1.2\",\"children\":{\"Version\":\"3.1.2\"}}\n\
{\"value\":\"left-pad@virtual:abc123#npm:1.3.0\",\"children\":{\"Version\":\"1.3.0\"}}\n"
}

/// Sample `pipdeptree --json` output for testing
pub fn pipdeptree_listing() -> &'static str {
    r#"[
  {
    "package": { "package_name": "Flask", "installed_version": "2.3.2" },
    "dependencies": [
      { "package_name": "Werkzeug" },
      { "package_name": "Jinja2" }
    ]
  },
  {
    "package": { "package_name": "Werkzeug", "installed_version": "2.3.4" },
    "dependencies": []
  },
  {
    "package": { "package_name": "Jinja2", "installed_version": "3.1.2" },
    "dependencies": [ { "package_name": "MarkupSafe" } ]
  },
  {
    "package": { "package_name": "MarkupSafe", "installed_version": "2.1.2" },
    "dependencies": []
  },
  {
    "package": { "package_name": "requests", "installed_version": "2.31.0" },
    "dependencies": []
  }
]"#
}

/// Sample requirements.txt content; requests carries an ignore directive
pub fn requirements_txt() -> &'static str {
    "Flask==2.3.2\nrequests==2.31.0  # sbomignore\n"
}
