//! CLI integration tests.
//!
//! Runs each command against template, section and script files written to a
//! temporary directory.

use std::path::PathBuf;

use remix_cli::{
    run_compose, run_edit, run_generate, run_merge, ComposeConfig, EditConfig, GenerateConfig,
    MergeConfig, MergeOutput, RenderInputs,
};
use remix_core::GenerateOptions;
use serde_json::Value;
use tempfile::TempDir;

const SECTIONS: &str = r#"[
  {"id": "hero-a", "category": "hero", "markup": "<h1>{{headline}}</h1>", "variableKeys": ["headline"], "tags": [], "defaults": {"headline": "UNLEASH"}},
  {"id": "hero-b", "category": "hero", "markup": "<h1 class=\"b\">{{headline}}</h1>", "variableKeys": ["headline"], "tags": []},
  {"id": "hero-c", "category": "hero", "markup": "<h1 class=\"c\">{{headline}}</h1>", "variableKeys": ["headline"], "tags": []},
  {"id": "cta-a", "category": "cta", "markup": "<a>{{label}}</a>", "style": "a { color: var(--brand-accent); }", "variableKeys": ["label"], "tags": [], "defaults": {"label": "Go"}}
]"#;

const TEMPLATES: &str = r#"[
  {"id": "t1", "name": "Stack", "sectionComposition": ["hero-a"]},
  {"id": "promo", "name": "Promo", "sectionComposition": ["hero-a", "ghost", "cta-a"], "platform": "instagram"}
]"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }
}

// ============================================================================
// generate / compose
// ============================================================================

#[test]
fn test_generate_single_template_scenario() {
    let fx = Fixture::new();
    let config = GenerateConfig {
        templates: fx.file("templates.json", r#"[{"id":"t1","name":"Stack","sectionComposition":["hero-a"]}]"#),
        sections: fx.file("sections.json", SECTIONS),
        options: GenerateOptions::new(1, 1),
    };

    let out: Value = serde_json::from_str(&run_generate(&config).expect("generate")).expect("json");
    assert_eq!(out[0]["id"], "t1-v1-0");
    assert_eq!(out[0]["name"], "Stack A");
    assert_eq!(out[0]["sectionComposition"], serde_json::json!(["hero-b"]));
    assert_eq!(out[0]["isVariation"], true);
    assert_eq!(out[0]["semanticTags"], serde_json::json!(["remix"]));
}

#[test]
fn test_generate_is_repeatable() {
    let fx = Fixture::new();
    let config = GenerateConfig {
        templates: fx.file("templates.json", TEMPLATES),
        sections: fx.file("sections.json", SECTIONS),
        options: GenerateOptions::new(9, 6),
    };
    let first = run_generate(&config).expect("generate");
    assert_eq!(first, run_generate(&config).expect("generate"));
}

#[test]
fn test_generate_reports_missing_file() {
    let fx = Fixture::new();
    let config = GenerateConfig {
        templates: fx.dir.path().join("missing.json"),
        sections: fx.file("sections.json", SECTIONS),
        options: GenerateOptions::new(1, 1),
    };
    let err = run_generate(&config).expect_err("missing file");
    assert!(format!("{err:#}").contains("missing.json"));
}

#[test]
fn test_compose_and_render() {
    let fx = Fixture::new();
    let mut config = ComposeConfig {
        templates: fx.file("templates.json", TEMPLATES),
        sections: fx.file("sections.json", SECTIONS),
        template_id: "promo".into(),
        render: None,
    };

    let composed: Value = serde_json::from_str(&run_compose(&config).expect("compose")).expect("json");
    assert_eq!(composed["sections"], serde_json::json!(["hero-a", "cta-a"]));
    assert_eq!(composed["markup"], "<h1>{{headline}}</h1>\n<a>{{label}}</a>");

    config.render = Some(RenderInputs {
        variables: Some(fx.file("vars.json", r#"{"headline": "Spring Sale"}"#)),
        brand: Some(fx.file("brand.json", r##"{"brandColors": ["#ff6600"]}"##)),
    });
    let rendered: Value = serde_json::from_str(&run_compose(&config).expect("render")).expect("json");
    assert_eq!(rendered["markup"], "<h1>Spring Sale</h1>\n<a>Go</a>");
    let style = rendered["style"].as_str().expect("style");
    assert!(style.contains("--brand-primary: #ff6600;"));
    assert!(style.ends_with("a { color: var(--brand-accent); }"));
}

#[test]
fn test_compose_unknown_template() {
    let fx = Fixture::new();
    let config = ComposeConfig {
        templates: fx.file("templates.json", TEMPLATES),
        sections: fx.file("sections.json", SECTIONS),
        template_id: "nope".into(),
        render: None,
    };
    let err = run_compose(&config).expect_err("unknown template");
    assert!(err.to_string().contains("Template not found: nope"));
}

// ============================================================================
// merge
// ============================================================================

#[test]
fn test_merge_json_and_document() {
    let fx = Fixture::new();
    let mut config = MergeConfig {
        markup: fx.file("page.html", "<h1>{{title}}</h1><p>{{body}}</p>"),
        style: None,
        inputs: RenderInputs {
            variables: Some(fx.file("vars.json", r#"{"title": "Hi"}"#)),
            brand: None,
        },
        output: MergeOutput::Json,
    };

    let out: Value = serde_json::from_str(&run_merge(&config).expect("merge")).expect("json");
    assert_eq!(out["markup"], "<h1>Hi</h1><p></p>");
    assert_eq!(out["style"], "");

    config.output = MergeOutput::Document;
    let page = run_merge(&config).expect("merge");
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<h1>Hi</h1><p></p>"));
    assert!(!page.contains("data-editor-hover"));

    config.output = MergeOutput::EditorDocument;
    assert!(run_merge(&config).expect("merge").contains("[data-editor-hover]"));
}

#[test]
fn test_merge_bad_variables_file() {
    let fx = Fixture::new();
    let config = MergeConfig {
        markup: fx.file("page.html", "{{x}}"),
        style: Some(fx.file("page.css", "")),
        inputs: RenderInputs {
            variables: Some(fx.file("vars.json", "[1, 2]")),
            brand: None,
        },
        output: MergeOutput::Json,
    };
    let err = run_merge(&config).expect_err("not an object");
    assert!(format!("{err:#}").contains("vars.json"));
}

// ============================================================================
// edit
// ============================================================================

#[tokio::test]
async fn test_edit_script_replay() {
    let fx = Fixture::new();
    let config = EditConfig {
        markup: fx.file(
            "page.html",
            r#"<h1 data-editor-id="el-abc123">Old</h1><p>Body</p>"#,
        ),
        script: fx.file(
            "script.jsonl",
            r#"# edit the headline, then select the paragraph
{"type": "UPDATE_CONTENT", "payload": {"id": "el-abc123", "content": "<b>New</b>"}}
{"type": "GET_HTML", "payload": {}}
{"pointer": "click", "path": [1]}
{"pointer": "click", "path": [9]}
{"type": "NOT_A_MESSAGE"}
{"pointer": "click"}
"#,
        ),
    };

    let lines = run_edit(&config).await.expect("replay");
    assert_eq!(lines.len(), 3);

    let html: Value = serde_json::from_str(&lines[0]).expect("json");
    assert_eq!(html["type"], "HTML_RESPONSE");
    assert_eq!(
        html["payload"]["html"],
        r#"<h1 data-editor-id="el-abc123"><b>New</b></h1><p>Body</p>"#
    );

    let selected: Value = serde_json::from_str(&lines[1]).expect("json");
    assert_eq!(selected["type"], "ELEMENT_SELECTED");
    assert_eq!(selected["payload"]["tagName"], "P");
    assert_eq!(selected["payload"]["content"], "Body");

    assert_eq!(lines[2], r#"{"type":"SELECTION_CLEARED"}"#);
}
