use etreemap::render::{HeadlessError, HeadlessRenderer, Rendered, Viewport, sanitize_svg_id};
use futures::executor::block_on;
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> String {
    let path = workspace_root().join("fixtures").join(name);
    std::fs::read_to_string(&path).expect("fixture")
}

#[test]
fn renders_basic_document() {
    let renderer = HeadlessRenderer::new();
    let svg = renderer
        .render_svg_sync(&fixture("basic.json"), "basic")
        .expect("render ok");
    let xml = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let root = xml.root_element();
    assert_eq!(root.attribute("id"), Some("enhancedtreemap_basic"));
    assert_eq!(root.attribute("width"), Some("960"));
}

#[test]
fn invalid_json_becomes_error_block() {
    let rendered = HeadlessRenderer::new().render_document_sync("{ \"name\": ", "x");
    let Rendered::Error(messages) = &rendered else {
        panic!("expected error block");
    };
    assert_eq!(messages.len(), 1);
    let html = rendered.to_html();
    assert!(html.starts_with(r#"<div style="color: red">"#));
    assert!(html.ends_with("</div>"));
}

#[test]
fn settings_errors_suppress_the_diagram() {
    let renderer = HeadlessRenderer::new();
    let text = fixture("invalid_settings.json");

    let err = renderer.render_svg_sync(&text, "x").expect_err("errored");
    assert!(matches!(err, HeadlessError::Parse(etreemap::Error::Settings(_))));

    let rendered = renderer.render_document_sync(&text, "x");
    assert_eq!(
        rendered,
        Rendered::Error(vec![
            "aspect_ratio cannot include any zeros".to_string(),
            "outer_padding must be >= 0".to_string(),
            "text_size must be a number!".to_string(),
            "valign must be in this list: top,center,bottom".to_string(),
        ])
    );
    assert_eq!(renderer.validate_sync(&text).expect("json ok").len(), 4);
    assert!(
        renderer
            .validate_sync(&fixture("basic.json"))
            .expect("json ok")
            .is_empty()
    );
}

#[test]
fn error_block_escapes_markup() {
    let html = Rendered::Error(vec!["<b>& bad".to_string(), "second".to_string()]).to_html();
    assert_eq!(
        html,
        r#"<div style="color: red">&lt;b&gt;&amp; bad<br>second</div>"#
    );
}

#[test]
fn plugin_data_sets_defaults() {
    let data: serde_json::Value =
        serde_json::from_str(&fixture("plugin_settings.json")).expect("json");
    let renderer = HeadlessRenderer::new()
        .with_plugin_data(&data)
        .expect("plugin data");
    let layout = renderer.layout_sync(&fixture("sorted.json")).expect("layout");
    assert_eq!(layout.width, 640.0);
    assert!((layout.height - 480.0).abs() < 1e-9);
    assert_eq!(layout.nodes[1].name, "Y");
}

#[test]
fn adaptive_documents_use_a_view_box() {
    let text = r#"{
        "type": "enhancedtreemap",
        "settings": [{ "fixed_width": false, "aspect_ratio": "2:1" }],
        "name": "root",
        "children": [{ "name": "a", "value": 3 }, { "name": "b", "value": 1 }]
    }"#;
    let renderer = HeadlessRenderer::new().with_viewport(Viewport {
        width: 500.0,
        height: None,
    });
    let svg = block_on(renderer.render_svg(text, "wide")).expect("render ok");
    let xml = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let root = xml.root_element();
    assert_eq!(root.attribute("width"), Some("500"));
    assert_eq!(root.attribute("height"), Some("250"));
    assert_eq!(root.attribute("viewBox"), Some("0 0 1000 500"));

    let layout = block_on(renderer.layout(text)).expect("layout");
    assert_eq!(layout.scale, 2.0);
}

#[test]
fn sanitize_svg_id_produces_safe_tokens() {
    assert_eq!(sanitize_svg_id("  my chart #1 "), "my_chart__1");
    assert_eq!(sanitize_svg_id("42"), "42");
    assert_eq!(sanitize_svg_id("a-b_c"), "a-b_c");
    assert_eq!(sanitize_svg_id("   "), "0");
}

#[test]
fn numeric_ids_suffix_every_defs_id() {
    let svg = HeadlessRenderer::new()
        .render_svg_sync(&fixture("basic.json"), "7")
        .expect("render ok");
    let xml = roxmltree::Document::parse(&svg).expect("well-formed svg");
    assert_eq!(xml.root_element().attribute("id"), Some("enhancedtreemap_7"));
    assert!(
        xml.descendants()
            .any(|n| n.attribute("id") == Some("radialgradient_7"))
    );
}
