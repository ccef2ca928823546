use etreemap_core::{Document, TreeNode, TreemapSettings, resolve_settings};
use etreemap_render::RenderOptions;
use etreemap_render::scene::RenderContext;
use etreemap_render::svg::SvgSize;
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn render(root: &TreeNode, settings: &TreemapSettings, id: &str) -> String {
    let ctx = RenderContext::fixed(settings);
    let size = SvgSize::Fixed {
        width: ctx.width,
        height: ctx.height,
    };
    etreemap_render::render_tree_svg(root, &ctx, size, id, &RenderOptions::default())
        .expect("render ok")
}

fn elements<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    tag: &'a str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == tag)
        .collect()
}

#[test]
fn basic_document_produces_well_formed_svg() {
    let path = workspace_root().join("fixtures").join("basic.json");
    let text = std::fs::read_to_string(&path).expect("fixture");
    let doc = Document::parse(&text).expect("parse ok");
    let settings = resolve_settings(&doc.settings, &TreemapSettings::default())
        .into_result()
        .expect("valid settings");

    let svg = render(&doc.root, &settings, "42");
    let xml = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let root = xml.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("id"), Some("enhancedtreemap_42"));
    assert_eq!(root.attribute("width"), Some("960"));
    assert_eq!(root.attribute("height"), Some("540"));
    assert_eq!(root.attribute("viewBox"), None);

    let filters = elements(&xml, "filter")
        .iter()
        .filter_map(|n| n.attribute("id"))
        .collect::<Vec<_>>();
    assert_eq!(filters, vec!["h_shadow_42", "shadow_42"]);
    assert_eq!(elements(&xml, "radialGradient").len(), 1);

    assert_eq!(elements(&xml, "rect").len(), 20);
    assert_eq!(elements(&xml, "image").len(), 1);

    let shaded = elements(&xml, "rect")
        .iter()
        .filter(|r| r.attribute("fill") == Some("url(#radialgradient_42)"))
        .count();
    assert_eq!(shaded, 10);

    let headers = elements(&xml, "text")
        .into_iter()
        .filter(|t| t.attribute("class") == Some("header"))
        .count();
    assert_eq!(headers, 3);

    let first_cell = elements(&xml, "rect")[0];
    assert_eq!(first_cell.attribute("filter"), Some("url(#h_shadow_42)"));
    assert_eq!(first_cell.attribute("stroke"), Some("rgba(0, 0, 0, 0.5)"));
}

#[test]
fn labels_are_escaped_and_titled() {
    let root = TreeNode::branch(
        "R&D <2024>",
        vec![TreeNode::leaf("\"quoted\" & 'single'", Some(2.0))],
    );
    let svg = render(&root, &TreemapSettings::default(), "esc");
    let xml = roxmltree::Document::parse(&svg).expect("well-formed svg");

    let titles = elements(&xml, "title")
        .iter()
        .filter_map(|t| t.text())
        .map(str::to_string)
        .collect::<Vec<_>>();
    assert!(titles.contains(&"R&D <2024>".to_string()));
    assert!(titles.contains(&"\"quoted\" & 'single'".to_string()));

    let header = elements(&xml, "text")
        .into_iter()
        .find(|t| t.attribute("class") == Some("header"))
        .expect("header");
    assert_eq!(header.attribute("text-anchor"), Some("start"));
    assert_eq!(header.attribute("font-size"), Some("16px"));
    let tspan = header
        .children()
        .find(|c| c.tag_name().name() == "tspan")
        .expect("tspan");
    assert_eq!(tspan.text(), Some("R&D <2024>"));
}

#[test]
fn scaled_size_sets_view_box() {
    let settings = TreemapSettings::default();
    let ctx = RenderContext::fixed(&settings);
    let size = SvgSize::Scaled {
        width: 400.0,
        height: 400.0,
        view_width: 800.0,
        view_height: 800.0,
    };
    let svg = etreemap_render::render_tree_svg(
        &TreeNode::leaf("solo", None),
        &ctx,
        size,
        "s",
        &RenderOptions::default(),
    )
    .expect("render ok");
    let xml = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let root = xml.root_element();
    assert_eq!(root.attribute("viewBox"), Some("0 0 800 800"));
    assert_eq!(root.attribute("width"), Some("400"));
    assert_eq!(elements(&xml, "text").len(), 1);
}
