use etreemap_core::{
    Document, HAlign, Hierarchy, Hsla, Role, SettingsError, StyleResolver, TreemapSettings,
    is_treemap_block, resolve_settings,
};
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
fn basic_document_resolves_settings_and_hierarchy() {
    let text = fixture("basic.json");
    assert!(is_treemap_block(&text));

    let doc = Document::parse(&text).expect("parse ok");
    let resolved = resolve_settings(&doc.settings, &TreemapSettings::default());
    assert!(!resolved.is_errored(), "{:?}", resolved.errors);
    let settings = resolved.settings;
    assert_eq!(settings.width, 960.0);
    assert_eq!(settings.aspect_ratio, 16.0 / 9.0);
    assert!(settings.show_values);
    assert_eq!(settings.fill, Hsla::new(210.0, 0.4, 0.3, 1.0));

    let hierarchy = Hierarchy::build(&doc.root, settings.sort_by_value);
    let top = hierarchy
        .root()
        .children
        .iter()
        .map(|&i| hierarchy.node(i).node.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(top, vec!["Housing", "Food", "Savings", "Transport"]);
    assert_eq!(hierarchy.root().weight, 1625.0 + 680.0 + 600.0 + 300.0);
    assert_eq!(hierarchy.leaves().len(), 7);

    let styles = StyleResolver::new(&settings, 1.0);
    let housing = hierarchy.node(hierarchy.root().children[0]).node;
    assert_eq!(
        styles.fill(housing, Role::Header).as_hsla(),
        Some(Hsla::new(30.0, 0.5, 0.35, 1.0))
    );
    let food = &doc.root.children()[1];
    assert_eq!(styles.halign(&food.children()[1], Role::Cell), HAlign::Center);
    assert_eq!(styles.fill(&doc.root.children()[3], Role::Cell).to_css(), "steelblue");
}

#[test]
fn invalid_settings_are_all_reported() {
    let doc = Document::parse(&fixture("invalid_settings.json")).expect("parse ok");
    let resolved = resolve_settings(&doc.settings, &TreemapSettings::default());
    assert!(resolved.is_errored());
    assert_eq!(resolved.errors[0], SettingsError::AspectRatioZero);
    let messages = resolved
        .into_result()
        .expect_err("errored")
        .messages();
    assert_eq!(
        messages,
        vec![
            "aspect_ratio cannot include any zeros",
            "outer_padding must be >= 0",
            "text_size must be a number!",
            "valign must be in this list: top,center,bottom",
        ]
    );
}

#[test]
fn plugin_data_layers_under_document_settings() {
    let data: serde_json::Value =
        serde_json::from_str(&fixture("plugin_settings.json")).expect("json");
    let plugin = TreemapSettings::from_plugin_data(&data).expect("plugin data");
    assert_eq!(plugin.aspect_ratio, 4.0 / 3.0);
    assert_eq!(plugin.h_fill, Hsla::new(200.0, 0.3, 0.25, 1.0));

    let doc = Document::parse(&fixture("sorted.json")).expect("parse ok");
    let resolved = resolve_settings(&doc.settings, &plugin);
    assert!(!resolved.is_errored());
    assert_eq!(resolved.settings.width, 640.0);
    assert_eq!(resolved.settings.h_text_size, 0.0);
    assert_eq!(plugin.h_text_size, 16.0);
}
