use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("etreemap-cli"));
    cmd.current_dir(repo_root()).env("ETREEMAP_LOG", "off");
    cmd
}

#[test]
fn cli_renders_svg_to_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("basic.svg");

    cli()
        .args([
            "render",
            "--id",
            "budget",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("basic.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(&out).expect("read svg");
    let xml = roxmltree::Document::parse(&svg).expect("well-formed svg");
    assert_eq!(
        xml.root_element().attribute("id"),
        Some("enhancedtreemap_budget")
    );
}

#[test]
fn cli_layout_prints_rectangles() {
    let assert = cli()
        .args([
            "layout",
            "--pretty",
            fixture("sorted.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let layout: serde_json::Value = serde_json::from_str(&stdout).expect("layout json");
    assert_eq!(layout["width"], 800.0);
    let names = layout["nodes"]
        .as_array()
        .expect("nodes")
        .iter()
        .filter_map(|n| n["name"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["root", "Y", "X"]);
}

#[test]
fn cli_validate_reports_every_settings_error() {
    let assert = cli()
        .args([
            "validate",
            fixture("invalid_settings.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("aspect_ratio cannot include any zeros"));
    assert!(stderr.contains("valign must be in this list: top,center,bottom"));

    cli()
        .args(["validate", fixture("basic.json").to_string_lossy().as_ref()])
        .assert()
        .success();
}

#[test]
fn cli_render_html_writes_error_block() {
    let assert = cli()
        .args([
            "render",
            "--html",
            fixture("invalid_settings.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.starts_with(r#"<div style="color: red">"#));
}

#[test]
fn cli_uses_plugin_settings_as_defaults() {
    let assert = cli()
        .args([
            "layout",
            "--plugin-settings",
            fixture("plugin_settings.json").to_string_lossy().as_ref(),
            fixture("sorted.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    let layout: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("layout json");
    assert_eq!(layout["width"], 640.0);
    let height = layout["height"].as_f64().expect("height");
    assert!((height - 480.0).abs() < 1e-9);
}

#[test]
fn cli_detect_distinguishes_documents() {
    let assert = cli()
        .args(["detect", fixture("basic.json").to_string_lossy().as_ref()])
        .assert()
        .success();
    assert_eq!(
        String::from_utf8_lossy(&assert.get_output().stdout).trim(),
        "enhancedtreemap"
    );

    let tmp = tempfile::tempdir().expect("tempdir");
    let other = tmp.path().join("other.json");
    fs::write(&other, r#"{"type": "piechart"}"#).expect("write");
    cli()
        .args(["detect", other.to_string_lossy().as_ref()])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn cli_rejects_unknown_flags() {
    cli().args(["--bogus"]).assert().failure().code(2);
}
