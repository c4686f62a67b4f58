use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn recognize_prints_tree() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("recognize")
        .arg(fixture_path("dialog.txt"))
        .arg("--patterns")
        .arg(fixture_path("buttons.glyph"))
        .arg("--format")
        .arg("tree");

    cmd.assert().success().stdout(predicate::eq(
        "container #0 [0,0 .. 5,2]\n  button #1 [1,1 .. 4,1] \"[OK]\"\n",
    ));
}

#[test]
fn recognize_json_contains_match() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("recognize")
        .arg(fixture_path("dialog.txt"))
        .arg("-p")
        .arg(fixture_path("buttons.glyph"));

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["matches"][1][0]["pattern_id"], "button");
    assert_eq!(json["matches"][1][0]["confidence"], 1.0);
    assert_eq!(json["forest"]["edges"][0]["container"], 0);
}

#[test]
fn recognize_yaml() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("recognize")
        .arg(fixture_path("dialog.txt"))
        .arg("--format")
        .arg("yaml");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ui_role: container"));
}

#[test]
fn recognize_rejects_unknown_format() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("recognize")
        .arg(fixture_path("dialog.txt"))
        .arg("--format")
        .arg("xml");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format 'xml'"));
}

#[test]
fn generate_html_by_default() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("generate")
        .arg(fixture_path("dialog.txt"))
        .arg("--patterns")
        .arg(fixture_path("buttons.glyph"));

    cmd.assert().success().stdout(
        predicate::str::starts_with("<!DOCTYPE html>")
            .and(predicate::str::contains("    <button id=\"w1\">OK</button>")),
    );
}

#[test]
fn generate_tkinter() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("generate")
        .arg(fixture_path("login.txt"))
        .arg("--templates")
        .arg("tkinter");

    cmd.assert().success().stdout(
        predicate::str::starts_with("import tkinter as tk")
            .and(predicate::str::ends_with("root.mainloop()\n")),
    );
}

#[test]
fn generate_unknown_template_set_fails() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("generate")
        .arg(fixture_path("dialog.txt"))
        .arg("--templates")
        .arg("qt");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown template set `qt`"));
}

#[test]
fn config_file_selects_template_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("glyphic.toml");
    fs::write(&config, "[codegen]\ntemplate_set = \"tkinter\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("generate")
        .arg(fixture_path("dialog.txt"))
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("root = tk.Tk()"));
}

#[test]
fn missing_config_file_fails() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("templates").arg("--config").arg("/no/such/glyphic.toml");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn tokens_as_json() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("tokens").arg(fixture_path("buttons.glyph"));

    cmd.assert().success().stdout(
        predicate::str::contains("\"AlphaOpen\"").and(predicate::str::contains("\"Indent\"")),
    );
}

#[test]
fn ast_reports_parse_errors() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("ast").arg(fixture_path("broken.glyph"));

    cmd.assert().failure().stderr(predicate::str::contains(
        "line 1: expected AlphaClose '>', found end of input",
    ));
}

#[test]
fn patterns_lists_registrations() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("patterns").arg(fixture_path("buttons.glyph"));

    cmd.assert().success().stdout(
        predicate::str::contains("button\ttrack\t1 rule(s)\ttags: button")
            .and(predicate::str::contains("labels\trelate")),
    );
}

#[test]
fn patterns_warnings_go_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scent.glyph");
    fs::write(&source, "<hunt [INIT mode = \"dark\" {scent = (val \"careful\")}]>\n<hunt Track:ok [GATHER {tag:ok = (val \"OK\")}]>\n").unwrap();

    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("patterns").arg(&source);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ok\ttrack"))
        .stderr(predicate::str::contains("warning:").and(predicate::str::contains("careful")));
}

#[test]
fn templates_lists_builtins() {
    let mut cmd = cargo_bin_cmd!("glyphic");
    cmd.arg("templates");

    cmd.assert().success().stdout(
        predicate::str::contains("html").and(predicate::str::contains("tkinter")),
    );
}
