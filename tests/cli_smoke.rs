use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    fs::write(path, content).unwrap();
}

#[test]
fn analyze_writes_snapshot_json() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.js"), "import './b';\nimport Vue from 'vue';\n");
    write_file(&root.join("b.js"), "export default 1;\n");

    let out = root.join("atlas.json");
    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("analyze").arg("--path").arg(root).arg("--json").arg(&out);
    cmd.assert().success();

    let content = fs::read_to_string(&out).unwrap();
    let v: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert!(v["nodes"].as_array().unwrap().len() >= 2);
    assert!(!v["edges"].as_array().unwrap().is_empty());
    assert!(v["positions"].is_object());
    // Wire format is camelCase.
    assert!(content.contains("isExternal"));
    assert!(content.contains("\"ext:vue\""));
}

#[test]
fn analyze_prints_text_summary_by_default() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.js"), "import './b';\n");
    write_file(&root.join("b.js"), "");

    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("analyze").arg("--path").arg(root);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Analyzed 2 files"))
        .stdout(predicate::str::contains("| Path"));
}

#[test]
fn quiet_suppresses_the_summary() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.js"), "import './b';\n");
    write_file(&root.join("b.js"), "");

    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("-q").arg("analyze").arg("--path").arg(root);
    cmd.assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn json_format_prints_snapshot_to_stdout() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.js"), "import './b';\n");
    write_file(&root.join("b.js"), "");

    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("analyze").arg("--path").arg(root).arg("--format").arg("json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"nodes\""))
        .stdout(predicate::str::contains("\"positions\""));
}

#[test]
fn missing_root_fails_with_diagnostic() {
    let dir = tempdir().unwrap();
    let gone = dir.path().join("never-created");

    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("analyze").arg("--path").arg(&gone);
    cmd.assert().failure().stderr(predicate::str::contains("Analysis failed"));
}

#[test]
fn completions_generate_a_script() {
    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("completions").arg("bash");
    cmd.assert().success().stdout(predicate::str::contains("import-atlas"));
}
