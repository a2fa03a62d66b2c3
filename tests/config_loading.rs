use assert_cmd::prelude::*;
use import_atlas::utils::config;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    fs::write(path, content).unwrap();
}

#[test]
fn parses_full_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("import-atlas.toml");
    let data = r#"
[layout]
canvas_width = 2000.0
canvas_height = 1400.0
margin = 24.0
algorithm = "hierarchical"

[output]
default_format = "json"
"#;
    write(&cfg_path, data);

    let cfg = config::load_config_at(&cfg_path).expect("config parsed");
    let layout = cfg.layout.expect("layout table");
    assert_eq!(layout.canvas_width, Some(2000.0));
    assert_eq!(layout.canvas_height, Some(1400.0));
    assert_eq!(layout.margin, Some(24.0));
    assert_eq!(layout.algorithm.as_deref(), Some("hierarchical"));
    assert_eq!(
        cfg.output.and_then(|o| o.default_format),
        Some("json".to_string())
    );
}

#[test]
fn load_config_near_looks_for_default_name() {
    let tmp = tempfile::tempdir().unwrap();
    write(&tmp.path().join("import-atlas.toml"), "[output]\ndefault_format = 'text'\n");

    let cfg = config::load_config_near(tmp.path()).expect("found default config");
    assert_eq!(cfg.output.and_then(|o| o.default_format), Some("text".to_string()));
}

#[test]
fn load_config_near_returns_none_without_a_file() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(config::load_config_near(tmp.path()).is_none());
}

#[test]
fn malformed_config_is_treated_as_absent() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("import-atlas.toml");
    write(&cfg_path, "[layout\nnot toml");
    assert!(config::load_config_at(&cfg_path).is_none());
}

#[test]
fn config_default_format_switches_the_cli_to_json() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(&root.join("a.js"), "import './b';\n");
    write(&root.join("b.js"), "");
    write(&root.join("import-atlas.toml"), "[output]\ndefault_format = \"json\"\n");

    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("analyze").arg("--path").arg(root);
    cmd.env_remove("IMPORT_ATLAS_CONFIG");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"nodes\""))
        .stdout(predicate::str::contains("Analyzed").not());
}

#[test]
fn config_env_var_is_an_alternative_to_the_flag() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(&root.join("a.js"), "");
    let other = root.join("alt.toml");
    write(&other, "[output]\ndefault_format = \"json\"\n");

    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("analyze").arg("--path").arg(root);
    cmd.env("IMPORT_ATLAS_CONFIG", &other);
    cmd.assert().success().stdout(predicate::str::contains("\"nodes\""));
}

#[test]
fn explicit_config_flag_wins_over_the_default_location() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write(&root.join("a.js"), "");
    write(&root.join("import-atlas.toml"), "[output]\ndefault_format = \"json\"\n");
    let other = root.join("alt.toml");
    write(&other, "[output]\ndefault_format = \"text\"\n");

    let mut cmd = Command::cargo_bin("import-atlas").unwrap();
    cmd.arg("analyze").arg("--path").arg(root).arg("--config").arg(&other);
    cmd.env_remove("IMPORT_ATLAS_CONFIG");
    cmd.assert().success().stdout(predicate::str::contains("Analyzed"));
}
