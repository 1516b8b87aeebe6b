//! End-to-end CLI tests: drive the `atlas-scan` binary against a small
//! on-disk module layout the way `atlas-cli`'s `tests/*.rs` drive the
//! `atlas` binary (temp dir fixtures, `assert_cmd`, parse stdout/output
//! files back into `serde_json::Value`).

use std::fs;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn atlas_scan() -> Command {
    Command::cargo_bin("atlas-scan").unwrap()
}

#[test]
fn scan_emits_root_and_overlay() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.atlas"), "import Foundation\n").unwrap();
    fs::write(
        dir.path().join("Foundation.atlasinterface"),
        "import Foundation\n",
    )
    .unwrap();
    fs::write(dir.path().join("Foundation.modulemap"), "").unwrap();

    let output_path = dir.path().join("out.json");
    atlas_scan()
        .arg("scan")
        .arg("--module-name")
        .arg("App")
        .arg("--source-file")
        .arg(dir.path().join("app.atlas"))
        .arg("--search-path")
        .arg(dir.path())
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let body = fs::read_to_string(&output_path).unwrap();
    let doc: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(doc["mainModuleName"], "App");

    // `modules` is a flat array of sibling id-object/detail-object pairs
    // (§6): every even-indexed element is an id object.
    let modules = doc["modules"].as_array().unwrap();
    let names: Vec<&str> = modules
        .iter()
        .step_by(2)
        .map(|id| id.as_object().unwrap().values().next().unwrap().as_str().unwrap())
        .collect();
    assert!(names.contains(&"App"));
    assert!(names.contains(&"Foundation"));
}

#[test]
fn scan_detects_a_cycle_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.atlas"), "import X\n").unwrap();
    fs::write(dir.path().join("X.atlasinterface"), "import Y\n").unwrap();
    fs::write(dir.path().join("Y.atlasinterface"), "import X\n").unwrap();

    let output_path = dir.path().join("out.json");
    atlas_scan()
        .arg("scan")
        .arg("--module-name")
        .arg("App")
        .arg("--source-file")
        .arg(dir.path().join("app.atlas"))
        .arg("--search-path")
        .arg(dir.path())
        .arg("--output")
        .arg(&output_path)
        .assert()
        .failure();
}

#[test]
fn prescan_emits_direct_imports_only() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("app.atlas"),
        "import Alpha\nimport Beta\n",
    )
    .unwrap();

    let output = atlas_scan()
        .arg("prescan")
        .arg("--module-name")
        .arg("App")
        .arg("--source-file")
        .arg(dir.path().join("app.atlas"))
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let doc: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["imports"], serde_json::json!(["Alpha", "Beta"]));
}

#[test]
fn batch_scan_runs_every_entry_and_shares_arguments_keyed_sub_instances() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.atlas"), "import Shared\n").unwrap();
    fs::write(dir.path().join("Shared.atlasinterface"), "").unwrap();

    let out_a = dir.path().join("a.json");
    let out_b = dir.path().join("b.json");
    let batch_yaml = format!(
        "- atlasModuleName: First\n  arguments: \"-Xcc -DFOO\"\n  output: {:?}\n- atlasModuleName: Second\n  arguments: \"-Xcc -DFOO\"\n  output: {:?}\n",
        out_a, out_b
    );
    let batch_path = dir.path().join("batch.yaml");
    fs::write(&batch_path, batch_yaml).unwrap();

    atlas_scan()
        .arg("batch-scan")
        .arg("--batch-input")
        .arg(&batch_path)
        .arg("--source-file")
        .arg(dir.path().join("app.atlas"))
        .arg("--search-path")
        .arg(dir.path())
        .assert()
        .success();

    for path in [&out_a, &out_b] {
        let body = fs::read_to_string(path).unwrap();
        let doc: Value = serde_json::from_str(&body).unwrap();
        assert!(doc["mainModuleName"].is_string());
    }
}

#[test]
fn batch_scan_reports_a_missing_output_as_a_hard_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.atlas"), "").unwrap();
    let batch_path = dir.path().join("batch.yaml");
    fs::write(&batch_path, "- atlasModuleName: App\n").unwrap();

    atlas_scan()
        .arg("batch-scan")
        .arg("--batch-input")
        .arg(&batch_path)
        .arg("--source-file")
        .arg(dir.path().join("app.atlas"))
        .assert()
        .failure();
}
