//! CLI tests for threedb-export
//!
//! Runs the built binary against generated 3DB files

use std::path::Path;
use std::process::Command;

use tempfile::tempdir;
use threedb::fixture::two_keyframe_triangle;

fn threedb_export() -> Command {
    Command::new(env!("CARGO_BIN_EXE_threedb-export"))
}

fn write_model(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, two_keyframe_triangle().build()).expect("Failed to write model");
}

/// Test single-file conversion to glTF
#[test]
fn test_cli_convert_gltf() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("ringe.3db");
    let out = dir.path().join("out");
    write_model(&input);

    let status = threedb_export()
        .args([
            "convert",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "-f",
            "gltf",
        ])
        .status()
        .expect("Failed to run threedb-export");

    assert!(status.success(), "threedb-export convert command failed");
    assert!(out.join("ringe_out.gltf").is_file());
    assert!(out.join("ringe_vertices.bin").is_file());

    let (document, _buffers, _images) =
        gltf::import(out.join("ringe_out.gltf")).expect("Failed to load exported glTF");
    assert_eq!(document.animations().count(), 1);
}

/// Test output defaults to the input directory as GLB
#[test]
fn test_cli_convert_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("ringe.3db");
    write_model(&input);

    let status = threedb_export()
        .args(["convert", input.to_str().unwrap()])
        .status()
        .expect("Failed to run threedb-export");

    assert!(status.success(), "threedb-export convert command failed");
    assert!(dir.path().join("ringe_out.glb").is_file());
}

/// Test a non-positive frame rate is rejected
#[test]
fn test_cli_convert_rejects_zero_frame_rate() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("ringe.3db");
    write_model(&input);

    let status = threedb_export()
        .args(["convert", input.to_str().unwrap(), "--frame-rate", "0"])
        .status()
        .expect("Failed to run threedb-export");

    assert!(!status.success());
    assert!(!dir.path().join("ringe_out.glb").exists());
}

/// Test an infinite frame rate is rejected
#[test]
fn test_cli_convert_rejects_infinite_frame_rate() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("ringe.3db");
    write_model(&input);

    let status = threedb_export()
        .args(["convert", input.to_str().unwrap(), "--frame-rate", "inf"])
        .status()
        .expect("Failed to run threedb-export");

    assert!(!status.success());
    assert!(!dir.path().join("ringe_out.glb").exists());
}

/// Test a corrupt file fails the command
#[test]
fn test_cli_convert_corrupt_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("broken.3db");
    std::fs::write(&input, [0x10, 0x00]).unwrap();

    let status = threedb_export()
        .args(["convert", input.to_str().unwrap()])
        .status()
        .expect("Failed to run threedb-export");

    assert!(!status.success());
}

/// Test info prints the decoded structure
#[test]
fn test_cli_info() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("ringe.3db");
    write_model(&input);

    let output = threedb_export()
        .args(["info", input.to_str().unwrap()])
        .output()
        .expect("Failed to run threedb-export");

    assert!(output.status.success(), "threedb-export info command failed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Model: ringe"));
    assert!(stdout.contains("spin: 2 keyframes"));
    assert!(stdout.contains("ringe_tex"));
}

/// Test manifest check and build
#[test]
fn test_cli_manifest_build() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_model(&dir.path().join("assets/in/ringe.3db"));
    write_model(&dir.path().join("assets/in/other.3db"));

    let manifest = dir.path().join("threedb.toml");
    std::fs::write(
        &manifest,
        r#"
[input]
models = ["ringe.3db"]

[output]
format = "gltf"
"#,
    )
    .unwrap();

    let status = threedb_export()
        .args(["check", manifest.to_str().unwrap()])
        .status()
        .expect("Failed to run threedb-export");
    assert!(status.success(), "threedb-export check command failed");

    let status = threedb_export()
        .args(["build", manifest.to_str().unwrap()])
        .status()
        .expect("Failed to run threedb-export");
    assert!(status.success(), "threedb-export build command failed");

    let out = dir.path().join("assets/out");
    assert!(out.join("ringe_out.gltf").is_file());
    assert!(!out.join("other_out.gltf").exists());
}

/// Test check fails when nothing is selected
#[test]
fn test_cli_check_without_selection() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::create_dir_all(dir.path().join("assets/in")).unwrap();
    let manifest = dir.path().join("threedb.toml");
    std::fs::write(&manifest, "[input]\n").unwrap();

    let status = threedb_export()
        .args(["check", manifest.to_str().unwrap()])
        .status()
        .expect("Failed to run threedb-export");

    assert!(!status.success());
}
