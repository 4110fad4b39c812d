//! End-to-end integration tests for the `loomc` CLI.
//!
//! Each test writes a Surface or Blocks XML file to a temp directory,
//! invokes the `loomc` binary, and asserts the translated output.

use std::path::PathBuf;
use std::process::Command;

fn find_loomc() -> PathBuf {
    let mut path = std::env::current_exe()
        .expect("cannot find current exe")
        .parent()
        .expect("cannot find parent dir")
        .to_path_buf();

    if path.file_name().map_or(false, |n| n == "deps") {
        path = path.parent().unwrap().to_path_buf();
    }

    let loomc = path.join("loomc");
    assert!(
        loomc.exists(),
        "loomc binary not found at {}. Run `cargo build -p loomc` first.",
        loomc.display()
    );
    loomc
}

#[test]
fn translates_surface_to_blocks_and_back() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let surface_path = dir.path().join("main.loom");
    std::fs::write(&surface_path, "global total = 0").expect("failed to write source");

    let loomc = find_loomc();
    let to_blocks = Command::new(&loomc)
        .args(["to-blocks", surface_path.to_str().unwrap()])
        .output()
        .expect("failed to invoke loomc to-blocks");
    assert!(
        to_blocks.status.success(),
        "to-blocks failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&to_blocks.stdout),
        String::from_utf8_lossy(&to_blocks.stderr)
    );

    let xml = String::from_utf8_lossy(&to_blocks.stdout).to_string();
    assert!(xml.contains("global_declaration"));

    let xml_path = dir.path().join("main.xml");
    std::fs::write(&xml_path, xml.trim()).expect("failed to write xml");

    let to_surface = Command::new(&loomc)
        .args(["to-surface", xml_path.to_str().unwrap()])
        .output()
        .expect("failed to invoke loomc to-surface");
    assert!(
        to_surface.status.success(),
        "to-surface failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&to_surface.stdout),
        String::from_utf8_lossy(&to_surface.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&to_surface.stdout).trim(), "global total = 0");
}

#[test]
fn reports_parse_errors_and_exits_nonzero() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let surface_path = dir.path().join("broken.loom");
    std::fs::write(&surface_path, "global = ").expect("failed to write source");

    let loomc = find_loomc();
    let output = Command::new(&loomc)
        .args(["to-blocks", surface_path.to_str().unwrap()])
        .output()
        .expect("failed to invoke loomc to-blocks");

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn to_blocks_respects_component_registry() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let surface_path = dir.path().join("main.loom");
    std::fs::write(&surface_path, "when Button1.Click {\n println(\"hi\")\n}").expect("failed to write source");
    let components_path = dir.path().join("components.json");
    std::fs::write(&components_path, r#"{"Button": ["Button1"]}"#).expect("failed to write component registry");

    let loomc = find_loomc();
    let output = Command::new(&loomc)
        .args([
            "to-blocks",
            surface_path.to_str().unwrap(),
            "--components",
            components_path.to_str().unwrap(),
        ])
        .output()
        .expect("failed to invoke loomc to-blocks");

    assert!(
        output.status.success(),
        "to-blocks failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("component_event"));
}
