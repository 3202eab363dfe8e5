//! Integration test: run the `boxpub` binary against local box files.
//!
//! These tests need no registry; they cover the commands that work offline
//! and the validation that happens before any network call.

use std::fs::File;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run boxpub and return (stdout, stderr, success).
fn run_cmd(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_boxpub"))
        .args(args)
        .env_remove("HCP_CLIENT_ID")
        .env_remove("HCP_CLIENT_SECRET")
        .env_remove("HCP_API_ADDRESS")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run `boxpub {}`: {}", args.join(" "), e));

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn create_box_file(path: &Path, metadata: &str) {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let file = File::create(path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_size(metadata.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "metadata.json", metadata.as_bytes())
        .unwrap();

    builder.into_inner().unwrap().finish().unwrap();
}

#[test]
fn test_version() {
    let (stdout, _, ok) = run_cmd(&["version"]);
    assert!(ok);
    assert!(stdout.starts_with("boxpub "));
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let box_path = dir.path().join("test.box");
    create_box_file(&box_path, r#"{"provider": "virtualbox", "architecture": "amd64"}"#);

    let (stdout, stderr, ok) = run_cmd(&["inspect", box_path.to_str().unwrap(), "--json"]);
    assert!(ok, "inspect failed: {stderr}");

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["provider"], "virtualbox");
    assert_eq!(value["architecture"], "amd64");
}

#[test]
fn test_inspect_table() {
    let dir = TempDir::new().unwrap();
    let box_path = dir.path().join("test.box");
    create_box_file(&box_path, r#"{"provider": "libvirt"}"#);

    let (stdout, stderr, ok) = run_cmd(&["inspect", box_path.to_str().unwrap()]);
    assert!(ok, "inspect failed: {stderr}");
    assert!(stdout.contains("KEY"));
    assert!(stdout.contains("libvirt"));
}

#[test]
fn test_inspect_missing_metadata_fails() {
    let dir = TempDir::new().unwrap();
    let box_path = dir.path().join("empty.box");
    std::fs::write(&box_path, b"not a box").unwrap();

    let (_, stderr, ok) = run_cmd(&["inspect", box_path.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_publish_reports_all_config_errors() {
    let dir = TempDir::new().unwrap();
    let box_path = dir.path().join("test.box");
    create_box_file(&box_path, r#"{"provider": "virtualbox", "architecture": "amd64"}"#);

    let (_, stderr, ok) = run_cmd(&["publish", box_path.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("box_tag must be set"));
    assert!(stderr.contains("version must be set"));
    assert!(stderr.contains("client_id must be set"));
}
