use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const FAST_PACING: &str = "[pacing]
baseline_step_ms = 2
optimized_step_ms = 3
settle_ms = 1
processing_stage_ms = 1
";

fn acbo(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_acbo"))
        .arg("--config")
        .arg(config)
        .arg("--json")
        .args(args)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "off")
        .output()
        .expect("Should run acbo")
}

fn stdout_json(output: &Output) -> Value {
    assert!(output.status.success(), "acbo failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, String::from_utf8_lossy(&output.stdout)))
}

fn fast_config() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, FAST_PACING).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_run_prints_only_json() {
    let (_dir, config) = fast_config();

    let value = stdout_json(&acbo(&config, &["run", "insurance-claim"]));

    let results = value.as_array().expect("Should be an array of results");
    assert_eq!(results.len(), 2);
}

#[test]
fn test_query_prints_only_json() {
    let (_dir, config) = fast_config();

    let value = stdout_json(&acbo(&config, &["query", "What is covered?", "--baseline"]));

    assert!(value.is_object());
}

#[test]
fn test_upload_prints_documents_as_json() {
    let (_dir, config) = fast_config();

    let value = stdout_json(&acbo(&config, &["upload", "a.pdf", "b.docx"]));

    let documents = value.as_array().expect("Should be an array of documents");
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["name"], "a.pdf");
}

#[test]
fn test_config_prints_json() {
    let (_dir, config) = fast_config();

    let value = stdout_json(&acbo(&config, &["config"]));

    assert_eq!(value["pacing"]["processing_stage_ms"], 1);
}
