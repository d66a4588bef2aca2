//! Basic CLI tests.
//!
//! Each test drives the built binary against its own data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command with `LIFEOS_DATA_DIR` set, feeding `stdin`.
fn run_cli_with_input(data_dir: &Path, args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_lifeos"))
        .args(args)
        .env("LIFEOS_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    run_cli_with_input(data_dir, args, "")
}

fn seed_knowledge(data_dir: &Path) {
    let kb = data_dir.join("knowledge");
    std::fs::create_dir_all(kb.join("lang")).unwrap();
    std::fs::write(
        kb.join("lang/lifetimes.md"),
        "# Lifetimes\n\nQ: What does 'static mean?\nA: Valid for the whole program.\n\nQ: Elided in fn(&str) -> &str?\nA: Output borrows the input.\n",
    )
    .unwrap();
}

#[test]
fn test_config_path_is_inside_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(stdout.contains(dir.path().to_str().unwrap()));
}

#[test]
fn test_config_get_and_set() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "garden.daily_cap"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "3");

    let (code, stdout, _) = run_cli(dir.path(), &["config", "set", "garden.daily_cap", "5"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "garden.daily_cap"]);
    assert_eq!(stdout.trim(), "5");
    assert!(std::fs::read_to_string(dir.path().join("config.toml"))
        .unwrap()
        .contains("daily_cap = 5"));
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();

    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "garden.daily_cap", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "garden.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "garden.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_list_is_json() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["garden"]["intervals"][4], 8);
    assert_eq!(parsed["knowledge"]["extension"], "md");
}

#[test]
fn test_review_due_json_lists_new_cards() {
    let dir = tempfile::tempdir().unwrap();
    seed_knowledge(dir.path());

    let (code, stdout, _) = run_cli(dir.path(), &["review", "due", "--json"]);
    assert_eq!(code, 0);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let due = due.as_array().unwrap();
    assert_eq!(due.len(), 2);
    assert!(due.iter().all(|c| c["source"] == "lang/lifetimes.md"));
    assert!(due.iter().all(|c| c["context"] == "Lifetimes"));
    assert!(due.iter().all(|c| c["next_review"].is_null()));
}

#[test]
fn test_review_run_saves_progress() {
    let dir = tempfile::tempdir().unwrap();
    seed_knowledge(dir.path());

    let (code, stdout, _) = run_cli_with_input(dir.path(), &["review", "run"], "\n4\n\n3\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("Session started: 2 cards due."));
    assert!(stdout.contains("Session complete. 2 cards reviewed."));

    let progress: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("flashcard_progress.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(progress.as_object().unwrap().len(), 2);

    let (_, stdout, _) = run_cli(dir.path(), &["review", "due", "--json"]);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(due.as_array().unwrap().is_empty());
}

#[test]
fn test_review_run_end_of_input_pauses() {
    let dir = tempfile::tempdir().unwrap();
    seed_knowledge(dir.path());

    let (code, stdout, _) = run_cli_with_input(dir.path(), &["review", "run"], "\n1\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("Session paused. 1 reviewed, 1 still due."));
}

#[test]
fn test_review_without_knowledge_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["review", "due"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_review_prune_drops_vanished_cards() {
    let dir = tempfile::tempdir().unwrap();
    seed_knowledge(dir.path());
    std::fs::write(
        dir.path().join("flashcard_progress.json"),
        r#"{"deadbeefdeadbeef": {"repetitions": 1, "ease_factor": 2.5, "interval": 1, "next_review": "2024-01-02", "last_review": "2024-01-01"}}"#,
    )
    .unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["review", "prune"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("pruned 1 orphaned card(s)"));
    let progress = std::fs::read_to_string(dir.path().join("flashcard_progress.json")).unwrap();
    assert!(!progress.contains("deadbeefdeadbeef"));
}

#[test]
fn test_review_prune_refuses_when_a_document_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    seed_knowledge(dir.path());
    let (code, _, _) = run_cli_with_input(dir.path(), &["review", "run"], "\n4\n\n4\n");
    assert_eq!(code, 0);
    let progress_path = dir.path().join("flashcard_progress.json");
    let before = std::fs::read_to_string(&progress_path).unwrap();

    let lifetimes = dir.path().join("knowledge/lang/lifetimes.md");
    let mut bytes = std::fs::read(&lifetimes).unwrap();
    bytes.extend_from_slice(b"\xff\n");
    std::fs::write(&lifetimes, bytes).unwrap();

    let (code, stdout, stderr) = run_cli(dir.path(), &["review", "prune"]);
    assert_eq!(code, 1);
    assert!(!stdout.contains("pruned"));
    assert!(stderr.contains("lifetimes.md"));
    assert_eq!(std::fs::read_to_string(&progress_path).unwrap(), before);
}

#[test]
fn test_garden_status_reads_saved_state() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["garden", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No documents tracked yet."));

    std::fs::write(
        dir.path().join("garden_state.json"),
        r#"{
  "items": {
    "rust/traits.md": {"stage": 2, "last_review": "2024-05-01", "next_review": "2024-05-04"},
    "go/channels.md": {"stage": 0, "last_review": null, "next_review": "2999-01-01"}
  },
  "active_reminders": {"rust/traits.md": "8123"}
}"#,
    )
    .unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["garden", "status", "--json"]);
    assert_eq!(code, 0);
    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["path"], "go/channels.md");
    assert_eq!(rows[0]["due"], false);
    assert_eq!(rows[1]["stage"], 2);
    assert_eq!(rows[1]["reminder"], "8123");
}
