//! Integration tests for the `tb` CLI.
//!
//! Each test points `tb` at a temp data directory, runs it as a subprocess,
//! and verifies stdout and/or the stored slot.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `tb` binary.
fn tb_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tb");
    path
}

/// Disable the welcome task so tests start from an empty board.
fn create_empty_board(dir: &Path) {
    fs::write(dir.join("config.toml"), "[board]\nseed_demo = false\n").unwrap();
}

/// Run `tb` against `dir`, returning (stdout, stderr, success).
fn run_tb(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tb_bin())
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to run tb");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tb` expecting success, return stdout.
fn run_tb_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tb(dir, args);
    if !success {
        panic!(
            "tb {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn add(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    run_tb_ok(dir, &full).trim().to_string()
}

fn list_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json", "list"];
    full.extend_from_slice(args);
    serde_json::from_str(&run_tb_ok(dir, &full)).unwrap()
}

fn titles(list: &serde_json::Value) -> Vec<String> {
    list["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// First run
// ---------------------------------------------------------------------------

#[test]
fn test_first_run_shows_demo_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_tb_ok(tmp.path(), &["list"]);
    assert!(out.contains("Welcome — try this demo task"));
    assert!(out.contains("20%"));
    assert!(tmp.path().join("tasks_v1.json").exists());
}

#[test]
fn test_no_subcommand_lists() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let out = run_tb_ok(tmp.path(), &[]);
    assert!(out.contains("No tasks yet"));
    assert!(out.contains("0 total, 0 completed"));
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

#[test]
fn test_add_prints_id_and_persists() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());

    let id = add(tmp.path(), &["Buy milk", "--desc", "two litres", "--priority", "high"]);
    assert!(!id.is_empty());

    let stored = fs::read_to_string(tmp.path().join("tasks_v1.json")).unwrap();
    assert!(stored.contains(&id));
    assert!(stored.contains("\"desc\":\"two litres\""));

    let show = run_tb_ok(tmp.path(), &["show", &id]);
    assert!(show.contains("Buy milk"));
    assert!(show.contains("priority:  high"));
}

#[test]
fn test_add_blank_title_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());

    let (_, stderr, success) = run_tb(tmp.path(), &["add", "   "]);
    assert!(!success);
    assert!(stderr.contains("please enter a title"));
    assert_eq!(list_json(tmp.path(), &[])["tasks"].as_array().unwrap().len(), 0);
}

#[test]
fn test_add_full_progress_is_done() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let id = add(tmp.path(), &["Buy milk", "--progress", "100"]);

    let out: serde_json::Value =
        serde_json::from_str(&run_tb_ok(tmp.path(), &["--json", "show", &id])).unwrap();
    assert_eq!(out["completed"], true);
    assert_eq!(out["done"], true);
}

#[test]
fn test_add_rejects_progress_over_100() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let (_, _, success) = run_tb(tmp.path(), &["add", "Too much", "--progress", "150"]);
    assert!(!success);
}

#[test]
fn test_done_toggles_and_reopens_at_99() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let id = add(tmp.path(), &["Ship it", "--progress", "30"]);

    let out = run_tb_ok(tmp.path(), &["done", &id]);
    assert!(out.contains("completed"));
    assert!(out.contains("100%"));

    let out = run_tb_ok(tmp.path(), &["done", &id]);
    assert!(out.contains("reopened"));
    assert!(out.contains("99%"));
}

#[test]
fn test_done_unknown_is_silent() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let out = run_tb_ok(tmp.path(), &["done", "nope"]);
    assert!(out.is_empty());
}

#[test]
fn test_edit_merges_fields() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let id = add(
        tmp.path(),
        &["Draft", "--desc", "keep me", "--due", "2024-06-20"],
    );
    run_tb_ok(tmp.path(), &["done", &id]);

    run_tb_ok(tmp.path(), &["edit", &id, "--title", "Final", "--progress", "60"]);
    let out: serde_json::Value =
        serde_json::from_str(&run_tb_ok(tmp.path(), &["--json", "show", &id])).unwrap();
    assert_eq!(out["title"], "Final");
    assert_eq!(out["description"], "keep me");
    assert_eq!(out["due"], "2024-06-20");
    assert_eq!(out["progress"], 60);
    // Editing recomputes completion from progress
    assert_eq!(out["completed"], false);

    run_tb_ok(tmp.path(), &["edit", &id, "--no-due"]);
    let out: serde_json::Value =
        serde_json::from_str(&run_tb_ok(tmp.path(), &["--json", "show", &id])).unwrap();
    assert!(out["due"].is_null());
}

#[test]
fn test_rm_requires_confirmation() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let id = add(tmp.path(), &["Keep"]);

    // stdin is closed, so the prompt reads no answer
    let out = run_tb_ok(tmp.path(), &["rm", &id]);
    assert!(out.contains("cancelled"));
    assert_eq!(titles(&list_json(tmp.path(), &[])), vec!["Keep"]);

    let out = run_tb_ok(tmp.path(), &["rm", &id, "--yes"]);
    assert!(out.contains("deleted"));
    assert!(titles(&list_json(tmp.path(), &[])).is_empty());

    let log = run_tb_ok(tmp.path(), &["recovery"]);
    assert!(log.contains("delete: task deleted"));
    assert!(log.contains(&id));
}

#[test]
fn test_rm_unknown_is_silent() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    add(tmp.path(), &["Keep"]);
    let out = run_tb_ok(tmp.path(), &["rm", "unknown", "--yes"]);
    assert!(out.is_empty());
    assert_eq!(titles(&list_json(tmp.path(), &[])), vec!["Keep"]);
}

#[test]
fn test_clear_all() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    add(tmp.path(), &["A"]);
    add(tmp.path(), &["B"]);

    let out = run_tb_ok(tmp.path(), &["clear", "--yes"]);
    assert!(out.contains("cleared 2 tasks"));
    let stored = fs::read_to_string(tmp.path().join("tasks_v1.json")).unwrap();
    assert_eq!(stored, "[]");
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[test]
fn test_list_orders_high_priority_first() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    add(tmp.path(), &["Old low", "--priority", "low"]);
    add(tmp.path(), &["New high", "--priority", "high"]);
    add(tmp.path(), &["Newest medium"]);

    assert_eq!(
        titles(&list_json(tmp.path(), &[])),
        vec!["New high", "Old low", "Newest medium"]
    );
}

#[test]
fn test_list_filter_and_search() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let milk = add(tmp.path(), &["Buy milk"]);
    add(tmp.path(), &["Walk dog", "--desc", "around the park"]);
    run_tb_ok(tmp.path(), &["done", &milk]);

    assert_eq!(titles(&list_json(tmp.path(), &["--filter", "done"])), vec!["Buy milk"]);
    assert_eq!(titles(&list_json(tmp.path(), &["--filter", "active"])), vec!["Walk dog"]);
    assert_eq!(titles(&list_json(tmp.path(), &["--search", "MILK"])), vec!["Buy milk"]);
    assert_eq!(titles(&list_json(tmp.path(), &["--search", "PARK"])), vec!["Walk dog"]);

    let out = run_tb_ok(tmp.path(), &["list", "--search", "cheese"]);
    assert!(out.contains("No tasks yet"));
}

#[test]
fn test_default_filter_from_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[board]\nseed_demo = false\n[ui]\ndefault_filter = \"active\"\n",
    )
    .unwrap();
    let done = add(tmp.path(), &["Finished"]);
    add(tmp.path(), &["Open"]);
    run_tb_ok(tmp.path(), &["done", &done]);

    let list = list_json(tmp.path(), &[]);
    assert_eq!(list["filter"], "active");
    assert_eq!(titles(&list), vec!["Open"]);
}

#[test]
fn test_stats_with_fixed_today() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    add(tmp.path(), &["Late", "--due", "2024-06-09", "--progress", "50"]);
    add(tmp.path(), &["Soon", "--due", "2024-06-12"]);
    let done = add(tmp.path(), &["Done early", "--due", "2024-06-01"]);
    run_tb_ok(tmp.path(), &["done", &done]);

    let out: serde_json::Value = serde_json::from_str(&run_tb_ok(
        tmp.path(),
        &["--json", "--today", "2024-06-10", "stats"],
    ))
    .unwrap();
    assert_eq!(out["total"], 3);
    assert_eq!(out["completed"], 1);
    assert_eq!(out["overall_percent"], 50);
    assert_eq!(out["next_due"], "2024-06-09");
    assert_eq!(out["overdue"], 1);

    let text = run_tb_ok(tmp.path(), &["--today", "2024-06-10", "stats"]);
    assert!(text.contains("Overdue   1"));
}

#[test]
fn test_show_unknown_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    let (_, stderr, success) = run_tb(tmp.path(), &["show", "nope"]);
    assert!(!success);
    assert!(stderr.contains("task not found: nope"));
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[test]
fn test_corrupt_slot_recovers_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_empty_board(tmp.path());
    fs::write(tmp.path().join("tasks_v1.json"), "{{{ not json").unwrap();

    let (stdout, stderr, success) = run_tb(tmp.path(), &["list"]);
    assert!(success);
    assert!(stderr.contains("warning: could not load saved tasks"));
    assert!(stdout.contains("No tasks yet"));

    let log = run_tb_ok(tmp.path(), &["recovery"]);
    assert!(log.contains("parser: unreadable task slot"));
    assert!(log.contains("{{{ not json"));

    let out = run_tb_ok(tmp.path(), &["recovery", "--prune", "--all"]);
    assert!(out.contains("pruned"));
    let log = run_tb_ok(tmp.path(), &["recovery"]);
    assert!(log.contains("recovery log is empty"));
}
