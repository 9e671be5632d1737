//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data
//! directory and checks the JSON it prints.

use std::path::Path;
use std::process::Command;

use chrono::Local;
use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_focuslog"))
        .env("FOCUSLOG_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is not JSON")
}

fn with_user() -> TempDir {
    let dir = TempDir::new().unwrap();
    run_json(dir.path(), &["user", "add", "alice", "alice@example.com"]);
    dir
}

#[test]
fn test_first_user_becomes_active() {
    let dir = with_user();
    let user = run_json(dir.path(), &["user", "show"]);
    assert_eq!(user["username"], "alice");

    let categories = run_json(dir.path(), &["category", "list"]);
    let names: Vec<_> = categories
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Study", "Work", "Exercise"]);
}

#[test]
fn test_commands_without_user_fail() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["checkin", "status"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no active user"));
}

#[test]
fn test_duplicate_user_is_rejected() {
    let dir = with_user();
    let (code, _, stderr) = run_cli(dir.path(), &["user", "add", "alice", "other@example.com"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_checkin_after_logging_goal() {
    let dir = with_user();
    let before = run_json(dir.path(), &["checkin", "status"]);
    assert_eq!(before["status"]["streak_days"], 0);
    assert_eq!(before["status"]["today_completed"], false);

    let categories = run_json(dir.path(), &["category", "list"]);
    let study = categories[0]["id"].to_string();
    let started_at = format!("{}T00:05:00", Local::now().date_naive().format("%Y-%m-%d"));
    run_json(
        dir.path(),
        &["session", "log", &study, "--minutes", "120", "--started-at", &started_at],
    );

    let after = run_json(dir.path(), &["checkin", "status"]);
    assert_eq!(after["status"]["streak_days"], 1);
    assert_eq!(after["status"]["today_duration"], 7200);
    assert_eq!(after["status"]["today_count"], 1);
    assert_eq!(after["status"]["today_completed"], true);
    assert_eq!(after["progress"]["remaining"], 0);

    let streak = run_json(dir.path(), &["checkin", "streak"]);
    assert_eq!(streak["streak_days"], 1);
}

#[test]
fn test_settings_goal_and_exam() {
    let dir = with_user();
    let settings = run_json(
        dir.path(),
        &["settings", "set", "--daily-goal", "600", "--exam-name", "TOEFL"],
    );
    assert_eq!(settings["daily_goal"], 600);
    assert_eq!(settings["exam_name"], "TOEFL");

    let (code, _, stderr) = run_cli(dir.path(), &["settings", "set", "--exam-date", "soon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error"));
}

#[test]
fn test_words_submit_twice_updates() {
    let dir = with_user();
    let first = run_json(dir.path(), &["words", "submit", "30", "--date", "2024-03-10"]);
    assert_eq!(first["outcome"], "created");
    let second = run_json(dir.path(), &["words", "submit", "45", "--date", "2024-03-10"]);
    assert_eq!(second["outcome"], "updated");
    assert_eq!(second["record"]["word_count"], 45);

    let list = run_json(dir.path(), &["words", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn test_stats_and_leaderboard() {
    let dir = with_user();
    let study = run_json(dir.path(), &["category", "list"])[0]["id"].to_string();
    run_json(
        dir.path(),
        &["session", "log", &study, "--minutes", "25", "--started-at", "2024-03-10T09:00:00"],
    );

    let total = run_json(dir.path(), &["stats", "total"]);
    assert_eq!(total["total_duration"], 1500);

    let daily = run_json(dir.path(), &["stats", "daily"]);
    assert_eq!(daily[0]["date"], "2024-03-10");

    let board = run_json(dir.path(), &["stats", "leaderboard"]);
    assert_eq!(board[0]["username"], "alice");
}

#[test]
fn test_session_log_huge_duration_fails_cleanly() {
    let dir = with_user();
    let study = run_json(dir.path(), &["category", "list"])[0]["id"].to_string();

    for args in [
        vec!["session", "log", study.as_str(), "--minutes", "1000000000000"],
        vec!["session", "log", study.as_str(), "--minutes", "18446744073709551615"],
        vec![
            "session", "log", study.as_str(), "--minutes", "1000000000000",
            "--started-at", "2024-03-10T09:00:00",
        ],
    ] {
        let (code, _, stderr) = run_cli(dir.path(), &args);
        assert_eq!(code, 1, "{args:?}: {stderr}");
        assert!(stderr.contains("duration"), "{args:?}: {stderr}");
        assert!(!stderr.contains("panicked"), "{args:?}: {stderr}");
    }
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "streak.malformed_dates"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "skip");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "streak.malformed_dates", "stop"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "streak.malformed_dates"]);
    assert_eq!(stdout.trim(), "stop");

    let (code, _, stderr) = run_cli(dir.path(), &["config", "set", "stats.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("nope"));
}
