//! CLI command integration tests.
//! Each test points TRIVIA_STATE into its own temp directory for isolation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn trivia_cmd(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("trivia").unwrap();
    cmd.env("TRIVIA_STATE", dir.path().join("player.json"))
        .env_remove("TRIVIA_CONFIG")
        .env_remove("TRIVIA_CATALOG");
    cmd
}

fn complete(dir: &TempDir, date: &str) -> assert_cmd::assert::Assert {
    trivia_cmd(dir).args(["complete", "--date", date]).assert()
}

#[test]
fn level_for_zero_xp() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["level", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("level:      1"))
        .stdout(predicate::str::contains("novice"))
        .stdout(predicate::str::contains("100 XP to go"));
}

#[test]
fn level_beyond_curve_is_capped() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["level", "999999999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("level:      1000"))
        .stdout(predicate::str::contains("capped"));
}

#[test]
fn xp_for_milestone_level_lists_unlocks() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["xp", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xp:         900"))
        .stdout(predicate::str::contains("bonus-pack-10"))
        .stdout(predicate::str::contains("artifact-1"));
}

#[test]
fn xp_for_out_of_range_level_is_clamped() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["xp", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("level:      1000 (clamped)"));
}

#[test]
fn daily_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let first = trivia_cmd(&dir)
        .args(["daily", "--date", "2024-01-03"])
        .output()
        .unwrap();
    assert!(first.status.success());
    let second = trivia_cmd(&dir)
        .args(["daily", "--date", "2024-01-03"])
        .output()
        .unwrap();
    assert_eq!(first.stdout, second.stdout);

    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("Capitals & Borders"), "{stdout}");
    for n in 1..=5 {
        assert!(stdout.contains(&format!("{n}. [")), "missing challenge {n}: {stdout}");
    }
    assert!(!stdout.contains("6. ["));
}

#[test]
fn daily_marks_assignment_opened() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["status", "--date", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("today:      needs_start"));
    trivia_cmd(&dir)
        .args(["daily", "--date", "2024-01-03"])
        .assert()
        .success();
    trivia_cmd(&dir)
        .args(["status", "--date", "2024-01-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("today:      in_progress"));
}

#[test]
fn streak_sequence_breaks_on_skipped_day() {
    let dir = TempDir::new().unwrap();
    complete(&dir, "2024-01-01")
        .success()
        .stdout(predicate::str::contains("streak:     1 (longest 1)"));
    complete(&dir, "2024-01-02")
        .success()
        .stdout(predicate::str::contains("streak:     2 (longest 2)"));
    complete(&dir, "2024-01-04")
        .success()
        .stdout(predicate::str::contains("streak:     1 (longest 2)"));

    trivia_cmd(&dir)
        .args(["status", "--date", "2024-01-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("today:      completed"));
}

#[test]
fn completing_twice_same_day_awards_once() {
    let dir = TempDir::new().unwrap();
    complete(&dir, "2024-02-01")
        .success()
        .stdout(predicate::str::contains("+60 XP"));
    complete(&dir, "2024-02-01")
        .success()
        .stdout(predicate::str::contains("already completed"));
    trivia_cmd(&dir)
        .args(["status", "--date", "2024-02-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xp:         60 "));
}

#[test]
fn backwards_completion_rejected() {
    let dir = TempDir::new().unwrap();
    complete(&dir, "2024-01-05").success();
    complete(&dir, "2024-01-03")
        .failure()
        .stderr(predicate::str::contains("precedes"));
    // state untouched
    trivia_cmd(&dir)
        .args(["status", "--date", "2024-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("streak:     1"));
}

#[test]
fn broken_streak_shows_zero() {
    let dir = TempDir::new().unwrap();
    complete(&dir, "2024-01-01").success();
    trivia_cmd(&dir)
        .args(["status", "--date", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("streak:     1 (longest 1, at_risk)"));
    trivia_cmd(&dir)
        .args(["status", "--date", "2024-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("streak:     0 (longest 1, broken)"));
}

#[test]
fn config_file_overrides_scoring() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("trivia.toml");
    std::fs::write(&config, "[scoring]\ndaily_bonus = 500\n").unwrap();
    trivia_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .args(["complete", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+510 XP"));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("trivia.toml");
    std::fs::write(&config, "[difficulty]\nwindow_size = 0\n").unwrap();
    trivia_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .args(["level", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_size"));
}

#[test]
fn invalid_date_fails() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["daily", "--date", "2024-02-30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad --date"));
}

#[test]
fn play_session_from_stdin() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["play", "--count", "3", "--seed", "42"])
        .write_stdin("1\n2\n3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Q1 [tier 2"))
        .stdout(predicate::str::contains("Q3 "))
        .stdout(predicate::str::contains("answered 3"));
    // every answer earns at least the consolation XP
    assert!(dir.path().join("player.json").exists());
}

#[test]
fn play_stops_when_stdin_ends() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["play", "--count", "5", "--seed", "7"])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("answered 1"));
}

#[test]
fn play_exhausts_continent() {
    let dir = TempDir::new().unwrap();
    trivia_cmd(&dir)
        .args(["play", "--count", "10", "--seed", "3", "--continent", "antarctica"])
        .write_stdin("1\n".repeat(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("no more questions"))
        .stdout(predicate::str::contains("answered 5"));
}

#[test]
fn custom_catalog_is_used() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog.json");
    std::fs::write(
        &catalog,
        r#"{
            "questions": [{"id": "q1", "continent": "asia", "category": "x", "difficulty": 1,
                "text": "Only question here?", "choices": ["a", "b"], "answer": 0}],
            "facts": [{"id": "f1", "continent": "asia", "text": "A fact."}],
            "themes": [{"id": "t1", "name": "Theme"}]
        }"#,
    )
    .unwrap();
    trivia_cmd(&dir)
        .arg("--catalog")
        .arg(&catalog)
        .args(["play", "--count", "1", "--seed", "1"])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Only question here?"))
        .stdout(predicate::str::contains("correct! +15 XP"));
}
