//! End-to-end CLI tests for the biblesync binary.
//!
//! Network-touching subcommands are exercised elsewhere against mock
//! servers; these stick to offline paths.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd_with_temp_db(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("biblesync").unwrap();
    cmd.arg("--db").arg(temp_dir.path().join("cache.db"));
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("biblesync").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download Bible books"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("biblesync").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("biblesync"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    let mut cmd = Command::cargo_bin("biblesync").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("biblesync").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_stats_on_fresh_database_reports_zero() {
    let temp_dir = TempDir::new().unwrap();
    cmd_with_temp_db(&temp_dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Books downloaded:    0"))
        .stdout(predicate::str::contains("Chapters downloaded: 0"));
}

#[test]
fn test_books_lists_the_whole_canon() {
    let temp_dir = TempDir::new().unwrap();
    cmd_with_temp_db(&temp_dir)
        .arg("books")
        .assert()
        .success()
        .stdout(predicate::str::contains("Genesis"))
        .stdout(predicate::str::contains("Revelation"));
}

#[test]
fn test_books_downloaded_filter_is_empty_on_fresh_database() {
    let temp_dir = TempDir::new().unwrap();
    cmd_with_temp_db(&temp_dir)
        .arg("books")
        .arg("--downloaded")
        .assert()
        .success()
        .stdout(predicate::str::contains("Genesis").not());
}

#[test]
fn test_search_keyword_works_offline() {
    let temp_dir = TempDir::new().unwrap();
    cmd_with_temp_db(&temp_dir)
        .args(["search", "peace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("John 14:27"));
}

#[test]
fn test_clear_with_yes_skips_prompt() {
    let temp_dir = TempDir::new().unwrap();
    cmd_with_temp_db(&temp_dir)
        .arg("clear")
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0 cached chapters"));
}

#[test]
fn test_download_unknown_book_reports_it() {
    let temp_dir = TempDir::new().unwrap();
    cmd_with_temp_db(&temp_dir)
        .args(["download", "Atlantis"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown book: Atlantis"));
}
