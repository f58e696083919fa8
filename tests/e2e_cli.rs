//! CLI end-to-end tests
//!
//! Tests for the cinetag command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the cinetag binary
#[allow(deprecated)]
fn cinetag_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cinetag").unwrap();
    cmd.env_remove("TMDB_API_KEY").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_no_args_shows_usage() {
    cinetag_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    cinetag_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cinetag"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_cli_version_flag() {
    cinetag_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cinetag"));
}

#[test]
fn test_cli_parse_command() {
    cinetag_cmd()
        .args([
            "parse",
            "Ironheart.S01E01.1080p.WEB-DL.DUAL.5.1.mkv",
            "A.Mulher.no.Jardim.2025.1080p.BluRay.DUAL.5.1.mkv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Ironheart\" [series] S01E01"))
        .stdout(predicate::str::contains("\"A Mulher no Jardim\" [movie] (2025)"));
}

#[test]
fn test_cli_parse_json() {
    let output = cinetag_cmd()
        .args(["parse", "--json", "As.Marvels.2023.1080p.mkv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items[0]["extracted_title"], "As Marvels");
    assert_eq!(items[0]["kind"], "movie");
}

#[test]
fn test_cli_check_tools_command() {
    cinetag_cmd().arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").and(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_missing_directory_fails_without_side_effects() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    cinetag_cmd()
        .current_dir(dir.path())
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));

    assert!(!dir.path().join("cinetag.log").exists());
}

#[test]
fn test_cli_file_instead_of_directory_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("Movie.2020.mkv");
    fs::write(&file, b"x").unwrap();

    cinetag_cmd()
        .current_dir(dir.path())
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_cli_requires_tmdb_key() {
    let dir = tempdir().unwrap();
    let library = dir.path().join("library");
    fs::create_dir(&library).unwrap();
    let config = dir.path().join("cinetag.toml");
    fs::write(&config, "[library]\nlog_file = \"run.log\"\n").unwrap();

    cinetag_cmd()
        .current_dir(dir.path())
        .args(["--config"])
        .arg(&config)
        .arg(&library)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TMDB API key"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cinetag.toml");
    fs::write(
        &config,
        "[tmdb]\napi_key = \"k\"\nprimary_language = \"pt-BR\"\n\n[subtitles]\nenabled = false\n",
    )
    .unwrap();

    cinetag_cmd()
        .arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Subtitles: disabled"));
}

#[test]
fn test_cli_validate_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cinetag.toml");
    fs::write(&config, "[library]\nprocessed_marker = \"\"\n").unwrap();

    cinetag_cmd()
        .arg("validate")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("processed_marker"));
}
