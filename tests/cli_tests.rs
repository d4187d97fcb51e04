//! CLI integration tests

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the caller's config, cache and `TINIER_*` variables
fn tinier_bin(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tinier").expect("tinier binary is built");
    for (key, _) in std::env::vars() {
        if key.starts_with("TINIER_") {
            cmd.env_remove(key);
        }
    }
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_CACHE_HOME", home.path().join("cache"))
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--input-dir"))
        .stdout(predicate::str::contains("--ffmpeg-min-version"))
        .stdout(predicate::str::contains("--video-preset"))
        .stdout(predicate::str::contains("TINIER_AUDIO_BITRATE"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tinier"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tinier"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_help() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn config_init_then_list_shows_defaults() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .args(["config", "init"])
        .assert()
        .success();

    tinier_bin(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("video.crf: 23"))
        .stdout(predicate::str::contains("image.codec: mjpeg"))
        .stdout(predicate::str::contains("ffmpeg_path: (not set)"));

    tinier_bin(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .args(["config", "set", "video.crf", "30"])
        .assert()
        .success();

    tinier_bin(&home)
        .args(["config", "get", "video.crf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30"));

    tinier_bin(&home)
        .args(["config", "get", "video.preset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn config_set_rejects_out_of_range_value() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .args(["config", "set", "image.qscale", "99"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("image.qscale"));
}

#[test]
fn config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .args(["config", "get", "unknown_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn missing_input_dir_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .current_dir(home.path())
        .args(["--input-dir", "does-not-exist"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("input_dir"));
}

#[test]
fn invalid_setting_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("input");
    fs::create_dir(&input).unwrap();

    tinier_bin(&home)
        .arg("--input-dir")
        .arg(&input)
        .args(["--video-crf", "99"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("video"));
}

#[test]
fn environment_variables_feed_settings() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("input");
    fs::create_dir(&input).unwrap();

    tinier_bin(&home)
        .env("TINIER_INPUT_DIR_PATH", &input)
        .env("TINIER_IMAGE_CODEC", "gif")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("image"));
}

#[test]
fn unknown_flag_is_rejected() {
    let home = TempDir::new().unwrap();
    tinier_bin(&home)
        .arg("--unknown-flag")
        .assert()
        .code(2);
}
