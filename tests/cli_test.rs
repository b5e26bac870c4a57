// tests/cli_test.rs
use std::process::Command;

fn bot() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sweekt-bot"));
    for key in [
        "GITHUB_REF",
        "GITHUB_REPOSITORY",
        "GITHUB_TOKEN",
        "RUNNER_DEBUG",
        "RUST_LOG",
    ] {
        command.env_remove(key);
    }
    command
}

#[test]
fn test_help_lists_commands() {
    let output = bot().arg("--help").output().expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("bump-version-file"));
    assert!(stdout.contains("sync-upstream-tags"));
    assert!(stdout.contains("pin-wrapper-version"));
    assert!(stdout.contains("calculate-version"));
}

#[test]
fn test_missing_environment_exits_with_error_annotation() {
    let workdir = tempfile::tempdir().unwrap();
    let output = bot()
        .args(["--workdir", workdir.path().to_str().unwrap(), "sync-upstream-tags"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("::error::"));
    assert!(stdout.contains("GITHUB_REPOSITORY"));
}

#[test]
fn test_calculate_version_of_checked_out_branch() {
    let workdir = tempfile::tempdir().unwrap();
    let status = Command::new("git")
        .args(["init", "-q", "-b", "release/8.4-RC2"])
        .current_dir(workdir.path())
        .status()
        .expect("git is available");
    assert!(status.success());
    std::fs::write(workdir.path().join("version.txt"), "8.4.0.1\n").unwrap();

    let output = bot()
        .args(["--workdir", workdir.path().to_str().unwrap(), "calculate-version"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), "8.4.0.1-rc-2");
}
