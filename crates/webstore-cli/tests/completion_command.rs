use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_webstore_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("webstore")
}

#[test]
fn test_completion_bash_generates_script() {
    let mut cmd = Command::new(get_webstore_bin());
    cmd.arg("completion").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_webstore()"))
        .stdout(predicate::str::contains("complete -F _webstore"));
}

#[test]
fn test_completion_zsh_generates_script() {
    let mut cmd = Command::new(get_webstore_bin());
    cmd.arg("completion").arg("zsh");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#compdef webstore"));
}

#[test]
fn test_completion_invalid_shell() {
    let mut cmd = Command::new(get_webstore_bin());
    cmd.arg("completion").arg("invalid-shell");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_main_help_lists_commands() {
    let mut cmd = Command::new(get_webstore_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("Generate shell completion"));
}

#[test]
fn test_upload_help_lists_flags() {
    let mut cmd = Command::new(get_webstore_bin());
    cmd.arg("upload").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--auth-timeout"))
        .stdout(predicate::str::contains("--no-browser"));
}
