use assert_cmd::Command;
use predicates::prelude::*;

mod test_utils;
use test_utils::TestRepo;

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("menugit").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Menu-driven git porcelain"));
}

#[test]
fn test_commit_help() {
    let mut cmd = Command::cargo_bin("menugit").unwrap();
    cmd.args(["commit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Open the commit menu"))
        .stdout(predicate::str::contains("--no-preview"))
        .stdout(predicate::str::contains("--propagate-errors"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("menugit").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

#[test]
fn test_state_outside_repository_fails() {
    let dir = TestRepo::empty();
    let mut cmd = Command::cargo_bin("menugit").unwrap();
    // The temp dir may sit inside some other checkout; only assert when it doesn't.
    if git2::Repository::discover(dir.path()).is_err() {
        cmd.current_dir(dir.path())
            .arg("state")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }
}

#[test]
fn test_state_prints_tracking() {
    let repo = TestRepo::with_commits().with_bare_origin();
    repo.set_git_config("branch.main.pushRemote", "origin").unwrap();

    let mut cmd = Command::cargo_bin("menugit").unwrap();
    cmd.args(["state"])
        .arg("-C")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Head:     main"))
        .stdout(predicate::str::contains("Push:     origin/main"))
        .stdout(predicate::str::contains("Remote:   origin file://"));
}

#[test]
fn test_state_json() {
    let repo = TestRepo::with_commits();

    let mut cmd = Command::cargo_bin("menugit").unwrap();
    let output = cmd
        .current_dir(repo.path())
        .args(["state", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["head"]["name"], "main");
    assert_eq!(state["recent_commits"][0]["summary"], "Add feature");
    assert_eq!(state["refs"][0]["ref_type"], "LocalBranch");
}

#[test]
fn test_edit_missing_file_fails() {
    let dir = TestRepo::empty();
    let mut cmd = Command::cargo_bin("menugit").unwrap();
    cmd.current_dir(dir.path())
        .args(["edit", "--wait", "NO_SUCH_COMMIT_EDITMSG"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: I/O error"));
}
