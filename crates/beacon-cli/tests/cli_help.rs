use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("beacon")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--integration-test"))
        .stdout(predicate::str::contains("Skip toasts"))
        .stdout(predicate::str::contains("render loops").not());
}

#[test]
fn test_demo_requires_a_terminal() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("beacon")
        .env("BEACON_HOME", dir.path())
        .arg("demo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}
