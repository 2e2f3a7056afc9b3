// Smoke tests for the binary surface.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_describes_the_wizard() {
    Command::cargo_bin("aegis-setup")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup wizard"))
        .stdout(predicate::str::contains("--config-dir"))
        .stdout(predicate::str::contains("--backup-root"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("aegis-setup")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aegis-setup"));
}
