use predicates::prelude::*;

use crate::common::LensProject;

#[test]
fn test_no_command_prints_help() {
    let project = LensProject::new().unwrap();

    project
        .bare_command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("provider-completion"));
}

#[test]
fn test_unknown_command_prints_help_and_succeeds() {
    let project = LensProject::new().unwrap();

    project
        .bare_command()
        .arg("frobnicate")
        .assert()
        .success()
        .stdout(predicate::str::contains("index-info"));
}

#[test]
fn test_missing_provider_reports_and_succeeds() {
    let project = LensProject::new().unwrap();

    for command in ["provider-completion", "debug-resources", "debug-context"] {
        project
            .command()
            .arg(command)
            .assert()
            .success()
            .stdout("Missing --provider <name>\n");
    }
    project
        .command()
        .args(["provider-completion", "--provider", "  "])
        .assert()
        .success()
        .stdout("Missing --provider <name>\n");
}

#[test]
fn test_negative_examples_count_as_zero() {
    let project = LensProject::new().unwrap();

    project
        .command()
        .args(["provider-completion", "--provider", "copy_job", "--examples", "-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No examples found for provider 'copy_job'"));
}

#[test]
fn test_unreadable_file_fails_with_context() {
    let project = LensProject::new().unwrap();
    let missing = project.root().join("does-not-exist.yml");

    project
        .command()
        .args(["provider-completion", "--provider", "copy_job", "--file"])
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does-not-exist.yml"));
}

#[test]
fn test_version_flag() {
    let project = LensProject::new().unwrap();

    project
        .bare_command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
