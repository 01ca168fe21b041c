use buildout_lens::test_utils::TemplateFixture;
use predicates::prelude::*;

use crate::common::LensProject;

#[test]
fn test_debug_resources_dumps_to_stderr() {
    let project =
        LensProject::with_templates(&[TemplateFixture::sample(), TemplateFixture::phased()]).unwrap();

    project
        .command()
        .args(["debug-resources", "--provider", "remotejobprovider"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("=== RESOURCE EXAMPLES FOR PROVIDER: remotejobprovider ==="))
        .stderr(predicate::str::contains("--- TEMPLATE: phased.yml ---"))
        .stderr(predicate::str::contains("--- TEMPLATE: sample.yml ---"))
        .stderr(predicate::str::contains("RESOURCE: Warp"))
        .stderr(predicate::str::contains("=== END EXAMPLES FOR remotejobprovider ==="));
}

#[test]
fn test_debug_resources_without_matches() {
    let project = LensProject::with_templates(&[TemplateFixture::sample()]).unwrap();

    project
        .command()
        .args(["debug-resources", "--provider", "nothing"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No templates found for provider: nothing"));
}

#[test]
fn test_debug_context_dump() {
    let project = LensProject::with_templates(&[TemplateFixture::sample()]).unwrap();

    project
        .command()
        .args(["debug-context", "--provider", "TestRemoteJob"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("=== PROVIDER COMPLETION CONTEXT FOR: TestRemoteJob ==="))
        .stderr(predicate::str::contains("Number of contexts: 1"))
        .stderr(predicate::str::contains("--- RESOURCE 1: B ---"))
        .stderr(predicate::str::contains("DEPENDENCY: A"))
        .stderr(predicate::str::contains("ALIAS DEFINITION: TestRemoteJob"));
}

#[test]
fn test_debug_context_cursor_section() {
    let project = LensProject::with_templates(&[TemplateFixture::sample()]).unwrap();

    project
        .command()
        .args(["debug-context", "--provider", "TestRemoteJob", "--stdin", "--line", "4"])
        .write_stdin(TemplateFixture::sample().content)
        .assert()
        .success()
        .stderr(predicate::str::contains("Cursor section: B"));
}
