use buildout_lens::test_utils::TemplateFixture;
use predicates::prelude::*;
use serde_json::Value;

use crate::common::LensProject;

fn stdout_of(cmd: &mut assert_cmd::Command) -> String {
    String::from_utf8(cmd.assert().success().get_output().stdout.clone()).unwrap()
}

#[test]
fn test_library_provider_examples() {
    let project =
        LensProject::with_templates(&[TemplateFixture::sample(), TemplateFixture::phased()]).unwrap();

    let text = stdout_of(project.command().args(["provider-completion", "--provider", "remote_job_provider"]));

    assert!(text.starts_with("Provider completion context for 'remote_job_provider'\n"));
    assert!(text.contains("Available example resources: 2\n"));
    assert!(text.contains("ResourceName: Warp\nProviderType: Library\n"));
    assert!(text.contains("ResourceName: A\nProviderType: Library\n"));
    assert!(!text.contains("Aliases / provider definitions:"));
}

#[test]
fn test_custom_alias_lists_definitions() {
    let project =
        LensProject::with_templates(&[TemplateFixture::aliased(), TemplateFixture::sample()]).unwrap();

    let text = stdout_of(project.command().args(["provider-completion", "--provider", "copy_job"]));

    assert!(text.contains("Available example resources: 1\n"));
    assert!(text.contains("ResourceName: Copy\nProviderType: Custom\nRaw:\n  Copy:\n    provider: copy_job\n"));
    assert!(text.contains("Aliases / provider definitions:\n - copy_job =>   copy_job:"));
}

#[test]
fn test_examples_flag_limits_output() {
    let project = LensProject::with_templates(&[
        TemplateFixture::sample(),
        TemplateFixture::phased(),
        TemplateFixture::sample().named("nested/copy.yml"),
    ])
    .unwrap();

    let text = stdout_of(project.command().args([
        "provider-completion",
        "--provider",
        "RemoteJobProvider",
        "--examples",
        "2",
    ]));

    assert!(text.contains("Available example resources: 3\n"));
    assert!(text.contains("Printing 2 example(s):\n"));
    assert!(text.contains("Example #2:"));
    assert!(!text.contains("Example #3:"));
}

#[test]
fn test_default_example_count_comes_from_config() {
    let project = LensProject::with_templates(&[
        TemplateFixture::sample(),
        TemplateFixture::phased(),
        TemplateFixture::sample().named("other.yml"),
    ])
    .unwrap();
    project.write_config("examples = 1\n").unwrap();

    let text = stdout_of(project.command().args(["provider-completion", "--provider", "remote_job_provider"]));

    assert!(text.contains("Printing 1 example(s):\n"));
}

#[test]
fn test_unknown_provider_reports_no_examples() {
    let project = LensProject::with_templates(&[TemplateFixture::sample()]).unwrap();

    project
        .command()
        .args(["provider-completion", "--provider", "nothing_here"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("No examples found for provider 'nothing_here'\n"));
}

#[test]
fn test_typo_gets_suggestion() {
    let project = LensProject::with_templates(&[TemplateFixture::sample()]).unwrap();

    project
        .command()
        .args(["provider-completion", "--provider", "RemoteJobProvidr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Did you mean: RemoteJobProvider"));
}

#[test]
fn test_current_document_from_stdin_resolves_alias() {
    let project =
        LensProject::with_templates(&[TemplateFixture::aliased(), TemplateFixture::alias_chain()]).unwrap();

    let without = stdout_of(project.command().args(["provider-completion", "--provider", "nightly_copy"]));
    assert!(without.contains("Available example resources: 1\n"));

    let with = stdout_of(
        project
            .command()
            .args(["provider-completion", "--provider", "nightly_copy", "--stdin"])
            .write_stdin(TemplateFixture::alias_chain().content),
    );
    assert!(with.contains("Available example resources: 2\n"));
    assert!(with.contains("ResourceName: Copy\n"));
    assert!(with.contains("ResourceName: Nightly\n"));
}

#[test]
fn test_current_document_from_file() {
    let project = LensProject::with_templates(&[TemplateFixture::aliased()]).unwrap();
    let current = TemplateFixture::alias_chain().write_to(project.root()).unwrap();

    let text = stdout_of(
        project
            .command()
            .args(["provider-completion", "--provider", "nightly_copy", "--file"])
            .arg(&current),
    );

    assert!(text.contains("ResourceName: Copy\n"));
}

#[test]
fn test_json_output_with_contracts() {
    let project = LensProject::with_templates(&[TemplateFixture::aliased()]).unwrap();
    let contracts = project.root().join("contracts.json");
    std::fs::write(
        &contracts,
        r#"{"CopyJob": {"inputFields": [{"propertyName": "Source", "valueType": "string"}]}}"#,
    )
    .unwrap();
    project.write_config(&format!("contracts = '{}'\n", contracts.display())).unwrap();

    let text = stdout_of(project.command().args([
        "provider-completion",
        "--provider",
        "copy_job",
        "--format",
        "json",
    ]));
    let response: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(response["providerName"], "copy_job");
    assert_eq!(response["isSnakeCase"], true);
    assert_eq!(response["needsProviderDefinition"], true);
    assert!(response["suggestedProviderDefinition"].as_str().unwrap().contains("Contoso.Jobs.CopyJob"));

    let context = &response["contexts"][0];
    assert_eq!(context["templateKind"], "phaseless");
    assert_eq!(context["resourceExamples"][0]["resourceName"], "Copy");
    assert_eq!(context["resourceExamples"][0]["providerKind"], "Custom");
    assert_eq!(context["providerMetadata"]["name"], "CopyJob");
    assert_eq!(context["providerMetadata"]["inputFields"][0]["propertyName"], "Source");
}

#[test]
fn test_broken_contract_registry_fails() {
    let project = LensProject::with_templates(&[TemplateFixture::aliased()]).unwrap();
    let contracts = project.root().join("contracts.json");
    std::fs::write(&contracts, "{ not json").unwrap();
    project.write_config(&format!("contracts = '{}'\n", contracts.display())).unwrap();

    project
        .command()
        .args(["provider-completion", "--provider", "copy_job"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("contract registry"));
}

#[test]
fn test_cursor_line_prints_related_sections() {
    let project =
        LensProject::with_templates(&[TemplateFixture::pipeline(), TemplateFixture::shared()]).unwrap();
    let current = project.templates_dir().join("pipeline.yml");

    let text = stdout_of(
        project
            .command()
            .args(["provider-completion", "--provider", "ManualOperationProvider", "--line", "6", "--file"])
            .arg(&current),
    );

    assert!(text.contains("Available example resources: 2\n"));
    assert!(text.contains("Related sections for 'Deploy': 3\n"));
    let depends_on = text.find("[depends_on] Seed (").unwrap();
    let external = text.find("[external_depends_on] Shared (").unwrap();
    let dependent = text.find("[dependent] Verify (").unwrap();
    assert!(depends_on < external && external < dependent);
}

#[test]
fn test_cursor_resource_in_json_output() {
    let project =
        LensProject::with_templates(&[TemplateFixture::pipeline(), TemplateFixture::shared()]).unwrap();
    let current = project.templates_dir().join("pipeline.yml");

    let output = stdout_of(
        project
            .command()
            .args(["provider-completion", "--provider", "ManualOperationProvider", "--format", "json"])
            .args(["--resource", "Verify", "--file"])
            .arg(&current),
    );
    let json: Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json["contexts"].as_array().unwrap().len(), 1);
    assert_eq!(json["position"]["currentResource"], "Verify");
    let related = json["position"]["relatedSections"].as_array().unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["resourceName"], "Deploy");
    assert_eq!(related[0]["relation"], "depends_on");
}

#[test]
fn test_cursor_without_file_is_ignored() {
    let project = LensProject::with_templates(&[TemplateFixture::pipeline()]).unwrap();

    let text = stdout_of(
        project
            .command()
            .args(["provider-completion", "--provider", "ManualOperationProvider", "--line", "6", "--stdin"])
            .write_stdin(TemplateFixture::pipeline().content),
    );

    assert!(text.contains("Available example resources: 2\n"));
    assert!(!text.contains("Related sections"));
}
