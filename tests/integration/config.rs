use buildout_lens::test_utils::TemplateFixture;
use predicates::prelude::*;
use serde_json::Value;

use crate::common::LensProject;

fn summary(cmd: &mut assert_cmd::Command) -> Value {
    serde_json::from_slice(&cmd.assert().success().get_output().stdout).unwrap()
}

#[test]
fn test_templates_from_config_file() {
    let project = LensProject::with_templates(&[TemplateFixture::sample()]).unwrap();
    project
        .write_config(&format!("templates = ['{}']\n", project.templates_dir().display()))
        .unwrap();

    let result = summary(project.bare_command().arg("index-info"));

    assert_eq!(result["templatesIndexed"], 1);
}

#[test]
fn test_glob_template_pattern() {
    let project = LensProject::with_templates(&[
        TemplateFixture::sample(),
        TemplateFixture::phased().named("phased.yaml"),
        TemplateFixture::aliased().named("notes.txt"),
    ])
    .unwrap();
    let pattern = project.templates_dir().join("*.yml");

    let result = summary(project.bare_command().arg("--template").arg(&pattern).arg("index-info"));

    assert_eq!(result["templatesIndexed"], 1);
    assert_eq!(result["providers"]["RemoteJobProviderV2"], 1);
}

#[test]
fn test_directory_walk_filters_extensions() {
    let project = LensProject::with_templates(&[
        TemplateFixture::sample(),
        TemplateFixture::phased().named("deep/phased.yaml"),
        TemplateFixture::aliased().named("notes.txt"),
    ])
    .unwrap();

    let result = summary(project.command().arg("index-info"));

    assert_eq!(result["templatesIndexed"], 2);
    assert!(result["providers"].get("CopyJob").is_none());
}

#[test]
fn test_explicit_config_flag_wins_over_env() {
    let project = LensProject::with_templates(&[TemplateFixture::sample()]).unwrap();
    project.write_config("templates = ['/nonexistent/never.yml']\n").unwrap();
    let other = project.root().join("other.toml");
    std::fs::write(&other, format!("templates = ['{}']\n", project.templates_dir().display())).unwrap();

    let result = summary(project.bare_command().arg("--config").arg(&other).arg("index-info"));

    assert_eq!(result["templatesIndexed"], 1);
}

#[test]
fn test_invalid_config_fails() {
    let project = LensProject::new().unwrap();
    project.write_config("templates = [unclosed\n").unwrap();

    project
        .command()
        .arg("index-info")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid configuration file"));
}

#[test]
fn test_env_config_not_read_when_flag_given() {
    let project = LensProject::with_templates(&[TemplateFixture::sample()]).unwrap();
    project.write_config("templates = [unclosed\n").unwrap();
    let other = project.root().join("other.toml");
    std::fs::write(&other, format!("templates = ['{}']\n", project.templates_dir().display())).unwrap();

    let result = summary(project.bare_command().arg("--config").arg(&other).arg("index-info"));

    assert_eq!(result["templatesIndexed"], 1);
}
