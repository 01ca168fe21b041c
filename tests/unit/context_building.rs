//! Completion contexts built over a populated index.

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use buildout_lens::context::{ContextBuilder, ProviderCompletionRequest, RelationKind, TemplateKind};
use buildout_lens::contracts::{FieldEntry, ProviderContract, StaticContractRegistry};
use buildout_lens::index::TemplateIndex;
use buildout_lens::resolver::ProviderKind;
use buildout_lens::test_utils::{TemplateFixture, write_templates};

async fn indexed(fixtures: &[TemplateFixture]) -> Result<(TempDir, TemplateIndex, Vec<PathBuf>)> {
    let temp_dir = TempDir::new()?;
    let paths = write_templates(temp_dir.path(), fixtures)?;
    let index = TemplateIndex::new();
    index.refresh_all(paths.clone(), 4, &CancellationToken::new()).await;
    Ok((temp_dir, index, paths))
}

#[tokio::test]
async fn test_contexts_follow_registration_order() -> Result<()> {
    let fixtures: Vec<TemplateFixture> = (0..12)
        .map(|i| TemplateFixture::sample().named(&format!("s{i:02}.yml")))
        .collect();
    let (_dir, index, paths) = indexed(&fixtures).await?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts).with_max_concurrency(3);

    let contexts = builder.build("remote_job_provider", "", &CancellationToken::new()).await;

    let order: Vec<PathBuf> = contexts.iter().map(|c| c.template_path.clone()).collect();
    assert_eq!(order, paths);
    Ok(())
}

#[tokio::test]
async fn test_phased_template_kind() -> Result<()> {
    let (_dir, index, _) = indexed(&[TemplateFixture::phased(), TemplateFixture::sample()]).await?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);

    let contexts = builder.build("RemoteJobProvider", "", &CancellationToken::new()).await;

    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts[0].template_kind, TemplateKind::Phased);
    assert_eq!(contexts[1].template_kind, TemplateKind::Phaseless);
    assert!(contexts.iter().all(|c| !c.resource_examples.is_empty()));
    Ok(())
}

#[tokio::test]
async fn test_alias_chain_definitions_in_walk_order() -> Result<()> {
    let (_dir, index, _) = indexed(&[TemplateFixture::alias_chain()]).await?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);

    let contexts = builder.build("nightly_copy", "", &CancellationToken::new()).await;

    assert_eq!(contexts.len(), 1);
    let chunk = &contexts[0].resource_examples[0];
    assert_eq!(chunk.resource_name, "Nightly");
    assert_eq!(chunk.provider_kind, ProviderKind::Custom);
    assert_eq!(chunk.canonical_name.as_deref(), Some("CopyJob"));
    let names: Vec<&str> = chunk.alias_definitions.iter().map(|a| a.alias_name.as_str()).collect();
    assert_eq!(names, vec!["nightly_copy", "copy_job"]);
    assert_eq!(chunk.dependencies, vec!["Seed"]);
    assert_eq!(chunk.dependency_chunks.len(), 1);
    assert_eq!(chunk.dependency_chunks[0].resource_name, "Seed");
    assert_eq!(chunk.dependency_chunks[0].raw_text, "  Seed:\n    provider: StdLib::seed_provider");
    Ok(())
}

#[tokio::test]
async fn test_contract_metadata_attached() -> Result<()> {
    let (_dir, index, _) = indexed(&[TemplateFixture::aliased()]).await?;
    let mut contracts = StaticContractRegistry::new();
    contracts.insert(
        "CopyJob",
        ProviderContract {
            input_fields: vec![FieldEntry {
                property_name: "Source".to_string(),
                value_type: "string".to_string(),
                is_optional: false,
            }],
            ..ProviderContract::default()
        },
    );
    let builder = ContextBuilder::new(&index, &contracts);

    let contexts = builder.build("copy_job", "", &CancellationToken::new()).await;

    let metadata = contexts[0].provider_metadata.as_ref().unwrap();
    assert_eq!(metadata.name, "CopyJob");
    assert_eq!(metadata.contract.input_fields[0].property_name, "Source");
    Ok(())
}

#[tokio::test]
async fn test_file_removed_after_indexing_is_skipped() -> Result<()> {
    let (_dir, index, paths) = indexed(&[TemplateFixture::sample(), TemplateFixture::phased()]).await?;
    std::fs::remove_file(&paths[0])?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);

    let contexts = builder.build("remote_job_provider", "", &CancellationToken::new()).await;

    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].template_path, paths[1]);
    Ok(())
}

#[tokio::test]
async fn test_content_changed_since_indexing_uses_fresh_text() -> Result<()> {
    let (_dir, index, paths) = indexed(&[TemplateFixture::sample()]).await?;
    std::fs::write(
        &paths[0],
        "resources:\n  Renamed:\n    provider: StdLib::remote_job_provider\n    depends_on: [Gone]\n",
    )?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);

    let contexts = builder.build("remote_job_provider", "", &CancellationToken::new()).await;

    let chunk = &contexts[0].resource_examples[0];
    assert_eq!(chunk.resource_name, "Renamed");
    assert_eq!(chunk.dependencies, vec!["Gone"]);
    assert!(chunk.dependency_chunks.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_completion_for_library_name_needs_no_definition() -> Result<()> {
    let (_dir, index, _) = indexed(&[TemplateFixture::sample()]).await?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);

    let request = ProviderCompletionRequest {
        provider_name: "remote_job_provider".to_string(),
        current_template_content: String::new(),
    };
    let response = builder.handle_completion(&request, &CancellationToken::new()).await;

    assert!(response.is_snake_case);
    assert!(!response.needs_provider_definition);
    assert_eq!(response.suggested_provider_definition, None);
    assert_eq!(response.contexts.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_build_returns_nothing() -> Result<()> {
    let (_dir, index, _) = indexed(&[TemplateFixture::sample()]).await?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);
    let cancel = CancellationToken::new();
    cancel.cancel();

    assert!(builder.build("remote_job_provider", "", &cancel).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_position_context_collects_related_sections() -> Result<()> {
    let (_dir, index, paths) = indexed(&[TemplateFixture::pipeline(), TemplateFixture::shared()]).await?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);

    // Line 6 is `      - Seed`, nested in Deploy's depends_on list.
    let context = builder.context_for_position(&paths[0], 6, None, &CancellationToken::new()).await;

    assert_eq!(context.current_resource.as_deref(), Some("Deploy"));
    assert!(context.main_text.as_deref().is_some_and(|text| text.starts_with("  Deploy:")));
    let related: Vec<(&str, RelationKind, &PathBuf)> = context
        .related_sections
        .iter()
        .map(|s| (s.resource_name.as_str(), s.relation, &s.template_path))
        .collect();
    assert_eq!(
        related,
        vec![
            ("Seed", RelationKind::DependsOn, &paths[0]),
            ("Shared", RelationKind::ExternalDependsOn, &paths[1]),
            ("Verify", RelationKind::Dependent, &paths[0]),
        ]
    );
    assert_eq!(context.related_sections[1].raw_text, "  Shared:\n    provider: StdLib::shared_provider");
    Ok(())
}

#[tokio::test]
async fn test_position_context_named_resource_wins_over_line() -> Result<()> {
    let (_dir, index, paths) = indexed(&[TemplateFixture::pipeline(), TemplateFixture::shared()]).await?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);

    let context = builder.context_for_position(&paths[0], 1, Some("Verify"), &CancellationToken::new()).await;

    assert_eq!(context.current_resource.as_deref(), Some("Verify"));
    assert_eq!(context.related_sections.len(), 1);
    assert_eq!(context.related_sections[0].resource_name, "Deploy");
    assert_eq!(context.related_sections[0].relation, RelationKind::DependsOn);
    Ok(())
}

#[tokio::test]
async fn test_position_context_outside_resources_or_index() -> Result<()> {
    let (dir, index, paths) = indexed(&[TemplateFixture::pipeline()]).await?;
    let contracts = StaticContractRegistry::new();
    let builder = ContextBuilder::new(&index, &contracts);
    let cancel = CancellationToken::new();

    let header = builder.context_for_position(&paths[0], 0, None, &cancel).await;
    assert_eq!(header.current_resource, None);
    assert_eq!(header.main_text, None);
    assert!(header.related_sections.is_empty());

    let stray = TemplateFixture::shared().write_to(dir.path())?;
    let unindexed = builder.context_for_position(&stray, 1, None, &cancel).await;
    assert_eq!(unindexed.main_text, None);
    assert!(unindexed.related_sections.is_empty());
    Ok(())
}
