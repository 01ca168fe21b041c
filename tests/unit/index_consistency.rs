//! Aggregate indices stay equal to what the cached scans imply.

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use buildout_lens::index::TemplateIndex;
use buildout_lens::test_utils::{TemplateFixture, init_test_logging, write_templates};

fn all_fixtures() -> Vec<TemplateFixture> {
    vec![
        TemplateFixture::sample(),
        TemplateFixture::phased(),
        TemplateFixture::aliased(),
        TemplateFixture::alias_chain(),
        TemplateFixture::truncated(),
    ]
}

#[tokio::test]
async fn test_refresh_all_keeps_aggregates_consistent() -> Result<()> {
    init_test_logging(None);
    let temp_dir = TempDir::new()?;
    let paths = write_templates(temp_dir.path(), &all_fixtures())?;

    let index = TemplateIndex::new();
    let report = index.refresh_all(paths.clone(), 3, &CancellationToken::new()).await;

    assert_eq!(report.indexed, paths);
    assert_eq!(index.len(), paths.len());
    assert_eq!(index.aggregates(), index.derive_aggregates());
    Ok(())
}

#[tokio::test]
async fn test_shrinking_a_file_drops_its_contributions() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let phased = TemplateFixture::phased().write_to(temp_dir.path())?;
    let sample = TemplateFixture::sample().write_to(temp_dir.path())?;
    let index = TemplateIndex::new();
    let cancel = CancellationToken::new();

    index.refresh_all([&phased, &sample], 2, &cancel).await;
    assert_eq!(index.files_for_scenario("newaz").len(), 1);
    assert_eq!(index.files_for_provider("RemoteJobProvider").len(), 2);

    std::fs::write(&phased, "resources:\n  Only:\n    provider: ManualOperationProvider\n")?;
    index.refresh_all([&phased], 2, &cancel).await;

    assert!(index.files_for_scenario("newaz").is_empty());
    assert!(index.files_for_import("StdLib").is_empty());
    assert_eq!(index.files_for_provider("RemoteJobProvider"), [sample.clone()].into_iter().collect());
    assert_eq!(index.files_for_provider("ManualOperationProvider"), [phased.clone()].into_iter().collect());
    assert_eq!(index.aggregates(), index.derive_aggregates());
    Ok(())
}

#[tokio::test]
async fn test_deleted_file_is_evicted() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let paths = write_templates(temp_dir.path(), &[TemplateFixture::sample(), TemplateFixture::aliased()])?;
    let index = TemplateIndex::new();
    let cancel = CancellationToken::new();
    index.refresh_all(paths.clone(), 2, &cancel).await;

    std::fs::remove_file(&paths[1])?;
    let report = index.refresh_all(paths.clone(), 2, &cancel).await;

    assert_eq!(report.missing, vec![paths[1].clone()]);
    assert_eq!(index.len(), 1);
    assert!(index.lookup(&paths[1]).is_none());
    assert!(index.files_for_provider("CopyJob").is_empty());
    assert_eq!(index.aggregates(), index.derive_aggregates());
    Ok(())
}

#[tokio::test]
async fn test_registration_order_is_input_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let fixtures: Vec<TemplateFixture> = (0..40)
        .map(|i| {
            let base = if i % 2 == 0 { TemplateFixture::sample() } else { TemplateFixture::phased() };
            base.named(&format!("t{i:02}.yml"))
        })
        .collect();
    let mut paths = write_templates(temp_dir.path(), &fixtures)?;
    paths.reverse();

    let index = TemplateIndex::new();
    index.refresh_all(paths.clone(), 8, &CancellationToken::new()).await;

    let ordered: Vec<PathBuf> = index.files_in_order().iter().map(|scan| scan.file_path.clone()).collect();
    assert_eq!(ordered, paths);
    assert_eq!(index.files_for_provider("RemoteJobProvider").len(), 40);
    assert_eq!(index.files_for_scenario("upgrade").len(), 20);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_refresh_indexes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let paths = write_templates(temp_dir.path(), &all_fixtures())?;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let index = TemplateIndex::new();
    let report = index.refresh_all(paths.clone(), 4, &cancel).await;

    assert_eq!(report.cancelled, paths);
    assert!(index.is_empty());
    assert_eq!(index.aggregates(), index.derive_aggregates());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_refreshes_of_same_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let paths = write_templates(temp_dir.path(), &all_fixtures())?;
    let index = TemplateIndex::new();
    let cancel = CancellationToken::new();

    let (first, second) = tokio::join!(
        index.refresh_all(paths.clone(), 4, &cancel),
        index.refresh_all(paths.clone(), 2, &cancel),
    );

    assert_eq!(first.indexed.len() + second.indexed.len(), paths.len() * 2);
    assert_eq!(index.len(), paths.len());
    assert_eq!(index.aggregates(), index.derive_aggregates());
    Ok(())
}
