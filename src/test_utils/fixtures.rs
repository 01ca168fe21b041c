//! Template fixtures
//!
//! Sample buildout templates covering library, custom, aliased, phased and
//! half-written documents.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A named template document.
#[derive(Clone, Debug)]
pub struct TemplateFixture {
    pub name: String,
    pub content: String,
}

impl TemplateFixture {
    fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    /// One library resource and one custom resource depending on it.
    pub fn sample() -> Self {
        Self::new(
            "sample.yml",
            "\
resources:
  A:
    provider: StdLib::remote_job_provider
  B:
    provider: TestRemoteJob
    depends_on:
      - A
providers:
  TestRemoteJob:
    base_provider: External
    properties:
      RPClass: Foo.Bar.RemoteJobProviderV2
      RPAssembly: Foo.Bar
",
        )
    }

    /// Phased template with imports and two scenarios.
    pub fn phased() -> Self {
        Self::new(
            "phased.yml",
            "\
imports:
  - StdLib
  - Contoso
buildout_phases:
  newaz.deployment:
  newaz.validation:
  upgrade.deployment:
resources:
  Warp:
    provider: StdLib::remote_job_provider
  Approve:
    provider: ManualOperationProvider
    depends_on: [Warp]
",
        )
    }

    /// A snake_case alias defined locally on top of `External`.
    pub fn aliased() -> Self {
        Self::new(
            "aliased.yml",
            "\
resources:
  Copy:
    provider: copy_job
providers:
  copy_job:
    base_provider: External
    properties:
      RPClass: Contoso.Jobs.CopyJob
      RPAssembly: Contoso.Jobs
",
        )
    }

    /// Two aliases chained before reaching `External`.
    pub fn alias_chain() -> Self {
        Self::new(
            "chain.yml",
            "\
resources:
  Nightly:
    provider: nightly_copy
    depends_on:
      - Seed
  Seed:
    provider: StdLib::seed_provider
providers:
  nightly_copy:
    base_provider: copy_job
  copy_job:
    base_provider: External
    properties:
      RPClass: Contoso.Jobs.CopyJob
",
        )
    }

    /// A document cut off mid-edit.
    pub fn truncated() -> Self {
        Self::new(
            "truncated.yml",
            "\
resources:
  Half:
    provider: StdLib::remote_job_provider
    depends_on:
      -
  Next:
    provi",
        )
    }

    /// Resources chained through `depends_on`, one target living in [`Self::shared`].
    pub fn pipeline() -> Self {
        Self::new(
            "pipeline.yml",
            "\
resources:
  Seed:
    provider: StdLib::seed_provider
  Deploy:
    provider: ManualOperationProvider
    depends_on:
      - Seed
      - Shared
  Verify:
    provider: ManualOperationProvider
    depends_on: [Deploy]
",
        )
    }

    /// Declares the `Shared` resource [`Self::pipeline`] depends on.
    pub fn shared() -> Self {
        Self::new(
            "shared.yml",
            "\
resources:
  Shared:
    provider: StdLib::shared_provider
",
        )
    }

    /// Same fixture under another file name.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Write the fixture into `dir`, creating parent directories.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &self.content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Write every fixture into `dir`, returning paths in the same order.
pub fn write_templates(dir: &Path, fixtures: &[TemplateFixture]) -> Result<Vec<PathBuf>> {
    fixtures.iter().map(|fixture| fixture.write_to(dir)).collect()
}
