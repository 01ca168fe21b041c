//! Shared command plumbing: loading the engine and reading the current document.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LensConfig;
use crate::context::ContextBuilder;
use crate::contracts::StaticContractRegistry;
use crate::constants::MISSING_PROVIDER_MESSAGE;
use crate::core::LensError;
use crate::index::{RefreshReport, TemplateIndex};

/// Where the document being edited comes from.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSource {
    /// Template file being edited
    #[arg(long, value_name = "PATH", conflicts_with = "stdin")]
    pub file: Option<PathBuf>,

    /// Read the template being edited from standard input
    #[arg(long)]
    pub stdin: bool,
}

/// Trimmed `--provider` value.
///
/// When the option is absent or blank, prints `Missing --provider <name>` to
/// stdout and returns `None`; the command then ends successfully.
pub fn provider_or_report(provider: Option<&str>) -> Option<&str> {
    let provider = provider.map(str::trim).filter(|name| !name.is_empty());
    if provider.is_none() {
        println!("{MISSING_PROVIDER_MESSAGE}");
    }
    provider
}

/// Read the current document.
///
/// With neither `--file` nor `--stdin` the document is empty.
///
/// # Errors
///
/// Returns [`LensError::TemplateReadError`] when `--file` cannot be read and
/// [`LensError::StdinReadError`] when standard input fails.
pub async fn read_document(source: &DocumentSource) -> Result<String> {
    if source.stdin {
        debug!("reading template content from stdin");
        let mut content = String::new();
        tokio::io::stdin().read_to_string(&mut content).await.map_err(|e| LensError::StdinReadError {
            reason: e.to_string(),
        })?;
        return Ok(content);
    }

    match &source.file {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            LensError::TemplateReadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        }),
        None => Ok(String::new()),
    }
}

/// The index key under which `file` is indexed.
///
/// Tries the path as given, then compares canonical paths, so a relative
/// `--file` finds a template indexed through an absolute directory.
pub async fn indexed_path(index: &TemplateIndex, file: &Path) -> Option<PathBuf> {
    if index.lookup(file).is_some() {
        return Some(file.to_path_buf());
    }
    let wanted = tokio::fs::canonicalize(file).await.ok()?;
    for scan in index.files_in_order() {
        if tokio::fs::canonicalize(&scan.file_path).await.is_ok_and(|path| path == wanted) {
            return Some(scan.file_path.clone());
        }
    }
    None
}

/// Everything a command needs: the populated index and the contract registry.
pub struct Engine {
    pub index: TemplateIndex,
    pub contracts: StaticContractRegistry,
    pub max_concurrency: usize,
    pub cancel: CancellationToken,
}

impl Engine {
    /// Load contracts and index every configured template.
    ///
    /// Ctrl-C cancels the remaining work; files already scanned stay indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured contract registry cannot be loaded.
    /// Template failures are logged and skipped.
    pub async fn load(settings: &LensConfig, extra_templates: &[PathBuf]) -> Result<Self> {
        let contracts = match settings.contracts_path() {
            Some(path) => StaticContractRegistry::load(&path).await?,
            None => StaticContractRegistry::new(),
        };

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let resolver_settings = settings.clone();
        let extra = extra_templates.to_vec();
        let paths =
            tokio::task::spawn_blocking(move || resolver_settings.resolve_template_paths(&extra)).await?;

        let index = TemplateIndex::new();
        let max_concurrency = settings.effective_concurrency();
        let report = index.refresh_all(paths, max_concurrency, &cancel).await;
        log_report(&report);

        Ok(Self {
            index,
            contracts,
            max_concurrency,
            cancel,
        })
    }

    /// Context builder over this engine's index and contracts.
    #[must_use]
    pub fn context_builder(&self) -> ContextBuilder<'_> {
        ContextBuilder::new(&self.index, &self.contracts).with_max_concurrency(self.max_concurrency)
    }
}

fn log_report(report: &RefreshReport) {
    info!(indexed = report.indexed.len(), "indexed templates");
    for path in &report.missing {
        warn!(path = %path.display(), "template not found");
    }
    if !report.failed.is_empty() {
        warn!(failed = report.failed.len(), "some templates could not be indexed");
    }
    if !report.cancelled.is_empty() {
        warn!(cancelled = report.cancelled.len(), "indexing interrupted");
    }
}
