//! Multi-file template index.
//!
//! [`TemplateIndex`] owns the per-file scan cache and three aggregate maps:
//! scenario → files, provider → files and import → files. The aggregates are
//! maintained incrementally; after every refresh they equal what replaying all
//! cached scans would produce ([`TemplateIndex::derive_aggregates`]).
//!
//! # Concurrency
//!
//! All maps are [`DashMap`]s, so refreshes of different files proceed in
//! parallel. A refresh of one path holds that path's cache entry while it
//! swaps the file's aggregate contributions, which serializes writers of the
//! same path (last write wins). Parsing happens before the entry is taken;
//! no lock is ever held across I/O.
//!
//! [`TemplateIndex::refresh_all`] reads files with [`tokio::fs`], parses on
//! the blocking pool and fans out with `buffer_unordered`. A missing file is
//! evicted, an unreadable one is skipped, and the cancellation token is
//! checked before each file is started.

mod scan;

pub use scan::{FileScanResult, ResourceSpan, scan_document};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type Aggregate = DashMap<String, HashSet<PathBuf>>;

/// Outcome of a [`TemplateIndex::refresh_all`] call, paths in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Files scanned and stored.
    pub indexed: Vec<PathBuf>,
    /// Files that no longer exist; evicted from the index.
    pub missing: Vec<PathBuf>,
    /// Files that could not be read or scanned; previous scan kept.
    pub failed: Vec<PathBuf>,
    /// Files not started because the refresh was cancelled.
    pub cancelled: Vec<PathBuf>,
}

enum Outcome {
    Indexed,
    Missing,
    Failed,
    Cancelled,
}

/// Aggregate maps in plain, comparable form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub scenarios: BTreeMap<String, BTreeSet<PathBuf>>,
    pub providers: BTreeMap<String, BTreeSet<PathBuf>>,
    pub imports: BTreeMap<String, BTreeSet<PathBuf>>,
}

/// Summary printed by `index-info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    pub templates_indexed: usize,
    /// Scenario name to number of files declaring it.
    pub scenarios: BTreeMap<String, usize>,
    /// Provider name to number of files using it.
    pub providers: BTreeMap<String, usize>,
    /// Import name to number of files importing it.
    pub imports: BTreeMap<String, usize>,
    /// Indexed files in registration order.
    pub template_paths: Vec<String>,
}

/// Scan cache plus aggregate indices over a set of template files.
#[derive(Debug, Default)]
pub struct TemplateIndex {
    files: DashMap<PathBuf, Arc<FileScanResult>>,
    registration: DashMap<PathBuf, u64>,
    next_sequence: AtomicU64,
    scenarios: Aggregate,
    providers: Aggregate,
    imports: Aggregate,
}

impl TemplateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Record `path` in registration order if it is not known yet.
    pub fn register(&self, path: &Path) {
        if !self.registration.contains_key(path) {
            self.registration
                .entry(path.to_path_buf())
                .or_insert_with(|| self.next_sequence.fetch_add(1, Ordering::SeqCst));
        }
    }

    /// Scan `text` as the current content of `path` and store the result.
    pub fn refresh(&self, path: impl Into<PathBuf>, text: &str) -> Arc<FileScanResult> {
        let path = path.into();
        let scan = Arc::new(scan_document(&path, text));
        self.store(path, Arc::clone(&scan));
        scan
    }

    /// Replace the cached scan of `path` and swap its aggregate contributions.
    fn store(&self, path: PathBuf, scan: Arc<FileScanResult>) {
        self.register(&path);
        match self.files.entry(path) {
            Entry::Occupied(mut entry) => {
                self.detach_all(entry.key(), entry.get());
                self.attach_all(entry.key(), &scan);
                entry.insert(scan);
            }
            Entry::Vacant(entry) => {
                self.attach_all(entry.key(), &scan);
                entry.insert(scan);
            }
        }
    }

    /// Drop `path` from the index. Returns whether it was indexed.
    pub fn forget(&self, path: &Path) -> bool {
        let removed = match self.files.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => {
                self.detach_all(entry.key(), entry.get());
                entry.remove();
                true
            }
            Entry::Vacant(_) => false,
        };
        self.registration.remove(path);
        removed
    }

    /// Cached scan of `path`; `None` when the file is not indexed.
    ///
    /// Never touches the disk.
    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<Arc<FileScanResult>> {
        self.files.get(path).map(|entry| Arc::clone(entry.value()))
    }

    /// Indexed scans ordered by registration.
    #[must_use]
    pub fn files_in_order(&self) -> Vec<Arc<FileScanResult>> {
        let mut files: Vec<(u64, Arc<FileScanResult>)> = self
            .files
            .iter()
            .map(|entry| {
                let sequence = self.registration.get(entry.key()).map_or(u64::MAX, |seq| *seq);
                (sequence, Arc::clone(entry.value()))
            })
            .collect();
        files.sort_by(|(a_seq, a), (b_seq, b)| a_seq.cmp(b_seq).then_with(|| a.file_path.cmp(&b.file_path)));
        files.into_iter().map(|(_, scan)| scan).collect()
    }

    /// Files that declare the scenario `name`.
    #[must_use]
    pub fn files_for_scenario(&self, name: &str) -> BTreeSet<PathBuf> {
        members(&self.scenarios, name)
    }

    /// Files whose provider contributions include `name`.
    #[must_use]
    pub fn files_for_provider(&self, name: &str) -> BTreeSet<PathBuf> {
        members(&self.providers, name)
    }

    /// Files that import `name`.
    #[must_use]
    pub fn files_for_import(&self, name: &str) -> BTreeSet<PathBuf> {
        members(&self.imports, name)
    }

    /// Every provider spelling known to the index: canonical names and raw tokens.
    #[must_use]
    pub fn provider_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.providers.iter().map(|entry| entry.key().clone()).collect();
        for file in &self.files {
            names.extend(file.provider_references.keys().cloned());
        }
        names
    }

    /// Current aggregate maps.
    #[must_use]
    pub fn aggregates(&self) -> Aggregates {
        Aggregates {
            scenarios: snapshot(&self.scenarios),
            providers: snapshot(&self.providers),
            imports: snapshot(&self.imports),
        }
    }

    /// Aggregate maps rebuilt from the cached scans alone.
    ///
    /// Equal to [`Self::aggregates`] whenever no refresh is in flight.
    #[must_use]
    pub fn derive_aggregates(&self) -> Aggregates {
        let mut derived = Aggregates::default();
        for entry in &self.files {
            let path = entry.key();
            let scan = entry.value();
            for scenario in &scan.scenarios {
                derived.scenarios.entry(scenario.clone()).or_default().insert(path.clone());
            }
            for provider in scan.provider_keys() {
                derived.providers.entry(provider).or_default().insert(path.clone());
            }
            for import in scan.import_keys() {
                derived.imports.entry(import).or_default().insert(path.clone());
            }
        }
        derived
    }

    /// Counts per aggregate key plus the indexed paths.
    #[must_use]
    pub fn summary(&self) -> IndexSummary {
        let counts = |map: &Aggregate| -> BTreeMap<String, usize> {
            map.iter().map(|entry| (entry.key().clone(), entry.value().len())).collect()
        };
        let files = self.files_in_order();

        IndexSummary {
            templates_indexed: files.len(),
            scenarios: counts(&self.scenarios),
            providers: counts(&self.providers),
            imports: counts(&self.imports),
            template_paths: files.iter().map(|scan| scan.file_path.display().to_string()).collect(),
        }
    }

    /// Read and scan every path, up to `max_concurrency` files at a time.
    ///
    /// Paths are registered in the given order before any work starts, so
    /// registration order does not depend on which read finishes first.
    /// Never fails as a whole; per-file outcomes are in the report.
    pub async fn refresh_all<I, P>(
        &self,
        paths: I,
        max_concurrency: usize,
        cancel: &CancellationToken,
    ) -> RefreshReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        for path in &paths {
            self.register(path);
        }

        let mut outcomes: Vec<(usize, PathBuf, Outcome)> = stream::iter(paths.into_iter().enumerate())
            .map(|(position, path)| async move {
                let outcome = self.refresh_file(&path, cancel).await;
                (position, path, outcome)
            })
            .buffer_unordered(max_concurrency.max(1))
            .collect()
            .await;
        outcomes.sort_by_key(|(position, _, _)| *position);

        let mut report = RefreshReport::default();
        for (_, path, outcome) in outcomes {
            match outcome {
                Outcome::Indexed => report.indexed.push(path),
                Outcome::Missing => report.missing.push(path),
                Outcome::Failed => report.failed.push(path),
                Outcome::Cancelled => report.cancelled.push(path),
            }
        }

        debug!(
            indexed = report.indexed.len(),
            missing = report.missing.len(),
            failed = report.failed.len(),
            cancelled = report.cancelled.len(),
            "template refresh finished"
        );
        report
    }

    async fn refresh_file(&self, path: &Path, cancel: &CancellationToken) -> Outcome {
        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }

        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "template no longer exists, evicting");
                self.forget(path);
                return Outcome::Missing;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read template, skipping");
                return Outcome::Failed;
            }
        };

        let scan_path = path.to_path_buf();
        match tokio::task::spawn_blocking(move || scan_document(&scan_path, &text)).await {
            Ok(scan) => {
                self.store(path.to_path_buf(), Arc::new(scan));
                Outcome::Indexed
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "template scan task failed, skipping");
                Outcome::Failed
            }
        }
    }

    fn attach_all(&self, path: &Path, scan: &FileScanResult) {
        for scenario in &scan.scenarios {
            attach(&self.scenarios, scenario, path);
        }
        for provider in scan.provider_keys() {
            attach(&self.providers, &provider, path);
        }
        for import in scan.import_keys() {
            attach(&self.imports, &import, path);
        }
    }

    fn detach_all(&self, path: &Path, scan: &FileScanResult) {
        for scenario in &scan.scenarios {
            detach(&self.scenarios, scenario, path);
        }
        for provider in scan.provider_keys() {
            detach(&self.providers, &provider, path);
        }
        for import in scan.import_keys() {
            detach(&self.imports, &import, path);
        }
    }
}

fn attach(map: &Aggregate, key: &str, path: &Path) {
    map.entry(key.to_string()).or_default().insert(path.to_path_buf());
}

fn detach(map: &Aggregate, key: &str, path: &Path) {
    if let Some(mut files) = map.get_mut(key) {
        files.remove(path);
    }
    map.remove_if(key, |_, files| files.is_empty());
}

fn members(map: &Aggregate, key: &str) -> BTreeSet<PathBuf> {
    map.get(key).map(|files| files.iter().cloned().collect()).unwrap_or_default()
}

fn snapshot(map: &Aggregate) -> BTreeMap<String, BTreeSet<PathBuf>> {
    map.iter().map(|entry| (entry.key().clone(), entry.value().iter().cloned().collect())).collect()
}
