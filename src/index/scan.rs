//! Per-file scan results.
//!
//! A [`FileScanResult`] is the cached view of one template: the structure the
//! quick scan found plus the resolved identity of every provider token. It
//! does not keep resource raw text; context building re-reads the file for
//! that.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::resolver::{ProviderReference, resolve_provider};
use crate::scanner::{ProviderDefinition, ScenarioPhase, dedupe_blocks, parse_document};

/// Location and classification inputs of one resource, without its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpan {
    pub name: String,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Provider token as written, `None` when deferred.
    pub provider_token: Option<String>,
    pub depends_on: Vec<String>,
}

/// Snapshot of one template file.
///
/// Replaced wholesale on every refresh and never mutated afterwards, so
/// readers holding an `Arc` to it always see a consistent scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileScanResult {
    pub file_path: PathBuf,
    /// Distinct scenario names from `buildout_phases:`.
    pub scenarios: BTreeSet<String>,
    /// Every `scenario.phase` pair in document order.
    pub phases: Vec<ScenarioPhase>,
    /// Resolved references keyed by raw token.
    pub provider_references: BTreeMap<String, ProviderReference>,
    pub provider_definitions: BTreeMap<String, ProviderDefinition>,
    /// Resources in document order, one entry per name.
    pub resources: Vec<ResourceSpan>,
    /// Resource name to its `depends_on` list.
    pub dependencies: BTreeMap<String, Vec<String>>,
    pub imports: Vec<String>,
    /// Names declared more than once; the last declaration is the one kept.
    pub duplicate_resources: Vec<String>,
}

impl FileScanResult {
    /// A template is phased when it declares at least one scenario.
    #[must_use]
    pub fn is_phased(&self) -> bool {
        !self.scenarios.is_empty()
    }

    /// Resource span by exact name.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&ResourceSpan> {
        self.resources.iter().find(|span| span.name == name)
    }

    /// Resolved reference for a raw provider token.
    #[must_use]
    pub fn reference(&self, token: &str) -> Option<&ProviderReference> {
        self.provider_references.get(token.trim())
    }

    /// Keys this file contributes to the provider aggregate.
    ///
    /// Resolved references contribute their canonical name; unresolved
    /// aliases contribute their raw token so they remain discoverable.
    #[must_use]
    pub fn provider_keys(&self) -> BTreeSet<String> {
        self.provider_references
            .values()
            .map(|reference| match reference.canonical_name.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => reference.raw_token.clone(),
            })
            .collect()
    }

    /// Distinct import names.
    #[must_use]
    pub fn import_keys(&self) -> BTreeSet<String> {
        self.imports.iter().cloned().collect()
    }

    /// Whether any resource in this file is an example of the requested provider.
    #[must_use]
    pub fn uses_provider(&self, target_token: &str, target: &ProviderReference) -> bool {
        self.provider_references.values().any(|reference| reference.matches_target(target_token, target))
    }
}

/// Scan `text` as the content of `path`.
///
/// Never fails. Duplicate resource names are collapsed last-wins and reported
/// through [`FileScanResult::duplicate_resources`] and a warning.
#[must_use]
pub fn scan_document(path: &Path, text: &str) -> FileScanResult {
    let document = parse_document(text);
    let scenarios = document.scenarios().into_iter().collect();
    let (blocks, duplicate_resources) = dedupe_blocks(document.resources);

    if !duplicate_resources.is_empty() {
        warn!(
            path = %path.display(),
            duplicates = ?duplicate_resources,
            "template declares resources more than once; keeping the last declaration"
        );
    }

    let mut provider_references = BTreeMap::new();
    let mut dependencies = BTreeMap::new();
    let mut resources = Vec::with_capacity(blocks.len());

    for block in blocks {
        if let Some(token) = &block.provider_token {
            provider_references
                .entry(token.clone())
                .or_insert_with(|| resolve_provider(token, &document.provider_definitions));
        }
        if !block.depends_on.is_empty() {
            dependencies.insert(block.name.clone(), block.depends_on.clone());
        }
        resources.push(ResourceSpan {
            name: block.name,
            start_offset: block.start_offset,
            end_offset: block.end_offset,
            provider_token: block.provider_token,
            depends_on: block.depends_on,
        });
    }

    FileScanResult {
        file_path: path.to_path_buf(),
        scenarios,
        phases: document.phases,
        provider_references,
        provider_definitions: document.provider_definitions,
        resources,
        dependencies,
        imports: document.imports,
        duplicate_resources,
    }
}
