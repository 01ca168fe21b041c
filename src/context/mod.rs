//! Cross-file completion contexts for a provider.
//!
//! Given a provider name and the document being edited, [`ContextBuilder`]
//! collects every resource in the index that uses that provider, together
//! with the raw text of its dependencies and of the provider definitions it
//! resolves through.
//!
//! # Matching
//!
//! The requested name is resolved with the edited document's own provider
//! table. A resource matches when its resolved canonical name equals the
//! target's, when its token is textually identical to the request, or when
//! it is a `Library::name` reference whose `name` equals the request.
//!
//! # Building
//!
//! Candidate files are chosen from the cached scans. Each candidate is then
//! re-read and re-scanned, because the index caches classification and not
//! raw text. Re-reads run concurrently, bounded by
//! `min(candidates, max_concurrency)`, and results keep registration order.
//! Files that cannot be read are skipped with a warning; templates that end
//! up without examples are dropped.

mod completion;
mod types;

pub use completion::default_provider_definition;
pub use types::{
    AliasDefinition, DependencyChunk, PositionContext, ProviderCompletionContext,
    ProviderCompletionRequest, ProviderCompletionResponse, ProviderMetadata, RelatedSection,
    RelationKind, ResourceChunk, ResourceExample, ResourceExampleGroup, TemplateKind,
};

use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::constants::DEFAULT_MAX_CONCURRENCY;
use crate::contracts::ContractRegistry;
use crate::index::{FileScanResult, TemplateIndex};
use crate::naming::split_library_provider;
use crate::resolver::{ProviderKind, ProviderReference, resolve_provider};
use crate::scanner::{
    dedupe_blocks, find_block, parse_document, parse_provider_definitions, raw_provider_definition,
    resource_at_line,
};

/// Assembles [`ProviderCompletionContext`]s from a [`TemplateIndex`].
pub struct ContextBuilder<'a> {
    index: &'a TemplateIndex,
    contracts: &'a dyn ContractRegistry,
    max_concurrency: usize,
}

impl<'a> ContextBuilder<'a> {
    /// Builder over `index` using `contracts` for provider metadata.
    #[must_use]
    pub fn new(index: &'a TemplateIndex, contracts: &'a dyn ContractRegistry) -> Self {
        Self {
            index,
            contracts,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Upper bound on concurrent template re-reads (at least 1).
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Contexts for `provider`, one per template with at least one example.
    ///
    /// `current_content` is the document being edited; its provider table is
    /// used to resolve `provider`. Unknown providers yield an empty list.
    pub async fn build(
        &self,
        provider: &str,
        current_content: &str,
        cancel: &CancellationToken,
    ) -> Vec<ProviderCompletionContext> {
        let provider = provider.trim();
        if provider.is_empty() {
            return Vec::new();
        }

        let target = resolve_provider(provider, &parse_provider_definitions(current_content));
        let candidates: Vec<Arc<FileScanResult>> = self
            .index
            .files_in_order()
            .into_iter()
            .filter(|scan| scan.uses_provider(provider, &target))
            .collect();

        debug!(
            provider,
            kind = %target.kind,
            canonical = target.canonical(),
            candidates = candidates.len(),
            "building provider completion contexts"
        );
        if candidates.is_empty() {
            return Vec::new();
        }

        let workers = candidates.len().min(self.max_concurrency).max(1);
        let target = &target;
        let results: Vec<Option<ProviderCompletionContext>> = stream::iter(candidates)
            .map(|scan| async move {
                if cancel.is_cancelled() {
                    return None;
                }
                let text = match tokio::fs::read_to_string(&scan.file_path).await {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(
                            path = %scan.file_path.display(),
                            error = %err,
                            "failed to re-read template, skipping"
                        );
                        return None;
                    }
                };

                let provider = provider.to_string();
                let target = target.clone();
                let path = scan.file_path.clone();
                match tokio::task::spawn_blocking(move || {
                    build_file_context(&scan, &text, &provider, &target)
                })
                .await
                {
                    Ok(context) => context,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "context task failed, skipping");
                        None
                    }
                }
            })
            .buffered(workers)
            .collect()
            .await;

        let metadata = self.metadata_for(target);
        results
            .into_iter()
            .flatten()
            .map(|mut context| {
                context.provider_metadata.clone_from(&metadata);
                context
            })
            .collect()
    }

    fn metadata_for(&self, target: &ProviderReference) -> Option<ProviderMetadata> {
        let name = target.canonical_name.as_deref()?;
        self.contracts.get_contract(name).map(|contract| ProviderMetadata {
            name: name.to_string(),
            contract,
        })
    }

    /// Resources whose provider loosely matches `provider`, grouped by template.
    ///
    /// Comparison is case-insensitive on canonical names and raw tokens, and
    /// also accepts `Library::provider`. Used by the debug commands.
    pub async fn resource_examples(
        &self,
        provider: &str,
        cancel: &CancellationToken,
    ) -> Vec<ResourceExampleGroup> {
        let provider = provider.trim();
        if provider.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<Arc<FileScanResult>> = self
            .index
            .files_in_order()
            .into_iter()
            .filter(|scan| scan.provider_references.values().any(|r| loosely_matches(r, provider)))
            .collect();
        let workers = candidates.len().min(self.max_concurrency).max(1);

        let groups: Vec<Option<ResourceExampleGroup>> = stream::iter(candidates)
            .map(|scan| async move {
                if cancel.is_cancelled() {
                    return None;
                }
                match tokio::fs::read_to_string(&scan.file_path).await {
                    Ok(text) => loose_examples(&scan, &text, provider),
                    Err(err) => {
                        warn!(path = %scan.file_path.display(), error = %err, "failed to re-read template");
                        None
                    }
                }
            })
            .buffered(workers)
            .collect()
            .await;

        groups.into_iter().flatten().collect()
    }

    /// Context of the resource at `line` in the indexed template `path`.
    ///
    /// `resource` names the current resource explicitly; otherwise it is the
    /// resource whose block contains `line`. Related sections are the
    /// resource's `depends_on` targets in the same template, the same names
    /// declared in other indexed templates, and the same-template resources
    /// that depend on it. A template that is not indexed or cannot be read
    /// yields a context without related sections.
    pub async fn context_for_position(
        &self,
        path: &Path,
        line: usize,
        resource: Option<&str>,
        cancel: &CancellationToken,
    ) -> PositionContext {
        let mut context = PositionContext {
            template_path: path.to_path_buf(),
            line,
            current_resource: resource.map(str::trim).filter(|name| !name.is_empty()).map(str::to_string),
            main_text: None,
            related_sections: Vec::new(),
        };

        if self.index.lookup(path).is_none() {
            debug!(path = %path.display(), "position context for a template that is not indexed");
            return context;
        }
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to re-read template");
                return context;
            }
        };

        if context.current_resource.is_none() {
            context.current_resource = resource_at_line(&text, line);
        }
        let Some(name) = context.current_resource.clone() else {
            return context;
        };
        let (blocks, _) = dedupe_blocks(parse_document(&text).resources);
        let Some(current) = find_block(&blocks, &name) else {
            debug!(path = %path.display(), resource = %name, "no such resource in template");
            return context;
        };
        context.main_text = Some(current.raw_text.clone());

        let external = self.external_dependencies(path, &current.depends_on, cancel).await;
        for dependency in &current.depends_on {
            if let Some(block) = find_block(&blocks, dependency) {
                context.related_sections.push(RelatedSection {
                    template_path: path.to_path_buf(),
                    resource_name: block.name.clone(),
                    relation: RelationKind::DependsOn,
                    raw_text: block.raw_text.clone(),
                });
            }
            context
                .related_sections
                .extend(external.iter().filter(|section| &section.resource_name == dependency).cloned());
        }

        for block in &blocks {
            if block.name != current.name && block.depends_on.iter().any(|dependency| dependency == &current.name) {
                context.related_sections.push(RelatedSection {
                    template_path: path.to_path_buf(),
                    resource_name: block.name.clone(),
                    relation: RelationKind::Dependent,
                    raw_text: block.raw_text.clone(),
                });
            }
        }

        context
    }

    /// Blocks named in `dependencies` that other indexed templates declare.
    async fn external_dependencies(
        &self,
        path: &Path,
        dependencies: &[String],
        cancel: &CancellationToken,
    ) -> Vec<RelatedSection> {
        if dependencies.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<Arc<FileScanResult>> = self
            .index
            .files_in_order()
            .into_iter()
            .filter(|scan| scan.file_path.as_path() != path)
            .filter(|scan| dependencies.iter().any(|name| scan.resource(name).is_some()))
            .collect();
        let workers = candidates.len().min(self.max_concurrency).max(1);

        let found: Vec<Vec<RelatedSection>> = stream::iter(candidates)
            .map(|scan| async move {
                if cancel.is_cancelled() {
                    return Vec::new();
                }
                let text = match tokio::fs::read_to_string(&scan.file_path).await {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(path = %scan.file_path.display(), error = %err, "failed to re-read template");
                        return Vec::new();
                    }
                };
                let (blocks, _) = dedupe_blocks(parse_document(&text).resources);
                dependencies
                    .iter()
                    .filter_map(|name| {
                        let block = blocks.iter().find(|block| &block.name == name)?;
                        Some(RelatedSection {
                            template_path: scan.file_path.clone(),
                            resource_name: name.clone(),
                            relation: RelationKind::ExternalDependsOn,
                            raw_text: block.raw_text.clone(),
                        })
                    })
                    .collect()
            })
            .buffered(workers)
            .collect()
            .await;

        found.into_iter().flatten().collect()
    }
}

/// Build the context of one template from its fresh `text`.
///
/// Classification comes from the cached `scan` when the token is known there,
/// otherwise it is resolved against the fresh text.
pub(crate) fn build_file_context(
    scan: &FileScanResult,
    text: &str,
    provider: &str,
    target: &ProviderReference,
) -> Option<ProviderCompletionContext> {
    let document = parse_document(text);
    let (blocks, _) = dedupe_blocks(document.resources);
    let mut examples = Vec::new();

    for block in &blocks {
        let Some(token) = block.provider_token.as_deref() else {
            continue;
        };
        let reference = scan
            .reference(token)
            .cloned()
            .unwrap_or_else(|| resolve_provider(token, &document.provider_definitions));
        if !reference.matches_target(provider, target) {
            continue;
        }

        let dependency_chunks = block
            .depends_on
            .iter()
            .filter_map(|dependency| find_block(&blocks, dependency))
            .map(|dependency| DependencyChunk {
                resource_name: dependency.name.clone(),
                raw_text: dependency.raw_text.clone(),
            })
            .collect();

        let mut alias_definitions = Vec::new();
        if !reference.alias_chain.is_empty() {
            for alias in &reference.alias_chain {
                if let Some(raw_text) = raw_provider_definition(text, alias) {
                    alias_definitions.push(AliasDefinition {
                        alias_name: alias.clone(),
                        raw_text,
                    });
                }
            }
        } else if reference.kind == ProviderKind::Custom && token == provider {
            if let Some(raw_text) = raw_provider_definition(text, token) {
                alias_definitions.push(AliasDefinition {
                    alias_name: token.to_string(),
                    raw_text,
                });
            }
        }

        examples.push(ResourceChunk {
            resource_name: block.name.clone(),
            raw_text: block.raw_text.clone(),
            provider_kind: reference.kind,
            provider_reference: token.to_string(),
            canonical_name: reference.canonical_name.clone(),
            dependencies: block.depends_on.clone(),
            dependency_chunks,
            alias_definitions,
        });
    }

    if examples.is_empty() {
        return None;
    }

    Some(ProviderCompletionContext {
        template_path: scan.file_path.clone(),
        template_kind: if document.phases.is_empty() {
            TemplateKind::Phaseless
        } else {
            TemplateKind::Phased
        },
        resource_examples: examples,
        provider_metadata: None,
    })
}

fn loosely_matches(reference: &ProviderReference, provider: &str) -> bool {
    reference.canonical_name.as_deref().is_some_and(|name| name.eq_ignore_ascii_case(provider))
        || reference.raw_token.eq_ignore_ascii_case(provider)
        || (reference.kind == ProviderKind::Library
            && split_library_provider(&reference.raw_token).is_some_and(|(_, name)| name == provider))
}

fn loose_examples(scan: &FileScanResult, text: &str, provider: &str) -> Option<ResourceExampleGroup> {
    let (blocks, _) = dedupe_blocks(parse_document(text).resources);
    let examples: Vec<ResourceExample> = blocks
        .into_iter()
        .filter_map(|block| {
            let token = block.provider_token?;
            let matched = scan
                .reference(&token)
                .map_or_else(|| token.eq_ignore_ascii_case(provider), |r| loosely_matches(r, provider));
            matched.then(|| ResourceExample {
                resource_name: block.name,
                provider_reference: token,
                raw_text: block.raw_text,
            })
        })
        .collect();

    (!examples.is_empty()).then(|| ResourceExampleGroup {
        template_path: scan.file_path.clone(),
        examples,
    })
}
