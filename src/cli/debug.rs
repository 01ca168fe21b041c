//! `debug-resources` and `debug-context`: diagnostic dumps on stderr.
//!
//! Both commands leave stdout empty so they can run next to tools that parse
//! the machine-readable output of the other commands.

use anyhow::Result;
use clap::Args;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::common::{DocumentSource, Engine, provider_or_report, read_document};
use crate::config::LensConfig;
use crate::context::{ProviderCompletionRequest, ProviderCompletionResponse, ResourceExampleGroup};
use crate::scanner::current_section;

/// Print resources that use a provider (case-insensitive match) to stderr.
#[derive(Args, Debug)]
pub struct DebugResourcesCommand {
    /// Provider name to look for
    #[arg(long, value_name = "NAME")]
    provider: Option<String>,
}

impl DebugResourcesCommand {
    pub async fn execute(self, settings: &LensConfig, templates: &[PathBuf]) -> Result<()> {
        let Some(provider) = provider_or_report(self.provider.as_deref()) else {
            return Ok(());
        };
        let engine = Engine::load(settings, templates).await?;
        let groups = engine.context_builder().resource_examples(provider, &engine.cancel).await;
        eprint!("{}", render_resource_examples(provider, &groups));
        Ok(())
    }
}

/// Print the full completion context of a provider to stderr.
#[derive(Args, Debug)]
pub struct DebugContextCommand {
    /// Provider name to build the context for
    #[arg(long, value_name = "NAME")]
    provider: Option<String>,

    #[command(flatten)]
    source: DocumentSource,

    /// Cursor line (0-based) in the current document
    #[arg(long, value_name = "N")]
    line: Option<usize>,
}

impl DebugContextCommand {
    pub async fn execute(self, settings: &LensConfig, templates: &[PathBuf]) -> Result<()> {
        let Some(provider) = provider_or_report(self.provider.as_deref()) else {
            return Ok(());
        };
        let content = read_document(&self.source).await?;
        let engine = Engine::load(settings, templates).await?;

        let mut out = String::new();
        let _ = writeln!(out, "\n=== PROVIDER COMPLETION CONTEXT FOR: {provider} ===");
        let _ = writeln!(out, "Request:");
        let _ = writeln!(out, "  Provider: {provider}");
        let _ = writeln!(out, "  Template content length: {} chars", content.len());
        if let Some(line) = self.line {
            let section = current_section(&content, line);
            let _ = writeln!(out, "  Cursor section: {}", section.as_deref().unwrap_or("[none]"));
        }

        let request = ProviderCompletionRequest {
            provider_name: provider.to_string(),
            current_template_content: content,
        };
        let response = engine.context_builder().handle_completion(&request, &engine.cancel).await;
        out.push_str(&render_context(&response));

        eprint!("{out}");
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn push_indented(out: &mut String, indent: &str, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "{indent}{line}");
    }
}

/// Stderr dump for `debug-resources`.
#[must_use]
pub fn render_resource_examples(provider: &str, groups: &[ResourceExampleGroup]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== RESOURCE EXAMPLES FOR PROVIDER: {provider} ===");

    if groups.is_empty() {
        let _ = writeln!(out, "No templates found for provider: {provider}");
    }

    let rule = "-".repeat(60);
    for group in groups {
        let _ = writeln!(out, "\n--- TEMPLATE: {} ---", file_name(&group.template_path));
        for example in &group.examples {
            let _ = writeln!(out, "\n  RESOURCE: {}", example.resource_name);
            let _ = writeln!(out, "  PROVIDER: {}", example.provider_reference);
            let _ = writeln!(out, "  CONTENT LENGTH: {} characters", example.raw_text.len());
            let _ = writeln!(out, "  CONTENT:");
            let _ = writeln!(out, "  {rule}");
            push_indented(&mut out, "  ", &example.raw_text);
            let _ = writeln!(out, "  {rule}");
        }
    }

    let _ = writeln!(out, "\n=== END EXAMPLES FOR {provider} ===\n");
    out
}

/// Stderr dump for `debug-context`, starting at the response summary.
#[must_use]
pub fn render_context(response: &ProviderCompletionResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== RESPONSE SUMMARY ===");
    let _ = writeln!(out, "Provider name: {}", response.provider_name);
    let _ = writeln!(out, "Snake case alias: {}", response.is_snake_case);
    let _ = writeln!(out, "Needs provider definition: {}", response.needs_provider_definition);
    let _ = writeln!(out, "Number of contexts: {}", response.contexts.len());

    if let Some(suggestion) = &response.suggested_provider_definition {
        let rule = "-".repeat(60);
        let _ = writeln!(out, "\n=== SUGGESTED PROVIDER DEFINITION ===");
        let _ = writeln!(out, "  {rule}");
        push_indented(&mut out, "  ", suggestion);
        let _ = writeln!(out, "  {rule}");
    }

    if response.contexts.is_empty() {
        return out;
    }

    let rule = "=".repeat(50);
    let _ = writeln!(out, "\n=== CONTEXTS WITH RESOURCE EXAMPLES ===");
    for (i, context) in response.contexts.iter().enumerate() {
        let _ = writeln!(out, "\n--- CONTEXT {}: {} ---", i + 1, file_name(&context.template_path));
        let _ = writeln!(out, "Template type: {}", context.template_kind);
        let _ = writeln!(out, "Resource examples: {}", context.resource_examples.len());
        if let Some(metadata) = &context.provider_metadata {
            let _ = writeln!(
                out,
                "Provider metadata: {} ({} inputs, {} outputs)",
                metadata.name,
                metadata.contract.input_fields.len(),
                metadata.contract.output_fields.len()
            );
        }

        for (j, example) in context.resource_examples.iter().enumerate() {
            let _ = writeln!(out, "\n    --- RESOURCE {}: {} ---", j + 1, example.resource_name);
            let _ = writeln!(out, "    Provider type: {}", example.provider_kind);
            let _ = writeln!(out, "    Provider reference: {}", example.provider_reference);
            let _ = writeln!(out, "    Dependencies: {}", example.dependencies.len());
            let _ = writeln!(out, "    Alias definitions: {}", example.alias_definitions.len());

            let _ = writeln!(out, "\n    MAIN RESOURCE CONTENT:");
            let _ = writeln!(out, "    {rule}");
            push_indented(&mut out, "    ", &example.raw_text);
            let _ = writeln!(out, "    {rule}");

            for name in &example.dependencies {
                let chunk = example
                    .dependency_chunks
                    .iter()
                    .find(|chunk| chunk.resource_name == *name)
                    .or_else(|| {
                        example.dependency_chunks.iter().find(|chunk| chunk.resource_name.eq_ignore_ascii_case(name))
                    });
                match chunk {
                    Some(chunk) => {
                        let _ = writeln!(out, "\n    DEPENDENCY: {name}");
                        push_indented(&mut out, "    ", &chunk.raw_text);
                    }
                    None => {
                        let _ = writeln!(out, "\n    DEPENDENCY: {name} [not found in template]");
                    }
                }
            }
            for alias in &example.alias_definitions {
                let _ = writeln!(out, "\n    ALIAS DEFINITION: {}", alias.alias_name);
                push_indented(&mut out, "    ", &alias.raw_text);
            }
        }
    }

    out
}
