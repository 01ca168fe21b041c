//! `provider-completion`: usage examples of a provider.

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;

use super::common::{DocumentSource, Engine, indexed_path, provider_or_report, read_document};
use crate::config::LensConfig;
use crate::constants::{MAX_SUGGESTIONS, SUGGESTION_SIMILARITY_THRESHOLD};
use crate::context::{PositionContext, ProviderCompletionRequest, ProviderCompletionResponse};
use crate::index::TemplateIndex;

/// Output format of `provider-completion`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// The full completion response as JSON
    Json,
}

/// Build completion context for a provider and print examples to stdout.
#[derive(Args, Debug)]
pub struct ProviderCompletionCommand {
    /// Provider name (snake_case alias, Pascal name or Library::name)
    #[arg(long, value_name = "NAME")]
    provider: Option<String>,

    #[command(flatten)]
    source: DocumentSource,

    /// Resource the cursor is in (needs --file)
    #[arg(long, value_name = "NAME")]
    resource: Option<String>,

    /// Cursor line, 0-based (needs --file)
    #[arg(long, value_name = "N")]
    line: Option<usize>,

    /// Number of examples to print; negative values count as 0 [default: from config, 5]
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    examples: Option<i64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// JSON output: the completion response plus the cursor context, if any.
#[derive(Serialize)]
struct CompletionOutput<'a> {
    #[serde(flatten)]
    response: &'a ProviderCompletionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a PositionContext>,
}

impl ProviderCompletionCommand {
    pub async fn execute(self, settings: &LensConfig, templates: &[PathBuf]) -> Result<()> {
        let Some(provider) = provider_or_report(self.provider.as_deref()) else {
            return Ok(());
        };
        let content = read_document(&self.source).await?;
        let engine = Engine::load(settings, templates).await?;
        let builder = engine.context_builder();

        let request = ProviderCompletionRequest {
            provider_name: provider.to_string(),
            current_template_content: content,
        };
        let response = builder.handle_completion(&request, &engine.cancel).await;
        let position = self.position_context(&engine).await;

        match self.format {
            OutputFormat::Json => {
                let output = CompletionOutput {
                    response: &response,
                    position: position.as_ref(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                print!("{}", render_text(provider, &response, self.example_count(settings)));
                if response.contexts.is_empty() {
                    let suggestions = similar_providers(&engine.index, provider);
                    if !suggestions.is_empty() {
                        println!("Did you mean: {}?", suggestions.join(", "));
                    }
                }
                if let Some(position) = &position {
                    print!("{}", render_position(position));
                }
            }
        }
        Ok(())
    }

    fn example_count(&self, settings: &LensConfig) -> usize {
        self.examples.map_or(settings.examples, |n| usize::try_from(n).unwrap_or(0))
    }

    async fn position_context(&self, engine: &Engine) -> Option<PositionContext> {
        if self.line.is_none() && self.resource.is_none() {
            return None;
        }
        let Some(file) = &self.source.file else {
            debug!("cursor position given without --file, skipping related sections");
            return None;
        };
        let path = indexed_path(&engine.index, file).await.unwrap_or_else(|| file.clone());
        let context = engine
            .context_builder()
            .context_for_position(&path, self.line.unwrap_or(0), self.resource.as_deref(), &engine.cancel)
            .await;
        Some(context)
    }
}

/// Text rendering of a completion response, at most `examples` examples.
#[must_use]
pub fn render_text(provider: &str, response: &ProviderCompletionResponse, examples: usize) -> String {
    let all: Vec<_> = response.contexts.iter().flat_map(|c| &c.resource_examples).collect();
    let mut out = String::new();

    if all.is_empty() || examples == 0 {
        let _ = writeln!(out, "No examples found for provider '{provider}'");
        return out;
    }

    let take = examples.min(all.len());
    let _ = writeln!(out, "Provider completion context for '{provider}'");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Available example resources: {}", all.len());
    let _ = writeln!(out, "Printing {take} example(s):");
    let _ = writeln!(out);

    for (i, example) in all.iter().take(take).enumerate() {
        let _ = writeln!(out, "---");
        let _ = writeln!(out, "Example #{}:", i + 1);
        let _ = writeln!(out, "ResourceName: {}", example.resource_name);
        let _ = writeln!(out, "ProviderType: {}", example.provider_kind);
        let _ = writeln!(out, "Raw:");
        let _ = writeln!(out, "{}", example.raw_text.trim_end());
        let _ = writeln!(out);
    }

    let aliases: Vec<_> = all.iter().flat_map(|example| &example.alias_definitions).collect();
    if !aliases.is_empty() {
        let _ = writeln!(out, "Aliases / provider definitions:");
        for alias in aliases {
            let _ = writeln!(out, " - {} => {}", alias.alias_name, alias.raw_text);
        }
    }

    out
}

/// Text rendering of the resource at the cursor and its related sections.
#[must_use]
pub fn render_position(position: &PositionContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let Some(resource) = &position.current_resource else {
        let _ = writeln!(out, "No resource at line {}", position.line);
        return out;
    };
    if position.main_text.is_none() {
        let _ = writeln!(out, "Resource '{resource}' not found in {}", position.template_path.display());
        return out;
    }

    let _ = writeln!(out, "Related sections for '{resource}': {}", position.related_sections.len());
    for section in &position.related_sections {
        let _ = writeln!(out, "---");
        let _ = writeln!(
            out,
            "[{}] {} ({})",
            section.relation,
            section.resource_name,
            section.template_path.display()
        );
        let _ = writeln!(out, "{}", section.raw_text.trim_end());
    }
    out
}

/// Known provider names close to `provider`, best match first.
#[must_use]
pub fn similar_providers(index: &TemplateIndex, provider: &str) -> Vec<String> {
    let needle = provider.to_lowercase();
    let mut scored: Vec<(f64, String)> = index
        .provider_names()
        .into_iter()
        .filter(|name| name != provider)
        .filter_map(|name| {
            let score = strsim::jaro_winkler(&needle, &name.to_lowercase());
            (score >= SUGGESTION_SIMILARITY_THRESHOLD).then_some((score, name))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().take(MAX_SUGGESTIONS).map(|(_, name)| name).collect()
}
