//! Output types of context building.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::contracts::ProviderContract;
use crate::resolver::ProviderKind;

/// Whether a template organises its resources in buildout phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Declares at least one `scenario.phase`.
    Phased,
    /// No `buildout_phases:` entries.
    Phaseless,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phased => f.write_str("phased"),
            Self::Phaseless => f.write_str("phaseless"),
        }
    }
}

/// Raw text of one local provider definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasDefinition {
    pub alias_name: String,
    pub raw_text: String,
}

/// Raw text of a `depends_on` target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyChunk {
    pub resource_name: String,
    pub raw_text: String,
}

/// One resource that uses the requested provider, with its surroundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChunk {
    pub resource_name: String,
    /// Verbatim resource block.
    pub raw_text: String,
    pub provider_kind: ProviderKind,
    /// Provider token as written in the resource.
    pub provider_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    /// Names from `depends_on`.
    pub dependencies: Vec<String>,
    /// Dependencies found in the same template, in `depends_on` order.
    pub dependency_chunks: Vec<DependencyChunk>,
    /// Provider definitions walked to resolve the reference.
    pub alias_definitions: Vec<AliasDefinition>,
}

/// Contract of the requested provider, attached to each context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    pub name: String,
    #[serde(flatten)]
    pub contract: ProviderContract,
}

/// Usage examples of a provider from one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCompletionContext {
    pub template_path: PathBuf,
    pub template_kind: TemplateKind,
    /// Never empty.
    pub resource_examples: Vec<ResourceChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
}

/// A completion request from an editor integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCompletionRequest {
    pub provider_name: String,
    #[serde(default)]
    pub current_template_content: String,
}

/// Contexts plus the hints the editor needs to offer a provider definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCompletionResponse {
    pub provider_name: String,
    /// The requested name is a snake_case alias.
    pub is_snake_case: bool,
    /// The alias resolves through local definitions, so the user needs one too.
    pub needs_provider_definition: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_provider_definition: Option<String>,
    pub contexts: Vec<ProviderCompletionContext>,
}

/// A resource found by the loose provider match used for debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceExample {
    pub resource_name: String,
    pub provider_reference: String,
    pub raw_text: String,
}

/// Loose-match examples grouped by template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceExampleGroup {
    pub template_path: PathBuf,
    pub examples: Vec<ResourceExample>,
}

/// How a related section is tied to the resource at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Listed in the current resource's `depends_on`, same template.
    DependsOn,
    /// A `depends_on` target declared in another indexed template.
    ExternalDependsOn,
    /// A resource of the same template that depends on the current one.
    Dependent,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependsOn => f.write_str("depends_on"),
            Self::ExternalDependsOn => f.write_str("external_depends_on"),
            Self::Dependent => f.write_str("dependent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSection {
    pub template_path: PathBuf,
    pub resource_name: String,
    pub relation: RelationKind,
    pub raw_text: String,
}

/// The resource under the cursor of an indexed template and its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionContext {
    pub template_path: PathBuf,
    /// 0-based cursor line.
    pub line: usize,
    /// Resource the cursor is in, or the one named by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_resource: Option<String>,
    /// Raw text of the current resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_text: Option<String>,
    /// Same-file dependencies (each followed by its cross-file matches), then dependents.
    pub related_sections: Vec<RelatedSection>,
}
