//! Completion responses for editor integrations.

use tokio_util::sync::CancellationToken;

use super::ContextBuilder;
use super::types::{ProviderCompletionContext, ProviderCompletionRequest, ProviderCompletionResponse};
use crate::naming::is_snake_case;
use crate::resolver::ProviderKind;

impl ContextBuilder<'_> {
    /// Build contexts for `request` and decide whether the user needs a
    /// provider definition for the alias they are typing.
    pub async fn handle_completion(
        &self,
        request: &ProviderCompletionRequest,
        cancel: &CancellationToken,
    ) -> ProviderCompletionResponse {
        let provider_name = request.provider_name.trim();
        let contexts = self.build(provider_name, &request.current_template_content, cancel).await;
        let is_snake_case = is_snake_case(provider_name);

        let needs_provider_definition = is_snake_case
            && contexts.iter().flat_map(|c| &c.resource_examples).any(|example| {
                matches!(example.provider_kind, ProviderKind::Alias | ProviderKind::Custom)
            });

        let suggested_provider_definition = needs_provider_definition.then(|| {
            suggested_definition(&contexts).unwrap_or_else(|| default_provider_definition(provider_name))
        });

        ProviderCompletionResponse {
            provider_name: provider_name.to_string(),
            is_snake_case,
            needs_provider_definition,
            suggested_provider_definition,
            contexts,
        }
    }
}

/// Last definition of the first example that resolved through definitions.
fn suggested_definition(contexts: &[ProviderCompletionContext]) -> Option<String> {
    contexts
        .iter()
        .flat_map(|context| &context.resource_examples)
        .find(|example| !example.alias_definitions.is_empty())
        .and_then(|example| example.alias_definitions.last())
        .map(|definition| definition.raw_text.clone())
}

/// Skeleton of an `External` provider definition named `provider_name`.
#[must_use]
pub fn default_provider_definition(provider_name: &str) -> String {
    format!(
        "  {provider_name}:\n    base_provider: External\n    properties:\n      RPClass: # provider class\n      RPAssembly: # provider assembly"
    )
}
