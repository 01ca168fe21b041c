//! User-facing rendering of errors.
//!
//! Converts whatever a command returned into an [`ErrorContext`] with a
//! suggestion the user can act on.

use super::error::{ErrorContext, LensError};

/// Convert any error into a user-friendly format with contextual suggestions.
///
/// A [`LensError`] anywhere in the chain decides the suggestion. I/O and
/// parse errors without one get a generic hint, and everything else is shown
/// with its full context chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(lens_error) = cause.downcast_ref::<LensError>() {
            let context = create_error_context(lens_error);
            return match chain_details(&error) {
                Some(details) if context.details.is_none() => context.with_details(details),
                _ => context,
            };
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(LensError::ConfigError {
            path: "config.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your buildout-lens configuration");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(LensError::Other {
            message: io_error.to_string(),
        })
        .with_suggestion("Check that the path exists and is readable");
    }

    let message = error.to_string();
    let context = ErrorContext::new(LensError::Other {
        message,
    });
    match chain_details(&error) {
        Some(details) => context.with_details(details),
        None => context,
    }
}

/// Attach the suggestion that fits `error`.
#[must_use]
pub fn create_error_context(error: &LensError) -> ErrorContext {
    let context = ErrorContext::new(error.clone());
    match error {
        LensError::ConfigError {
            ..
        } => context
            .with_suggestion("Fix the file or point --config / BUILDOUT_LENS_CONFIG at another one"),
        LensError::TemplateReadError {
            ..
        } => context.with_suggestion(
            "Check that the file exists and is readable, or pipe the document with --stdin",
        ),
        LensError::StdinReadError {
            ..
        } => context.with_suggestion("Pass the document with --file instead of --stdin"),
        LensError::ContractRegistryError {
            ..
        } => context.with_suggestion(
            "The registry must be a JSON or YAML map from provider name to contract",
        ),
        LensError::Other {
            ..
        } => context,
    }
}

/// Causes below the top-level message, joined for display.
fn chain_details(error: &anyhow::Error) -> Option<String> {
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    (!causes.is_empty()).then(|| causes.join(": "))
}
