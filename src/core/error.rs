//! Error types for buildout-lens.
//!
//! Only the outer shell of the tool can fail: loading configuration, loading
//! the contract registry and reading the document the user asked about. The
//! scanner, resolver, index and context builder never return errors; anomalies
//! there degrade to empty results.
//!
//! - [`LensError`] enumerates the failures with the data needed to explain them
//! - [`ErrorContext`] pairs an error with details and a suggestion for the CLI
//!
//! # Example
//!
//! ```rust,no_run
//! use buildout_lens::core::{ErrorContext, LensError};
//!
//! let context = ErrorContext::new(LensError::TemplateReadError {
//!     path: "service.yml".to_string(),
//!     reason: "permission denied".to_string(),
//! })
//! .with_suggestion("Check that the file exists and is readable");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Failures surfaced by buildout-lens commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LensError {
    /// The configuration file exists but cannot be read or parsed.
    #[error("Invalid configuration file {path}: {reason}")]
    ConfigError {
        path: String,
        reason: String,
    },

    /// The document a command needs cannot be read.
    #[error("Failed to read template {path}: {reason}")]
    TemplateReadError {
        path: String,
        reason: String,
    },

    /// Reading the current document from standard input failed.
    #[error("Failed to read document from stdin: {reason}")]
    StdinReadError {
        reason: String,
    },

    /// The contract registry file cannot be loaded.
    #[error("Failed to load contract registry {path}: {reason}")]
    ContractRegistryError {
        path: String,
        reason: String,
    },

    /// Anything else, with a preformatted message.
    #[error("{message}")]
    Other {
        message: String,
    },
}

/// An error plus optional details and a suggested fix.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error.
    pub error: LensError,
    /// Optional suggestion for resolving the error.
    pub suggestion: Option<String>,
    /// Optional additional details about the error.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap `error` without details or suggestion.
    #[must_use]
    pub const fn new(error: LensError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion, shown in green.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details, shown in yellow.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}
