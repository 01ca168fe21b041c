//! Global constants used throughout the buildout-lens codebase.
//!
//! Scanner conventions, worker bounds and CLI defaults.

/// Columns a tab character counts for when measuring indentation.
///
/// A fixed convention of the quick scanner, not YAML's rule (YAML forbids
/// tabs for indentation). Never inferred from the document.
pub const TAB_WIDTH: usize = 4;

/// Minimum indentation (in columns) of a resource header under `resources:`.
pub const MIN_RESOURCE_INDENT: usize = 2;

/// The `base_provider` value that marks a custom provider backed by a compiled class.
pub const EXTERNAL_BASE_PROVIDER: &str = "External";

/// Default upper bound on concurrent file reads and parses.
///
/// Applies to both index refreshes and context building. The effective bound
/// for a context build is `min(candidate files, max_concurrency)`.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default number of examples printed by `provider-completion`.
pub const DEFAULT_EXAMPLE_COUNT: usize = 5;

/// Minimum Jaro-Winkler similarity for "did you mean" provider suggestions.
pub const SUGGESTION_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Maximum number of "did you mean" suggestions printed.
pub const MAX_SUGGESTIONS: usize = 3;

/// Environment variable consulted for the configuration file path.
pub const CONFIG_ENV_VAR: &str = "BUILDOUT_LENS_CONFIG";

/// File extensions picked up when a configured template entry is a directory.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Printed to stdout when a command runs without a provider name.
pub const MISSING_PROVIDER_MESSAGE: &str = "Missing --provider <name>";
