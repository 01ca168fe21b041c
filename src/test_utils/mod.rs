//! Test utilities for buildout-lens
//!
//! Template fixtures and one-time logging setup, shared by unit tests and the
//! `tests/` targets through the `test-utils` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use buildout_lens::test_utils::{TemplateFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let dir = tempfile::tempdir().unwrap();
//! let path = TemplateFixture::sample().write_to(dir.path()).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::{TemplateFixture, write_templates};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`. Without either, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=buildout_lens=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
