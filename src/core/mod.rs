//! Core error handling for buildout-lens.
//!
//! - [`LensError`]: the failures a command can report
//! - [`ErrorContext`]: an error with details and a suggestion, printed in color
//! - [`user_friendly_error`]: turns any `anyhow::Error` into an [`ErrorContext`]
//!
//! ```rust
//! use buildout_lens::core::{LensError, user_friendly_error};
//!
//! let error = anyhow::Error::from(LensError::Other { message: "boom".to_string() });
//! let friendly = user_friendly_error(error);
//! assert_eq!(friendly.error.to_string(), "boom");
//! ```

pub mod error;
pub mod error_formatting;

pub use error::{ErrorContext, LensError};
pub use error_formatting::{create_error_context, user_friendly_error};
