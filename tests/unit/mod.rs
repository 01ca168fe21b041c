//! Library-level tests that span several modules: index refreshes against
//! real files, context building over a populated index and provider
//! resolution across templates.
//!
//! ```bash
//! cargo test --test unit
//! ```

mod context_building;
mod index_consistency;
