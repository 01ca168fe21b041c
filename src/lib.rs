//! buildout-lens - template indexing and provider resolution for buildout service templates
//!
//! Buildout service templates are YAML-like documents that declare resources,
//! each backed by a provider. They are often half-written while being edited,
//! so nothing here relies on a YAML parser for structure: the scanner works on
//! indentation and keys alone and never fails.
//!
//! # Architecture Overview
//!
//! - [`scanner`] splits a document into resource blocks, provider definitions,
//!   imports and scenario phases
//! - [`resolver`] classifies a provider token (`Library::name`, local alias,
//!   builtin or custom) and follows alias chains to a canonical name
//! - [`index`] keeps one scan result per template and aggregate lookups by
//!   scenario, provider and import, refreshed concurrently
//! - [`context`] gathers usage examples of a provider across the index,
//!   including the dependencies and alias definitions each example relies on
//! - [`contracts`] supplies optional input/output metadata per provider
//! - [`config`] and [`cli`] wire the pieces into the `buildout-lens` binary
//!
//! # Template Format
//!
//! ```yaml
//! imports:
//!   - StdLib
//! providers:
//!   copy_job:
//!     base_provider: External
//!     properties:
//!       RPClass: Contoso.Providers.CopyJob
//! resources:
//!   Warp:
//!     provider: StdLib::remote_job_provider
//!   Copy:
//!     provider: copy_job
//!     depends_on: [Warp]
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Summary of everything under ./templates
//! buildout-lens -t ./templates index-info
//!
//! # Examples of a provider, resolved against the file being edited
//! buildout-lens -t ./templates provider-completion --provider copy_job --file warp.yml
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod contracts;
pub mod core;
pub mod index;
pub mod naming;
pub mod resolver;
pub mod scanner;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
