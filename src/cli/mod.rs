//! Command-line interface for buildout-lens.
//!
//! The binary indexes the configured templates on every invocation, runs one
//! command and exits. Machine-readable output goes to stdout; logs and debug
//! dumps go to stderr.
//!
//! # Commands
//!
//! - `index-info`: JSON summary of the index
//! - `provider-completion`: usage examples of a provider, as text or JSON
//! - `debug-resources`: loose-match resource dump to stderr
//! - `debug-context`: full completion context dump to stderr
//!
//! # Global options
//!
//! - `--verbose` / `--quiet`: log level (overridden by `RUST_LOG`)
//! - `--config <path>`: configuration file (also `BUILDOUT_LENS_CONFIG`)
//! - `--template <path>`: extra template file, directory or glob (repeatable)
//!
//! ```bash
//! buildout-lens --template ./templates index-info
//! buildout-lens provider-completion --provider remote_job_provider --file warp.yml --examples 3
//! buildout-lens provider-completion --provider ManualOperationProvider --file warp.yml --line 42
//! cat warp.yml | buildout-lens debug-context --provider TestRemoteJob --stdin
//! ```

mod common;
mod debug;
mod index_info;
mod provider_completion;


pub use common::{DocumentSource, Engine, read_document};

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::LensConfig;

/// Settings derived from global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
    /// Template paths given with `--template`.
    pub templates: Vec<PathBuf>,
}

impl CliConfig {
    /// Install the tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the level chosen by flags. Calling
    /// this more than once is harmless.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Template indexing and provider completion for buildout service templates.
#[derive(Parser, Debug)]
#[command(
    name = "buildout-lens",
    about = "Index buildout service templates and build provider completion context",
    version,
    long_about = "buildout-lens scans buildout service templates (even half-written ones), \
                  resolves provider references and prints usage examples of a provider \
                  collected across all indexed templates."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Template file, directory or glob to index (repeatable)
    #[arg(short = 't', long = "template", global = true, value_name = "PATH")]
    templates: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index the templates and print a JSON summary
    IndexInfo(index_info::IndexInfoCommand),

    /// Print usage examples of a provider
    ProviderCompletion(provider_completion::ProviderCompletionCommand),

    /// Dump resources using a provider to stderr
    DebugResources(debug::DebugResourcesCommand),

    /// Dump the full completion context of a provider to stderr
    DebugContext(debug::DebugContextCommand),
}

impl Cli {
    /// Run the parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error when configuration, the contract registry or a
    /// required input document cannot be loaded.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
            templates: self.templates.clone(),
        }
    }

    /// Run the command with an explicit [`CliConfig`]; logging is left untouched.
    ///
    /// # Errors
    ///
    /// See [`Cli::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let Some(command) = self.command else {
            print_help()?;
            return Ok(());
        };

        let settings = LensConfig::load_with_optional(config.config_path.clone()).await?;
        match command {
            Commands::IndexInfo(cmd) => cmd.execute(&settings, &config.templates).await,
            Commands::ProviderCompletion(cmd) => cmd.execute(&settings, &config.templates).await,
            Commands::DebugResources(cmd) => cmd.execute(&settings, &config.templates).await,
            Commands::DebugContext(cmd) => cmd.execute(&settings, &config.templates).await,
        }
    }
}

/// Print usage to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn print_help() -> Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}
