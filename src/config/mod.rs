//! Configuration for buildout-lens.
//!
//! Settings come from an optional TOML file. It is located in this order:
//!
//! 1. `--config <path>` on the command line
//! 2. the `BUILDOUT_LENS_CONFIG` environment variable
//! 3. `~/.buildout-lens/config.toml` (`%LOCALAPPDATA%\buildout-lens\config.toml` on Windows)
//!
//! A missing file means defaults. An existing file that does not parse is an
//! error.
//!
//! # Format
//!
//! ```toml
//! # Files, directories (scanned for *.yml / *.yaml) or glob patterns.
//! templates = ["~/templates", "/srv/shared/**/*.yml"]
//!
//! # Bound for concurrent template reads during refresh and context building.
//! max_concurrency = 8
//!
//! # Provider contract map produced from the compiled provider libraries.
//! contracts = "~/templates/contracts.json"
//!
//! # Default number of examples printed by `provider-completion`.
//! examples = 5
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_EXAMPLE_COUNT, DEFAULT_MAX_CONCURRENCY, TEMPLATE_EXTENSIONS,
};
use crate::core::LensError;

/// Settings loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Template files, directories or glob patterns, in registration order.
    pub templates: Vec<String>,
    /// Worker bound for refresh and context building.
    pub max_concurrency: usize,
    /// Optional contract registry file (JSON or YAML).
    pub contracts: Option<String>,
    /// Default example count for `provider-completion`.
    pub examples: usize,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            contracts: None,
            examples: DEFAULT_EXAMPLE_COUNT,
        }
    }
}

impl LensConfig {
    /// Load configuration from `path`, or from the environment variable or
    /// default location when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the located file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let Some(path) = path.or_else(Self::env_path).or_else(|| Self::default_path().ok()) else {
            debug!("no configuration location available, using defaults");
            return Ok(Self::default());
        };

        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            debug!(path = %path.display(), "configuration file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`LensError::ConfigError`] if the file cannot be read or is not valid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| LensError::ConfigError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| LensError::ConfigError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), templates = config.templates.len(), "loaded configuration");
        Ok(config)
    }

    /// Default configuration file location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("buildout-lens")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".buildout-lens")
        };

        Ok(config_dir.join("config.toml"))
    }

    fn env_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()).map(PathBuf::from)
    }

    /// Worker bound, never below one.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// Expanded contract registry path, if configured.
    #[must_use]
    pub fn contracts_path(&self) -> Option<PathBuf> {
        self.contracts.as_deref().filter(|p| !p.trim().is_empty()).map(expand_path)
    }

    /// Expand configured templates plus `extra` into concrete file paths.
    ///
    /// Directories are walked for template files, glob patterns are matched,
    /// and plain paths are kept even if they do not exist yet (a refresh then
    /// reports them as missing). Duplicates are removed, first occurrence wins.
    #[must_use]
    pub fn resolve_template_paths(&self, extra: &[PathBuf]) -> Vec<PathBuf> {
        let entries = self
            .templates
            .iter()
            .map(|entry| expand_path(entry))
            .chain(extra.iter().cloned());

        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for entry in entries {
            for path in expand_entry(&entry) {
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        }
        paths
    }
}

/// Expand `~` and environment variables; fall back to the literal text.
fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(err) => {
            warn!(path = raw, error = %err, "failed to expand variables in path");
            PathBuf::from(shellexpand::tilde(raw).as_ref())
        }
    }
}

fn is_glob_pattern(path: &Path) -> bool {
    path.to_string_lossy().contains(['*', '?', '['])
}

fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn expand_entry(entry: &Path) -> Vec<PathBuf> {
    if is_glob_pattern(entry) {
        let pattern = entry.to_string_lossy();
        return match glob::glob(&pattern) {
            Ok(matches) => {
                let mut files: Vec<PathBuf> =
                    matches.filter_map(std::result::Result::ok).filter(|p| p.is_file()).collect();
                files.sort();
                files
            }
            Err(err) => {
                warn!(pattern = %pattern, error = %err, "invalid template glob pattern");
                Vec::new()
            }
        };
    }

    if entry.is_dir() {
        return WalkDir::new(entry)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file() && has_template_extension(e.path()))
            .map(walkdir::DirEntry::into_path)
            .collect();
    }

    vec![entry.to_path_buf()]
}
