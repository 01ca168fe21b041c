//! Provider contract lookup.
//!
//! Input and output field metadata of providers is extracted outside this
//! tool, from the compiled provider libraries. The engine only reads it,
//! through the [`ContractRegistry`] trait, keyed by canonical provider name.
//!
//! [`StaticContractRegistry`] is the file-backed implementation: a JSON or
//! YAML document mapping canonical names to [`ProviderContract`]s.
//!
//! ```json
//! {
//!   "RemoteJobProvider": {
//!     "inputFields": [{ "propertyName": "Script", "valueType": "String", "isOptional": false }],
//!     "outputFields": [],
//!     "inputTypeName": "RemoteJobInput"
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::core::LensError;

/// One input or output property of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEntry {
    pub property_name: String,
    pub value_type: String,
    #[serde(default)]
    pub is_optional: bool,
}

/// Field metadata of one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderContract {
    #[serde(default)]
    pub input_fields: Vec<FieldEntry>,
    #[serde(default)]
    pub output_fields: Vec<FieldEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type_name: Option<String>,
}

/// Read-only lookup of provider contracts by canonical name.
pub trait ContractRegistry: Send + Sync {
    /// Contract of the provider `canonical_name`, if known.
    fn get_contract(&self, canonical_name: &str) -> Option<ProviderContract>;
}

/// In-memory registry, optionally loaded from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticContractRegistry {
    contracts: HashMap<String, ProviderContract>,
}

impl StaticContractRegistry {
    /// An empty registry; every lookup misses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an existing map.
    #[must_use]
    pub fn from_map(contracts: HashMap<String, ProviderContract>) -> Self {
        Self {
            contracts,
        }
    }

    /// Add or replace one contract.
    pub fn insert(&mut self, canonical_name: impl Into<String>, contract: ProviderContract) {
        self.contracts.insert(canonical_name.into(), contract);
    }

    /// Number of known providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Load a registry file. `.json` files are parsed as JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`LensError::ContractRegistryError`] when the file cannot be
    /// read or does not contain a name-to-contract map.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| LensError::ContractRegistryError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let registry = Self::parse(path, &content)
            .with_context(|| format!("Failed to parse contract registry: {}", path.display()))?;
        debug!(path = %path.display(), providers = registry.len(), "loaded contract registry");
        Ok(registry)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let contracts: HashMap<String, ProviderContract> = if is_json {
            serde_json::from_str(content).map_err(|e| LensError::ContractRegistryError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            serde_yaml::from_str::<Option<HashMap<String, ProviderContract>>>(content)
                .map_err(|e| LensError::ContractRegistryError {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?
                .unwrap_or_default()
        };
        Ok(Self::from_map(contracts))
    }
}

impl ContractRegistry for StaticContractRegistry {
    fn get_contract(&self, canonical_name: &str) -> Option<ProviderContract> {
        self.contracts.get(canonical_name).cloned()
    }
}
