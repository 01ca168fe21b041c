//! Provider token classification and alias-chain resolution.
//!
//! A resource names its provider with a free-form token. The resolver turns
//! that token into a [`ProviderReference`] with a canonical Pascal-case
//! identity, using the document's own `providers:` table to follow aliases.
//!
//! # Classification order
//!
//! The first matching rule wins:
//!
//! 1. **Library**: the token contains `::`. The library is the text before the
//!    first `::`; the canonical name is the Pascal-case form of the rest.
//! 2. **Local definition**: the token is a key of the document's provider
//!    table. The definition chain is walked (see below).
//! 3. **Builtin**: the token starts with an uppercase character. The token is
//!    its own canonical name.
//! 4. **Custom**: anything else (an undefined snake_case name). The canonical
//!    name is the Pascal-case form of the token.
//!
//! Local definitions are checked before the builtin rule so that a
//! Pascal-named `External` provider declared in the document resolves to the
//! class it is backed by, not to a builtin of the same name.
//!
//! # Alias walk
//!
//! Starting from the token, each visited definition name is appended to
//! [`ProviderReference::alias_chain`], then its `base_provider` decides:
//!
//! - `External` → **Custom**, canonical name taken from the `RPClass` class name
//! - `Lib::name` → **Library**, as in rule 1
//! - another local definition → continue the walk with that name
//! - an uppercase name → **Builtin**
//! - empty or an undefined lowercase name → stop, unresolved **Alias**
//!
//! A name that is already in the chain stops the walk immediately, so a cycle
//! of length *k* terminates after at most *k* + 1 steps. Cycles are not
//! errors: the reference keeps the best classification known so far.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::constants::EXTERNAL_BASE_PROVIDER;
use crate::naming::{
    pascal_case, provider_name_from_rp_class, split_library_provider, starts_uppercase,
};
use crate::scanner::ProviderDefinition;

/// How a provider token was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ProviderKind {
    /// `Library::name` reference to a provider shipped in an imported library.
    Library,
    /// Provider backed by a compiled class (`base_provider: External`).
    Custom,
    /// Local alias whose chain could not be resolved to a terminal provider.
    Alias,
    /// Pascal-case provider built into the platform.
    Builtin,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Library => "Library",
            Self::Custom => "Custom",
            Self::Alias => "Alias",
            Self::Builtin => "Builtin",
        };
        f.write_str(name)
    }
}

/// Resolved identity of a provider token as used in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderReference {
    /// Token exactly as written (trimmed).
    pub raw_token: String,
    /// Classification result.
    pub kind: ProviderKind,
    /// Pascal-case canonical name; `None` while an alias is unresolved.
    pub canonical_name: Option<String>,
    /// Library part of a `Library::name` reference.
    pub library_name: Option<String>,
    /// Local definition names visited while resolving, in walk order.
    pub alias_chain: Vec<String>,
}

impl ProviderReference {
    fn new(raw_token: &str, kind: ProviderKind) -> Self {
        Self {
            raw_token: raw_token.to_string(),
            kind,
            canonical_name: None,
            library_name: None,
            alias_chain: Vec::new(),
        }
    }

    /// Canonical name, or an empty string when unresolved.
    #[must_use]
    pub fn canonical(&self) -> &str {
        self.canonical_name.as_deref().unwrap_or("")
    }

    /// Whether a resource using this reference is an example of `target`.
    ///
    /// `target_token` is the provider name as requested; `target` is that name
    /// resolved in the requesting document. A reference matches when the
    /// canonical names agree, when the raw tokens are identical, or when this
    /// reference is library-qualified and its part after `::` equals the
    /// requested token.
    #[must_use]
    pub fn matches_target(&self, target_token: &str, target: &Self) -> bool {
        if let (Some(ours), Some(theirs)) = (&self.canonical_name, &target.canonical_name) {
            if !ours.is_empty() && ours == theirs {
                return true;
            }
        }
        if self.raw_token == target_token {
            return true;
        }
        self.kind == ProviderKind::Library
            && split_library_provider(&self.raw_token).is_some_and(|(_, name)| name == target_token)
    }
}

/// Resolve `token` against a document's provider definitions.
///
/// Never fails; see the module documentation for the rules.
#[must_use]
pub fn resolve_provider(
    token: &str,
    definitions: &BTreeMap<String, ProviderDefinition>,
) -> ProviderReference {
    let token = token.trim();

    if let Some((library, name)) = split_library_provider(token) {
        let mut reference = ProviderReference::new(token, ProviderKind::Library);
        apply_library(&mut reference, library, name);
        return reference;
    }

    if definitions.contains_key(token) {
        return walk_definitions(token, definitions);
    }

    if token.is_empty() {
        return ProviderReference::new(token, ProviderKind::Alias);
    }

    if starts_uppercase(token) {
        let mut reference = ProviderReference::new(token, ProviderKind::Builtin);
        reference.canonical_name = Some(token.to_string());
        return reference;
    }

    let mut reference = ProviderReference::new(token, ProviderKind::Custom);
    reference.canonical_name = Some(pascal_case(token));
    reference
}

fn walk_definitions(
    token: &str,
    definitions: &BTreeMap<String, ProviderDefinition>,
) -> ProviderReference {
    let mut reference = ProviderReference::new(token, ProviderKind::Alias);
    let mut current = token.to_string();

    loop {
        if reference.alias_chain.contains(&current) {
            debug!(token, chain = ?reference.alias_chain, "provider alias cycle, stopping walk");
            break;
        }
        let Some(definition) = definitions.get(&current) else {
            debug!(token, missing = %current, "provider alias points to an undefined name");
            break;
        };
        reference.alias_chain.push(current.clone());

        let base = definition.base_provider.trim();
        if base == EXTERNAL_BASE_PROVIDER {
            reference.kind = ProviderKind::Custom;
            reference.canonical_name = definition
                .rp_class
                .as_deref()
                .map(provider_name_from_rp_class)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            break;
        }
        if let Some((library, name)) = split_library_provider(base) {
            reference.kind = ProviderKind::Library;
            apply_library(&mut reference, library, name);
            break;
        }
        if base.is_empty() {
            break;
        }
        if !definitions.contains_key(base) && starts_uppercase(base) {
            reference.kind = ProviderKind::Builtin;
            reference.canonical_name = Some(base.to_string());
            break;
        }

        current = base.to_string();
    }

    reference
}

fn apply_library(reference: &mut ProviderReference, library: &str, name: &str) {
    let name = name.trim();
    reference.library_name = Some(library.trim().to_string());
    reference.canonical_name = Some(pascal_case(name));
}
