//! Quick scan of service templates.
//!
//! The scanner extracts structure from template text without requiring it to
//! be well-formed YAML, because it runs on documents that are being edited.
//! It is a line-oriented indentation state machine: every case it does not
//! recognise degrades to "section absent" or "field empty", and no function in
//! this module returns an error or panics on malformed input.
//!
//! # Extracted structure
//!
//! - **Resource blocks** under `resources:` with their provider token and
//!   `depends_on` list ([`ResourceBlock`])
//! - **Provider definitions** under `providers:` ([`ProviderDefinition`])
//! - **Imports** listed under `imports:`
//! - **Scenarios and phases** from `scenario.phase:` keys under `buildout_phases:`
//!
//! # Example
//!
//! ```rust
//! use buildout_lens::scanner::parse_document;
//!
//! let doc = parse_document("resources:\n  A:\n    provider: StdLib::remote_job_provider\n");
//! assert_eq!(doc.resources.len(), 1);
//! assert_eq!(doc.resources[0].provider_token.as_deref(), Some("StdLib::remote_job_provider"));
//! ```

mod blocks;
mod lines;
mod sections;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use lines::split_lines;

/// One declared resource, as found in the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBlock {
    /// Resource name taken from the header line.
    pub name: String,
    /// Byte offset of the header line.
    pub start_offset: usize,
    /// Byte offset of the line that terminated the block (exclusive).
    pub end_offset: usize,
    /// Verbatim block text with trailing whitespace trimmed.
    pub raw_text: String,
    /// Provider token as written; `None` when the resource defers its provider.
    pub provider_token: Option<String>,
    /// Resource names listed under `depends_on`, order and duplicates preserved.
    pub depends_on: Vec<String>,
}

/// An entry of the document's `providers:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDefinition {
    /// Alias key (snake_case or Pascal case).
    pub name: String,
    /// Raw `base_provider` value; empty when the key is missing.
    pub base_provider: String,
    /// `RPClass` property, meaningful for `External` providers.
    pub rp_class: Option<String>,
    /// `RPAssembly` property, meaningful for `External` providers.
    pub rp_assembly: Option<String>,
}

/// A `scenario.phase` key from `buildout_phases:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScenarioPhase {
    /// Part before the dot (e.g. `newaz`).
    pub scenario: String,
    /// Part after the dot (e.g. `deployment`).
    pub phase: String,
}

/// Everything the quick scan extracts from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Every resource block in document order, duplicates included.
    pub resources: Vec<ResourceBlock>,
    /// Raw text of the first `providers:` section, header included.
    pub providers_text: Option<String>,
    /// Raw text of the first `imports:` section, header included.
    pub imports_text: Option<String>,
    /// Provider definitions by name (later duplicates replace earlier ones).
    pub provider_definitions: BTreeMap<String, ProviderDefinition>,
    /// Import names in document order.
    pub imports: Vec<String>,
    /// Scenario/phase keys in document order.
    pub phases: Vec<ScenarioPhase>,
}

impl ParsedDocument {
    /// Distinct scenario names in first-seen order.
    #[must_use]
    pub fn scenarios(&self) -> Vec<String> {
        let mut scenarios: Vec<String> = Vec::new();
        for phase in &self.phases {
            if !scenarios.contains(&phase.scenario) {
                scenarios.push(phase.scenario.clone());
            }
        }
        scenarios
    }
}

/// Run the full quick scan over `content`.
///
/// Deterministic: identical input always yields an identical result.
#[must_use]
pub fn parse_document(content: &str) -> ParsedDocument {
    let lines = split_lines(content);

    ParsedDocument {
        resources: blocks::parse_blocks(content, &lines),
        providers_text: sections::section_text(content, &lines, "providers"),
        imports_text: sections::section_text(content, &lines, "imports"),
        provider_definitions: sections::extract_provider_definitions(&lines, content.len()),
        imports: sections::extract_imports(&lines, content.len()),
        phases: sections::extract_phases(&lines, content.len()),
    }
}

/// Parse only the resource blocks of `content`.
#[must_use]
pub fn parse_resource_blocks(content: &str) -> Vec<ResourceBlock> {
    blocks::parse_blocks(content, &split_lines(content))
}

/// Parse only the `providers:` definitions of `content`.
#[must_use]
pub fn parse_provider_definitions(content: &str) -> BTreeMap<String, ProviderDefinition> {
    sections::extract_provider_definitions(&split_lines(content), content.len())
}

/// Collapse blocks that share a name.
///
/// The last block with a given name wins, but it takes the list position of
/// the first occurrence. Returns the collapsed list and the names that were
/// declared more than once (each reported once, first-seen order).
#[must_use]
pub fn dedupe_blocks(blocks: Vec<ResourceBlock>) -> (Vec<ResourceBlock>, Vec<String>) {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<ResourceBlock> = Vec::with_capacity(blocks.len());
    let mut duplicates = Vec::new();

    for block in blocks {
        match positions.get(&block.name) {
            Some(&pos) => {
                if !duplicates.contains(&block.name) {
                    duplicates.push(block.name.clone());
                }
                unique[pos] = block;
            }
            None => {
                positions.insert(block.name.clone(), unique.len());
                unique.push(block);
            }
        }
    }

    (unique, duplicates)
}

/// Find the block named `name`: exact match first, then case-insensitive.
#[must_use]
pub fn find_block<'a>(blocks: &'a [ResourceBlock], name: &str) -> Option<&'a ResourceBlock> {
    blocks
        .iter()
        .find(|block| block.name == name)
        .or_else(|| blocks.iter().find(|block| block.name.eq_ignore_ascii_case(name)))
}

/// Raw text of the resource `name` in `content`, or `None` when absent.
///
/// Duplicates resolve the same way as the per-file scan (last wins).
#[must_use]
pub fn raw_resource_text(content: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let (blocks, _) = dedupe_blocks(parse_resource_blocks(content));
    find_block(&blocks, name).map(|block| block.raw_text.clone())
}

/// Raw text of every resource in `names` that exists in `content`, in order.
#[must_use]
pub fn raw_resource_texts(content: &str, names: &[String]) -> Vec<String> {
    if names.is_empty() {
        return Vec::new();
    }
    let (blocks, _) = dedupe_blocks(parse_resource_blocks(content));
    names.iter().filter_map(|name| find_block(&blocks, name)).map(|b| b.raw_text.clone()).collect()
}

/// Raw text of the provider definition `name` (header plus body).
#[must_use]
pub fn raw_provider_definition(content: &str, name: &str) -> Option<String> {
    sections::provider_definition_text(content, &split_lines(content), name)
}

/// Name of the resource whose block contains the 0-based `line`.
///
/// Unlike [`current_section`], a line nested under `properties:` or
/// `depends_on:` still reports its resource. `None` outside every block.
#[must_use]
pub fn resource_at_line(content: &str, line: usize) -> Option<String> {
    let lines = split_lines(content);
    let offset = lines.get(line)?.start;
    blocks::parse_blocks(content, &lines)
        .into_iter()
        .find(|block| block.start_offset <= offset && offset < block.end_offset)
        .map(|block| block.name)
}

/// Closest enclosing mapping key of the 0-based `line`.
///
/// Walks upwards from `line` and returns the first `key:` line indented less
/// than `line` itself. Editor integrations use this to learn which resource
/// the cursor is in. Returns `None` for top-level lines and out-of-range input.
#[must_use]
pub fn current_section(content: &str, line: usize) -> Option<String> {
    let lines = split_lines(content);
    let target = lines.get(line)?;
    let mut indent = if target.is_blank_or_comment() { usize::MAX } else { target.indent() };

    for candidate in lines[..line].iter().rev() {
        if candidate.is_blank_or_comment() {
            continue;
        }
        let candidate_indent = candidate.indent();
        if candidate_indent >= indent {
            continue;
        }
        let trimmed = candidate.trimmed();
        if trimmed.ends_with(':') && !trimmed.starts_with('-') {
            return Some(trimmed.trim_end_matches(':').trim().to_string());
        }
        indent = indent.min(candidate_indent + 1);
    }

    None
}
