//! Indentation-aware extraction of resource blocks.
//!
//! Works line by line over each `resources:` section, without backtracking:
//!
//! 1. A header is a line ending in `:` indented at least
//!    [`MIN_RESOURCE_INDENT`] columns.
//! 2. The block then consumes lines until a non-blank, non-comment line at an
//!    indentation no deeper than the header. Two constructs are consumed
//!    regardless of indentation: `- item` lines directly following a
//!    `depends_on:` key, and lines more indented than a `properties:` key.
//! 3. The block ends at the start of the terminating line, or at the end of
//!    the section.
//!
//! Nothing here fails: text that does not fit the shape is simply not a block.

use regex::Regex;
use std::sync::LazyLock;

use super::ResourceBlock;
use super::lines::Line;
use super::sections::{Section, find_sections, strip_inline_comment};
use crate::constants::MIN_RESOURCE_INDENT;

static PROVIDER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+provider:\s*(.*)$").expect("provider pattern is valid"));

static DEPENDENCY_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*([\w.-]+)").expect("dependency item pattern is valid"));

/// Parse every resource block of every `resources:` section, in document order.
///
/// Duplicate names are returned as separate blocks; callers decide how to
/// collapse them (see [`super::dedupe_blocks`]).
pub(crate) fn parse_blocks(content: &str, lines: &[Line<'_>]) -> Vec<ResourceBlock> {
    find_sections(lines, "resources", content.len())
        .into_iter()
        .flat_map(|section| parse_section(content, lines, section))
        .collect()
}

fn parse_section(content: &str, lines: &[Line<'_>], section: Section) -> Vec<ResourceBlock> {
    let mut blocks = Vec::new();
    let body = section.body();
    let mut i = body.start;

    while i < body.end {
        let line = &lines[i];
        let trimmed = line.trimmed();
        let indent = line.indent();

        if line.is_blank_or_comment() || !trimmed.ends_with(':') || indent < MIN_RESOURCE_INDENT {
            i += 1;
            continue;
        }

        let name = header_name(trimmed);
        let end = block_end(lines, i + 1, body.end, indent);
        let start_offset = line.start;
        let end_offset = lines.get(end).filter(|_| end < body.end).map_or(section.end_offset, |l| l.start);

        let block_lines = &lines[i + 1..end];
        blocks.push(ResourceBlock {
            name,
            start_offset,
            end_offset,
            raw_text: content[start_offset..end_offset].trim_end().to_string(),
            provider_token: provider_token(block_lines),
            depends_on: dependencies(block_lines),
        });

        i = end;
    }

    blocks
}

/// `  - name:` → `name`
fn header_name(trimmed: &str) -> String {
    let name = trimmed.trim_start_matches('-').trim();
    name.strip_suffix(':').unwrap_or(name).trim().to_string()
}

/// Index of the line that terminates the block whose header sits at `header_indent`.
fn block_end(lines: &[Line<'_>], from: usize, limit: usize, header_indent: usize) -> usize {
    let mut properties_indent: Option<usize> = None;
    let mut after_depends_on = false;

    for k in from..limit {
        let line = &lines[k];
        if line.is_blank_or_comment() {
            continue;
        }
        let trimmed = line.trimmed();
        let indent = line.indent();

        if starts_with_key(trimmed, "depends_on:") {
            after_depends_on = true;
            continue;
        }
        if after_depends_on {
            if trimmed.starts_with('-') {
                continue;
            }
            after_depends_on = false;
        }

        if starts_with_key(trimmed, "properties:") {
            properties_indent = Some(indent);
            continue;
        }
        if let Some(props) = properties_indent {
            if indent > props {
                continue;
            }
            properties_indent = None;
        }

        if indent <= header_indent {
            return k;
        }
    }

    limit
}

fn starts_with_key(trimmed: &str, key: &str) -> bool {
    trimmed.get(..key.len()).is_some_and(|prefix| prefix.eq_ignore_ascii_case(key))
}

/// First `provider:` value inside the block; `None` when the provider is deferred.
fn provider_token(block_lines: &[Line<'_>]) -> Option<String> {
    let caps = block_lines.iter().find_map(|line| PROVIDER_LINE.captures(line.text))?;
    let value = strip_inline_comment(&caps[1]).trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Items of the first `depends_on:` list inside the block.
///
/// Both the block form (`- a` lines) and the flow form (`depends_on: [a, b]`)
/// are recognised. Order and duplicates are preserved.
fn dependencies(block_lines: &[Line<'_>]) -> Vec<String> {
    let Some(pos) = block_lines.iter().position(|line| starts_with_key(line.trimmed(), "depends_on:"))
    else {
        return Vec::new();
    };

    let inline = block_lines[pos].trimmed()["depends_on:".len()..].trim();
    let inline = strip_inline_comment(inline).trim();
    if let Some(flow) = inline.strip_prefix('[') {
        let flow = flow.strip_suffix(']').unwrap_or(flow);
        return flow
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut deps = Vec::new();
    for line in &block_lines[pos + 1..] {
        if line.is_blank_or_comment() {
            continue;
        }
        match DEPENDENCY_ITEM.captures(line.trimmed()) {
            Some(caps) => deps.push(caps[1].to_string()),
            None if line.trimmed().starts_with('-') => continue,
            None => break,
        }
    }
    deps
}
