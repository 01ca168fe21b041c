//! Top-level section location and the small sections of a template.
//!
//! A section starts at a column-zero `key:` line and owns every following line
//! until the next non-blank, non-comment line at column zero. Column-zero list
//! items (`- name`) stay inside the section because YAML allows a sequence to
//! sit at the same indentation as its key.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::lines::Line;
use super::{ProviderDefinition, ScenarioPhase};

static SCENARIO_PHASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(\w+)\.(\w+):").expect("scenario/phase pattern is valid")
});

static PROVIDER_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+(\w+):\s*$").expect("provider header pattern is valid"));

static BASE_PROVIDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+base_provider:\s*(.+)$").expect("base_provider pattern is valid"));

static RP_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+RPClass:\s*(.+)$").expect("RPClass pattern is valid"));

static RP_ASSEMBLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+RPAssembly:\s*(.+)$").expect("RPAssembly pattern is valid"));

/// A located top-level section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Section {
    /// Index of the `key:` line.
    pub header: usize,
    /// Index of the first line after the section (exclusive).
    pub end: usize,
    /// Byte offset where the section body starts (line after the header).
    pub body_start: usize,
    /// Byte offset of the terminating line, or the document length.
    pub end_offset: usize,
}

impl Section {
    /// Line indices of the section body.
    pub fn body(&self) -> std::ops::Range<usize> {
        self.header + 1..self.end
    }
}

/// Find every top-level `key:` section, in document order.
///
/// Repeated keys (malformed YAML) yield one section each.
pub(crate) fn find_sections(lines: &[Line<'_>], key: &str, content_len: usize) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !lines[i].is_top_level_key(key) {
            i += 1;
            continue;
        }

        let header = i;
        let mut end = header + 1;
        while end < lines.len() {
            let line = &lines[end];
            if !line.is_blank_or_comment() && line.indent() == 0 && !line.trimmed().starts_with('-')
            {
                break;
            }
            end += 1;
        }

        let body_start = lines.get(header + 1).map_or(content_len, |line| line.start);
        let end_offset = lines.get(end).map_or(content_len, |line| line.start);
        sections.push(Section {
            header,
            end,
            body_start,
            end_offset,
        });
        i = end;
    }

    sections
}

/// Raw text of the first `key:` section including its header, trailing whitespace trimmed.
pub(crate) fn section_text(
    content: &str,
    lines: &[Line<'_>],
    key: &str,
) -> Option<String> {
    let section = find_sections(lines, key, content.len()).into_iter().next()?;
    let start = lines[section.header].start;
    Some(content[start..section.end_offset].trim_end().to_string())
}

/// Extract `- name` items of every `imports:` section.
pub(crate) fn extract_imports(lines: &[Line<'_>], content_len: usize) -> Vec<String> {
    let mut imports = Vec::new();

    for section in find_sections(lines, "imports", content_len) {
        for line in &lines[section.body()] {
            if line.is_blank_or_comment() {
                continue;
            }
            let Some(item) = line.trimmed().strip_prefix('-') else {
                break;
            };
            let item = strip_inline_comment(item).trim();
            if !item.is_empty() {
                imports.push(item.to_string());
            }
        }
    }

    imports
}

/// Extract `scenario.phase:` keys from the `buildout_phases:` section.
///
/// Only keys at the first child indentation count; nested keys that happen to
/// contain a dot are ignored.
pub(crate) fn extract_phases(lines: &[Line<'_>], content_len: usize) -> Vec<ScenarioPhase> {
    let mut phases = Vec::new();

    for section in find_sections(lines, "buildout_phases", content_len) {
        let body = &lines[section.body()];
        let Some(child_indent) = first_child_indent(body) else {
            continue;
        };

        for line in body {
            if line.is_blank_or_comment() || line.indent() != child_indent {
                continue;
            }
            if let Some(caps) = SCENARIO_PHASE.captures(line.text) {
                phases.push(ScenarioPhase {
                    scenario: caps[1].to_string(),
                    phase: caps[2].to_string(),
                });
            }
        }
    }

    phases
}

/// Parse the definitions in every `providers:` section.
///
/// A definition is a `name:` line at the first child indentation; everything
/// more indented below it belongs to that definition. Later definitions with
/// the same name replace earlier ones.
pub(crate) fn extract_provider_definitions(
    lines: &[Line<'_>],
    content_len: usize,
) -> BTreeMap<String, ProviderDefinition> {
    let mut definitions = BTreeMap::new();

    for section in find_sections(lines, "providers", content_len) {
        let body = &lines[section.body()];
        let Some(child_indent) = first_child_indent(body) else {
            continue;
        };

        let mut current: Option<ProviderDefinition> = None;
        for line in body {
            if line.is_blank_or_comment() {
                continue;
            }

            let indent = line.indent();
            if indent <= child_indent {
                if let Some(done) = current.take() {
                    definitions.insert(done.name.clone(), done);
                }
                if indent == child_indent {
                    if let Some(caps) = PROVIDER_HEADER.captures(line.text) {
                        current = Some(ProviderDefinition {
                            name: caps[1].to_string(),
                            ..ProviderDefinition::default()
                        });
                    }
                }
                continue;
            }

            let Some(definition) = current.as_mut() else {
                continue;
            };
            if let Some(caps) = BASE_PROVIDER.captures(line.text) {
                definition.base_provider = clean_value(&caps[1]);
            } else if let Some(caps) = RP_CLASS.captures(line.text) {
                definition.rp_class = Some(clean_value(&caps[1]));
            } else if let Some(caps) = RP_ASSEMBLY.captures(line.text) {
                definition.rp_assembly = Some(clean_value(&caps[1]));
            }
        }

        if let Some(done) = current.take() {
            definitions.insert(done.name.clone(), done);
        }
    }

    definitions
}

/// Raw text of the provider definition `name`, header included.
///
/// The header match is case-insensitive. The block runs until the next
/// non-blank, non-comment line indented no deeper than the header.
pub(crate) fn provider_definition_text(
    content: &str,
    lines: &[Line<'_>],
    name: &str,
) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let needle = format!("{}:", name.to_lowercase());

    for section in find_sections(lines, "providers", content.len()) {
        let body = section.body();
        let Some(child_indent) = first_child_indent(&lines[body.clone()]) else {
            continue;
        };
        for i in body.clone() {
            let header = &lines[i];
            if header.indent() != child_indent
                || !header.trimmed().to_lowercase().starts_with(&needle)
            {
                continue;
            }

            let header_indent = header.indent();
            let end = lines[i + 1..body.end]
                .iter()
                .find(|line| !line.is_blank_or_comment() && line.indent() <= header_indent)
                .map_or(section.end_offset, |line| line.start);

            return Some(content[header.start..end].trim_end().to_string());
        }
    }

    None
}

/// Indentation of the first structural line in `body`.
fn first_child_indent(body: &[Line<'_>]) -> Option<usize> {
    body.iter().find(|line| !line.is_blank_or_comment()).map(Line::indent).filter(|&indent| indent > 0)
}

/// Drop a trailing ` # comment` from a scalar value.
pub(crate) fn strip_inline_comment(value: &str) -> &str {
    match value.find(" #") {
        Some(pos) => &value[..pos],
        None => value,
    }
}

/// Trim a scalar value and remove a trailing comment.
fn clean_value(value: &str) -> String {
    strip_inline_comment(value).trim().to_string()
}
