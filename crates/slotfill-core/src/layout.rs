//! Record layout heuristics.
//!
//! A layout is the whole of what slotfill knows about the host format: how a
//! record starts and ends, how its declared name is written, which lines hold
//! the anchor field, and which trailing comment marks each target slot.
//! Everything else in the text is opaque.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};

/// How a value is written into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Double-quoted string literal; quotes, backslashes and line breaks escaped.
    #[default]
    Quoted,
    /// Written verbatim (numbers, identifiers).
    Bare,
}

/// A target slot, recognized by a trailing `<comment_prefix> <name>` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotField {
    pub name: String,
    /// Literal that marks the slot as awaiting enrichment (e.g. `""`).
    pub sentinel: String,
    #[serde(default)]
    pub kind: ValueKind,
}

impl SlotField {
    pub fn quoted(name: &str, sentinel: &str) -> Self {
        Self {
            name: name.to_string(),
            sentinel: sentinel.to_string(),
            kind: ValueKind::Quoted,
        }
    }

    pub fn bare(name: &str, sentinel: &str) -> Self {
        Self {
            name: name.to_string(),
            sentinel: sentinel.to_string(),
            kind: ValueKind::Bare,
        }
    }

    /// Render a raw lookup value as a literal for this slot.
    pub fn render(&self, value: &str) -> String {
        match self.kind {
            ValueKind::Quoted => quote_literal(value),
            ValueKind::Bare => value.to_string(),
        }
    }
}

/// Double-quote a value. Line breaks and tabs are escaped so a literal never
/// spans more than one line.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn default_comment_prefix() -> String {
    "//".to_string()
}

fn default_separator() -> String {
    ",".to_string()
}

/// Serializable layout description. Compile with [`RecordLayout::compile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLayout {
    /// Regex matched anywhere in a line that opens a record.
    pub record_start: String,
    /// Regex matched against a whole line that closes a record.
    pub record_end: String,
    /// Regex with one capture group, applied to the start line.
    pub declared_name: String,
    /// Substrings characteristic of the populated anchor field.
    pub anchor_markers: Vec<String>,
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Target slots in bundle order.
    pub slots: Vec<SlotField>,
}

impl RecordLayout {
    pub fn compile(&self) -> Result<CompiledLayout> {
        if self.slots.is_empty() {
            return Err(EnrichError::Config("layout declares no slots".to_string()));
        }
        if self.comment_prefix.is_empty() {
            return Err(EnrichError::Config("comment prefix is empty".to_string()));
        }

        let compile = |field: &str, pattern: &str| {
            Regex::new(pattern).map_err(|source| EnrichError::InvalidPattern {
                field: field.to_string(),
                source,
            })
        };

        let start = compile("record_start", &self.record_start)?;
        let end = compile("record_end", &self.record_end)?;
        let name = compile("declared_name", &self.declared_name)?;
        if name.captures_len() < 2 {
            return Err(EnrichError::Config(
                "declared_name pattern needs a capture group".to_string(),
            ));
        }

        let mut slot_markers = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let pattern = format!(
                r"{}\s*{}\b",
                regex::escape(&self.comment_prefix),
                regex::escape(&slot.name)
            );
            slot_markers.push(compile(&format!("slot `{}`", slot.name), &pattern)?);
        }

        Ok(CompiledLayout {
            layout: self.clone(),
            start,
            end,
            name,
            slot_markers,
        })
    }
}

/// A slot line as found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotToken {
    pub field: usize,
    /// Byte range of the value literal within the line.
    pub range: std::ops::Range<usize>,
    pub filled: bool,
}

#[derive(Debug, Clone)]
pub struct CompiledLayout {
    layout: RecordLayout,
    start: Regex,
    end: Regex,
    name: Regex,
    slot_markers: Vec<Regex>,
}

impl CompiledLayout {
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    pub fn slots(&self) -> &[SlotField] {
        &self.layout.slots
    }

    pub fn separator(&self) -> &str {
        &self.layout.separator
    }

    pub fn comment_prefix(&self) -> &str {
        &self.layout.comment_prefix
    }

    pub fn is_record_start(&self, line: &str) -> bool {
        self.start.is_match(line)
    }

    pub fn is_record_end(&self, line: &str) -> bool {
        self.end.is_match(line)
    }

    pub fn declared_name(&self, line: &str) -> Option<String> {
        self.name
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn is_anchor(&self, line: &str) -> bool {
        self.layout
            .anchor_markers
            .iter()
            .any(|m| !m.is_empty() && line.contains(m.as_str()))
    }

    /// True for lines that hold nothing but a comment.
    pub fn is_comment_only(&self, line: &str) -> bool {
        line.trim_start().starts_with(self.layout.comment_prefix.as_str())
    }

    /// Split a line into code and trailing comment, ignoring comment
    /// prefixes inside string literals (URLs contain `//`).
    pub fn split_comment<'l>(&self, line: &'l str) -> (&'l str, Option<&'l str>) {
        let prefix = self.layout.comment_prefix.as_str();
        let mut in_string = false;
        let mut escaped = false;
        for (i, c) in line.char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            if c == '"' {
                in_string = true;
                continue;
            }
            if line[i..].starts_with(prefix) {
                return (&line[..i], Some(&line[i..]));
            }
        }
        (line, None)
    }

    /// Recognize a slot line and locate its value literal.
    ///
    /// Matching is on the marker comment only, so a missing or doubled
    /// separator before it does not hide the slot.
    pub fn parse_slot(&self, line: &str) -> Option<SlotToken> {
        let (code, comment) = self.split_comment(line);
        let comment = comment?;
        let field = self.slot_markers.iter().position(|m| m.is_match(comment))?;

        let code = code.trim_end();
        let code = code
            .strip_suffix(self.layout.separator.as_str())
            .unwrap_or(code)
            .trim_end();
        let start = code.len() - code.trim_start().len();
        if start == code.len() {
            return None;
        }
        let token = &code[start..];
        Some(SlotToken {
            field,
            range: start..code.len(),
            filled: token != self.layout.slots[field].sentinel,
        })
    }

    /// Byte offset just past the code of a line (before trailing whitespace
    /// and any comment), and whether the code already ends in the separator.
    pub fn code_end(&self, line: &str) -> (usize, bool) {
        let (code, _) = self.split_comment(line);
        let code = code.trim_end();
        (code.len(), code.ends_with(self.layout.separator.as_str()))
    }
}
