//! Record scanner.
//!
//! Walks the arena once, top to bottom, and yields [`ScanEvent`]s lazily.
//! A record opens on a line matching the layout's start pattern and closes
//! on the next terminal line. Inside it:
//!
//! - anchor-marker lines overwrite a "last anchor" cursor,
//! - the first slot line captures the cursor and clears it,
//! - the terminal captures the cursor when no slot was seen.
//!
//! The scanner only observes; it never decides what to write.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::arena::{Line, LineArena};
use crate::layout::CompiledLayout;

/// The most recent anchor-marker line seen in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorValue {
    pub line: usize,
    pub value: String,
}

/// A slot that already exists in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingSlot {
    /// Index into the layout's slot fields.
    pub field: usize,
    pub line: usize,
    /// Byte range of the value literal within the line.
    pub token: Range<usize>,
    /// The literal differs from the field's sentinel.
    pub filled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    /// 1-based position among closed records.
    pub ordinal: usize,
    pub start_line: usize,
    /// The terminal marker line.
    pub end_line: usize,
    pub declared_name: Option<String>,
    pub adjacent_anchor: Option<AnchorValue>,
    pub slots: Vec<ExistingSlot>,
    /// Last non-blank, non-comment line before the terminal.
    pub last_field_line: Option<usize>,
}

impl ScannedRecord {
    pub fn has_open_slot(&self) -> bool {
        self.slots.iter().any(|s| !s.filled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// A slot marker outside any record; left untouched.
    OrphanSlot { line_no: usize, field: String },
    /// A record start seen while another record was still open.
    UnterminatedRecord { start_line_no: usize, interrupted_at_line_no: usize },
    /// Input ended inside a record.
    UnclosedAtEof { start_line_no: usize },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::OrphanSlot { line_no, field } => {
                write!(f, "line {line_no}: `{field}` slot outside any record")
            }
            ScanWarning::UnterminatedRecord {
                start_line_no,
                interrupted_at_line_no,
            } => write!(
                f,
                "line {start_line_no}: record not closed before next record at line {interrupted_at_line_no}"
            ),
            ScanWarning::UnclosedAtEof { start_line_no } => {
                write!(f, "line {start_line_no}: record not closed before end of input")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Record(ScannedRecord),
    Warning(ScanWarning),
}

#[derive(Debug)]
struct OpenRecord {
    start_line: usize,
    declared_name: Option<String>,
    /// `Some(cursor)` once the first slot line has been seen.
    anchor_at_first_slot: Option<Option<AnchorValue>>,
    slots: Vec<ExistingSlot>,
    last_field_line: Option<usize>,
}

/// Lazy, single-pass record scanner. Not restartable: build a new one to
/// rescan.
pub struct RecordScanner<'a, 'l> {
    lines: std::slice::Iter<'a, Line<'a>>,
    layout: &'l CompiledLayout,
    open: Option<OpenRecord>,
    cursor: Option<AnchorValue>,
    closed: usize,
    pending: VecDeque<ScanEvent>,
    done: bool,
}

impl<'a, 'l> RecordScanner<'a, 'l> {
    pub fn new(arena: &'a LineArena<'a>, layout: &'l CompiledLayout) -> Self {
        Self {
            lines: arena.lines().iter(),
            layout,
            open: None,
            cursor: None,
            closed: 0,
            pending: VecDeque::new(),
            done: false,
        }
    }

    fn step(&mut self, line: &Line<'_>) {
        let text = line.text;

        if self.layout.is_record_start(text) {
            if let Some(prev) = self.open.take() {
                self.pending.push_back(ScanEvent::Warning(ScanWarning::UnterminatedRecord {
                    start_line_no: prev.start_line + 1,
                    interrupted_at_line_no: line.number(),
                }));
            }
            self.cursor = None;
            self.open = Some(OpenRecord {
                start_line: line.index,
                declared_name: self.layout.declared_name(text),
                anchor_at_first_slot: None,
                slots: Vec::new(),
                last_field_line: None,
            });
        } else if self.open.is_some() && self.layout.is_record_end(text) {
            self.close(line.index);
            return;
        }

        if let Some(slot) = self.layout.parse_slot(text) {
            match self.open.as_mut() {
                Some(open) => {
                    if open.anchor_at_first_slot.is_none() {
                        open.anchor_at_first_slot = Some(self.cursor.take());
                    }
                    open.slots.push(ExistingSlot {
                        field: slot.field,
                        line: line.index,
                        token: slot.range,
                        filled: slot.filled,
                    });
                    open.last_field_line = Some(line.index);
                }
                None => {
                    let field = self.layout.slots()[slot.field].name.clone();
                    self.pending.push_back(ScanEvent::Warning(ScanWarning::OrphanSlot {
                        line_no: line.number(),
                        field,
                    }));
                }
            }
            return;
        }

        if self.layout.is_anchor(text) {
            self.cursor = Some(AnchorValue {
                line: line.index,
                value: text.trim().to_string(),
            });
        }

        if let Some(open) = self.open.as_mut() {
            if !line.is_blank() && !self.layout.is_comment_only(text) {
                open.last_field_line = Some(line.index);
            }
        }
    }

    fn close(&mut self, end_line: usize) {
        let Some(open) = self.open.take() else {
            return;
        };
        let adjacent_anchor = match open.anchor_at_first_slot {
            Some(anchor) => anchor,
            None => self.cursor.take(),
        };
        self.cursor = None;
        self.closed += 1;
        self.pending.push_back(ScanEvent::Record(ScannedRecord {
            ordinal: self.closed,
            start_line: open.start_line,
            end_line,
            declared_name: open.declared_name,
            adjacent_anchor,
            slots: open.slots,
            last_field_line: open.last_field_line,
        }));
    }
}

impl Iterator for RecordScanner<'_, '_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.done {
                return None;
            }
            match self.lines.next() {
                Some(line) => self.step(line),
                None => {
                    self.done = true;
                    if let Some(open) = self.open.take() {
                        self.pending.push_back(ScanEvent::Warning(ScanWarning::UnclosedAtEof {
                            start_line_no: open.start_line + 1,
                        }));
                    }
                }
            }
        }
    }
}
