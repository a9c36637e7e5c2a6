//! Position-tagged edits over a [`LineArena`].
//!
//! Edits are collected first and rendered in a single ordered walk over the
//! arena. A [`PatchSet`] refuses an edit that overlaps one it already holds,
//! so two rewrites can never interleave inside the same bytes.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::arena::LineArena;
use crate::error::{EnrichError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Replace `range` (bytes within the line) with `text`.
    ReplaceToken {
        line: usize,
        range: Range<usize>,
        text: String,
    },
    /// Insert `text` at byte offset `at` within the line.
    AppendSeparator { line: usize, at: usize, text: String },
    /// Insert whole lines immediately before `line`.
    InsertBefore { line: usize, lines: Vec<String> },
}

impl Patch {
    pub fn line(&self) -> usize {
        match self {
            Patch::ReplaceToken { line, .. }
            | Patch::AppendSeparator { line, .. }
            | Patch::InsertBefore { line, .. } => *line,
        }
    }

    fn conflicts_with(&self, other: &Patch) -> bool {
        if self.line() != other.line() {
            return false;
        }
        match (self, other) {
            (Patch::InsertBefore { .. }, Patch::InsertBefore { .. }) => true,
            (Patch::InsertBefore { .. }, _) | (_, Patch::InsertBefore { .. }) => false,
            (Patch::ReplaceToken { range: a, .. }, Patch::ReplaceToken { range: b, .. }) => {
                a.start < b.end && b.start < a.end
            }
            (Patch::ReplaceToken { range, .. }, Patch::AppendSeparator { at, .. })
            | (Patch::AppendSeparator { at, .. }, Patch::ReplaceToken { range, .. }) => {
                range.start < *at && *at < range.end
            }
            (Patch::AppendSeparator { at: a, .. }, Patch::AppendSeparator { at: b, .. }) => a == b,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    by_line: BTreeMap<usize, Vec<Patch>>,
    count: usize,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.by_line.values().flatten()
    }

    pub fn push(&mut self, patch: Patch) -> Result<()> {
        self.extend_atomic(vec![patch])
    }

    /// Add all patches or none of them.
    pub fn extend_atomic(&mut self, patches: Vec<Patch>) -> Result<()> {
        for (i, patch) in patches.iter().enumerate() {
            let clashes_existing = self
                .by_line
                .get(&patch.line())
                .is_some_and(|held| held.iter().any(|p| p.conflicts_with(patch)));
            let clashes_batch = patches[..i].iter().any(|p| p.conflicts_with(patch));
            if clashes_existing || clashes_batch {
                return Err(EnrichError::PatchConflict {
                    line_no: patch.line() + 1,
                });
            }
        }
        for patch in patches {
            self.by_line.entry(patch.line()).or_default().push(patch);
            self.count += 1;
        }
        Ok(())
    }

    /// Render the arena with every patch applied.
    pub fn apply(&self, arena: &LineArena<'_>) -> String {
        let fallback_terminator = arena.default_terminator();
        let mut out = String::new();

        for line in arena.lines() {
            let Some(patches) = self.by_line.get(&line.index) else {
                out.push_str(line.text);
                out.push_str(line.terminator);
                continue;
            };

            for patch in patches {
                if let Patch::InsertBefore { lines, .. } = patch {
                    for inserted in lines {
                        out.push_str(inserted);
                        out.push_str(fallback_terminator);
                    }
                }
            }

            let mut edits: Vec<(Range<usize>, &str)> = patches
                .iter()
                .filter_map(|p| match p {
                    Patch::ReplaceToken { range, text, .. } => Some((range.clone(), text.as_str())),
                    Patch::AppendSeparator { at, text, .. } => Some((*at..*at, text.as_str())),
                    Patch::InsertBefore { .. } => None,
                })
                .collect();
            edits.sort_by_key(|(r, _)| (r.start, r.end));

            let mut cursor = 0usize;
            for (range, text) in edits {
                out.push_str(&line.text[cursor..range.start]);
                out.push_str(text);
                cursor = range.end;
            }
            out.push_str(&line.text[cursor..]);
            out.push_str(line.terminator);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_renders_source() {
        let src = "a\r\nb\nc";
        let arena = LineArena::new(src);
        assert_eq!(PatchSet::new().apply(&arena), src);
    }

    #[test]
    fn applies_in_position_order() {
        let src = "  x\n  \"\" // slot\n));";
        let arena = LineArena::new(src);
        let mut set = PatchSet::new();
        set.push(Patch::InsertBefore {
            line: 2,
            lines: vec!["  \"new\" // other".to_string()],
        })
        .expect("insert");
        set.push(Patch::ReplaceToken {
            line: 1,
            range: 2..4,
            text: "\"v\"".to_string(),
        })
        .expect("replace");
        set.push(Patch::AppendSeparator {
            line: 1,
            at: 4,
            text: ",".to_string(),
        })
        .expect("append");
        assert_eq!(
            set.apply(&arena),
            "  x\n  \"v\", // slot\n  \"new\" // other\n));"
        );
    }

    #[test]
    fn rejects_overlaps_atomically() {
        let mut set = PatchSet::new();
        set.push(Patch::ReplaceToken {
            line: 0,
            range: 2..6,
            text: "a".to_string(),
        })
        .expect("first");

        let err = set
            .extend_atomic(vec![
                Patch::ReplaceToken {
                    line: 3,
                    range: 0..1,
                    text: "ok".to_string(),
                },
                Patch::ReplaceToken {
                    line: 0,
                    range: 5..8,
                    text: "b".to_string(),
                },
            ])
            .unwrap_err();
        assert!(matches!(err, EnrichError::PatchConflict { line_no: 1 }));
        assert_eq!(set.len(), 1);

        assert!(set
            .push(Patch::InsertBefore {
                line: 0,
                lines: vec![]
            })
            .is_ok());
        assert!(set
            .push(Patch::InsertBefore {
                line: 0,
                lines: vec![]
            })
            .is_err());
    }

    #[test]
    fn apply_leaves_unpatched_lines_verbatim() {
        let arena = LineArena::new("a\r\nb\nc");
        let mut set = PatchSet::new();
        set.push(Patch::ReplaceToken {
            line: 1,
            range: 0..1,
            text: "B".to_string(),
        })
        .expect("replace");
        assert_eq!(set.apply(&arena), "a\r\nB\nc");
    }
}
