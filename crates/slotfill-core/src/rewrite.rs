//! Slot locator and rewriter.
//!
//! Turns a scanned record plus a bundle of literals into patches confined to
//! the record's lines:
//!
//! - existing slots: only the sentinel literal is replaced; indentation,
//!   separator and marker comment stay byte-for-byte,
//! - no slots yet: one line per bundle value is inserted right before the
//!   terminal, indented like the preceding field line and tagged with the
//!   field's marker comment so the next run finds it filled.

use crate::arena::LineArena;
use crate::layout::CompiledLayout;
use crate::patch::Patch;
use crate::scan::ScannedRecord;

/// Patches and slot counts for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordRewrite {
    pub patches: Vec<Patch>,
    /// Sentinel slots replaced with a value.
    pub written: usize,
    /// Slots left alone because they already hold a value.
    pub skipped: usize,
    /// Lines synthesized before the terminal.
    pub inserted: usize,
}

/// Render raw bundle values as literals, one per slot field, in field order.
/// Values past the last field are dropped.
pub fn render_bundle(layout: &CompiledLayout, values: &[String]) -> Vec<String> {
    layout
        .slots()
        .iter()
        .zip(values)
        .map(|(field, value)| field.render(value))
        .collect()
}

/// Sentinel literals for every slot field.
pub fn placeholder_bundle(layout: &CompiledLayout) -> Vec<String> {
    layout.slots().iter().map(|f| f.sentinel.clone()).collect()
}

/// Rewrite one record with already-rendered literals.
pub fn rewrite_record(
    arena: &LineArena<'_>,
    layout: &CompiledLayout,
    record: &ScannedRecord,
    literals: &[String],
) -> RecordRewrite {
    if record.slots.is_empty() {
        insert_before_terminal(arena, layout, record, literals)
    } else {
        fill_existing(record, literals)
    }
}

fn fill_existing(record: &ScannedRecord, literals: &[String]) -> RecordRewrite {
    let mut out = RecordRewrite::default();
    for slot in &record.slots {
        if slot.filled {
            out.skipped += 1;
            continue;
        }
        let Some(literal) = literals.get(slot.field) else {
            continue;
        };
        out.patches.push(Patch::ReplaceToken {
            line: slot.line,
            range: slot.token.clone(),
            text: literal.clone(),
        });
        out.written += 1;
    }
    out
}

fn insert_before_terminal(
    arena: &LineArena<'_>,
    layout: &CompiledLayout,
    record: &ScannedRecord,
    literals: &[String],
) -> RecordRewrite {
    let mut out = RecordRewrite::default();
    if literals.is_empty() {
        return out;
    }

    let separator = layout.separator();
    let previous = record.last_field_line.and_then(|i| arena.line(i));
    let indent = match previous {
        Some(line) => line.indent().to_string(),
        None => arena
            .line(record.end_line)
            .map(|l| format!("{}    ", l.indent()))
            .unwrap_or_default(),
    };

    if let Some(line) = previous {
        let (code_end, has_separator) = layout.code_end(line.text);
        let opens_list = line.text[..code_end].ends_with('(');
        if !has_separator && !opens_list {
            out.patches.push(Patch::AppendSeparator {
                line: line.index,
                at: code_end,
                text: separator.to_string(),
            });
        }
    }

    let last = literals.len().min(layout.slots().len());
    let lines: Vec<String> = layout
        .slots()
        .iter()
        .zip(literals)
        .enumerate()
        .map(|(i, (field, literal))| {
            let sep = if i + 1 < last { separator } else { "" };
            format!(
                "{indent}{literal}{sep} {} {}",
                layout.comment_prefix(),
                field.name
            )
        })
        .collect();

    out.written = lines.len();
    out.inserted = lines.len();
    out.patches.push(Patch::InsertBefore {
        line: record.end_line,
        lines,
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{RecordLayout, SlotField};
    use crate::patch::PatchSet;
    use crate::scan::{RecordScanner, ScanEvent};

    fn layout() -> CompiledLayout {
        RecordLayout {
            record_start: r"new\s+Item\s*\(".to_string(),
            record_end: r"^\s*\)\s*\)\s*;\s*$".to_string(),
            declared_name: r#"new\s+Item\s*\(\s*[^,]*,\s*"([^"]*)""#.to_string(),
            anchor_markers: vec!["cdn.example".to_string()],
            comment_prefix: "//".to_string(),
            separator: ",".to_string(),
            slots: vec![SlotField::quoted("link", "\"\""), SlotField::bare("score", "0.0")],
        }
        .compile()
        .expect("layout compiles")
    }

    fn first_record(arena: &LineArena<'_>, layout: &CompiledLayout) -> ScannedRecord {
        RecordScanner::new(arena, layout)
            .find_map(|e| match e {
                ScanEvent::Record(r) => Some(r),
                ScanEvent::Warning(_) => None,
            })
            .expect("record")
    }

    fn apply(arena: &LineArena<'_>, rewrite: &RecordRewrite) -> String {
        let mut set = PatchSet::new();
        set.extend_atomic(rewrite.patches.clone()).expect("no conflicts");
        set.apply(arena)
    }

    #[test]
    fn fills_sentinel_and_keeps_comment() {
        let layout = layout();
        let text = "    items.add(new Item(id++, \"A\",\n        \"https://cdn.example/1/a.jpg\",\n        \"\", // link\n    ));\n";
        let arena = LineArena::new(text);
        let record = first_record(&arena, &layout);

        let literals = render_bundle(&layout, &["https://store/1/".to_string()]);
        let rw = rewrite_record(&arena, &layout, &record, &literals);
        assert_eq!((rw.written, rw.skipped, rw.inserted), (1, 0, 0));
        assert_eq!(
            apply(&arena, &rw),
            "    items.add(new Item(id++, \"A\",\n        \"https://cdn.example/1/a.jpg\",\n        \"https://store/1/\", // link\n    ));\n"
        );
    }

    #[test]
    fn filled_slot_is_skipped() {
        let layout = layout();
        let text = "new Item(1, \"A\",\n  \"https://cdn.example/a.jpg\",\n  \"https://old/\", // link\n));\n";
        let arena = LineArena::new(text);
        let record = first_record(&arena, &layout);
        let rw = rewrite_record(&arena, &layout, &record, &["\"https://new/\"".to_string()]);
        assert!(rw.patches.is_empty());
        assert_eq!((rw.written, rw.skipped), (0, 1));
    }

    #[test]
    fn inserts_bundle_before_terminal_with_separator_repair() {
        let layout = layout();
        let text = "        items.add(new Item(id++, \"A\", 1,\n            \"https://cdn.example/1/a.jpg\"\n        ));\n";
        let arena = LineArena::new(text);
        let record = first_record(&arena, &layout);

        let literals = render_bundle(&layout, &["https://store/1/".to_string(), "4.5".to_string()]);
        let rw = rewrite_record(&arena, &layout, &record, &literals);
        assert_eq!((rw.written, rw.inserted), (2, 2));
        assert_eq!(
            apply(&arena, &rw),
            "        items.add(new Item(id++, \"A\", 1,\n            \"https://cdn.example/1/a.jpg\",\n            \"https://store/1/\", // link\n            4.5 // score\n        ));\n"
        );
    }

    #[test]
    fn insertion_keeps_existing_separator_and_comment() {
        let layout = layout();
        let text = "new Item(1, \"A\",\n  \"https://cdn.example/a.jpg\", // image\n));";
        let arena = LineArena::new(text);
        let record = first_record(&arena, &layout);
        let rw = rewrite_record(&arena, &layout, &record, &["\"u\"".to_string()]);
        assert_eq!(
            apply(&arena, &rw),
            "new Item(1, \"A\",\n  \"https://cdn.example/a.jpg\", // image\n  \"u\" // link\n));"
        );
    }

    #[test]
    fn missing_separator_goes_before_trailing_comment() {
        let layout = layout();
        let text = "new Item(1, \"A\",\n  \"https://cdn.example/a.jpg\"  // image\n));\n";
        let arena = LineArena::new(text);
        let record = first_record(&arena, &layout);
        let rw = rewrite_record(&arena, &layout, &record, &["\"u\"".to_string()]);
        assert_eq!(
            apply(&arena, &rw),
            "new Item(1, \"A\",\n  \"https://cdn.example/a.jpg\",  // image\n  \"u\" // link\n));\n"
        );
    }

    #[test]
    fn placeholder_bundle_uses_sentinels() {
        assert_eq!(
            placeholder_bundle(&layout()),
            vec!["\"\"".to_string(), "0.0".to_string()]
        );
    }
}
