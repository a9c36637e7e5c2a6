use proptest::prelude::*;
use slotfill_core::{IssueKind, LookupTable, Pipeline, RecordLayout, SlotField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Open,
    Filled,
    Absent,
}

#[derive(Debug, Clone)]
struct GenRecord {
    app_id: u32,
    state: SlotState,
    anchor_comma: bool,
    indent: usize,
}

/// Ids below this bound are in the table; the rest never resolve.
const KNOWN_BELOW: u32 = 110;

fn layout() -> RecordLayout {
    RecordLayout {
        record_start: r"new\s+Game\s*\(".to_string(),
        record_end: r"^\s*\)\s*\)\s*;\s*$".to_string(),
        declared_name: r#"new\s+Game\s*\(\s*[^,]*,\s*"([^"]*)""#.to_string(),
        anchor_markers: vec!["cloudflare.steamstatic.com".to_string()],
        comment_prefix: "//".to_string(),
        separator: ",".to_string(),
        slots: vec![
            SlotField::quoted("storeUrl", "\"\""),
            SlotField::bare("userRating", "0.0"),
        ],
    }
}

fn table() -> LookupTable {
    let mut table = LookupTable::new();
    for id in 100..KNOWN_BELOW {
        table.push(
            &format!("/{id}/"),
            [format!("https://store.example/app/{id}/"), "4.5".to_string()],
        );
    }
    table
}

fn gen_record() -> impl Strategy<Value = GenRecord> {
    (
        100u32..120,
        prop_oneof![
            Just(SlotState::Open),
            Just(SlotState::Filled),
            Just(SlotState::Absent)
        ],
        any::<bool>(),
        prop_oneof![Just(4usize), Just(8usize)],
    )
        .prop_map(|(app_id, state, anchor_comma, indent)| GenRecord {
            app_id,
            state,
            anchor_comma,
            indent,
        })
}

fn block(index: usize, r: &GenRecord) -> String {
    let pad = " ".repeat(r.indent);
    let inner = " ".repeat(r.indent + 4);
    let comma = if r.anchor_comma || r.state != SlotState::Absent {
        ","
    } else {
        ""
    };
    let mut s = format!("{pad}games.add(new Game(id++, \"Game {index}\", 10, 20,\n");
    s.push_str(&format!("{inner}\"Genre\",\n"));
    s.push_str(&format!(
        "{inner}\"https://cdn.cloudflare.steamstatic.com/steam/apps/{}/header.jpg\"{comma}\n",
        r.app_id
    ));
    match r.state {
        SlotState::Open => s.push_str(&format!("{inner}\"\", // storeUrl\n")),
        SlotState::Filled => s.push_str(&format!(
            "{inner}\"https://old.example/{}/\", // storeUrl\n",
            r.app_id
        )),
        SlotState::Absent => {}
    }
    s.push_str(&format!("{pad}));\n"));
    s
}

fn document(records: &[GenRecord]) -> (String, Vec<String>) {
    let blocks: Vec<String> = records.iter().enumerate().map(|(i, r)| block(i, r)).collect();
    let mut text = String::from("class GameController {\n    void load() {\n");
    for b in &blocks {
        text.push_str(b);
        text.push('\n');
    }
    text.push_str("    }\n}\n");
    (text, blocks)
}

fn record_heads(text: &str) -> Vec<&str> {
    text.lines().filter(|l| l.contains("new Game(")).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn second_run_writes_nothing(records in proptest::collection::vec(gen_record(), 1..12)) {
        let (text, _) = document(&records);
        let pipeline = Pipeline::new(&layout(), table()).expect("pipeline");
        let first = pipeline.run(&text).expect("first");
        let second = pipeline.run(&first.text).expect("second");
        prop_assert_eq!(&second.text, &first.text);
        prop_assert_eq!(second.report.slots_written, 0);
        prop_assert!(second.report.unchanged());
    }

    #[test]
    fn unresolved_records_are_byte_identical(records in proptest::collection::vec(gen_record(), 1..12)) {
        let (text, blocks) = document(&records);
        let out = Pipeline::new(&layout(), table()).expect("pipeline").run(&text).expect("run");
        for (r, b) in records.iter().zip(&blocks) {
            if r.app_id >= KNOWN_BELOW || r.state == SlotState::Filled {
                prop_assert!(out.text.contains(b.as_str()), "record changed:\n{}", b);
            }
        }
    }

    #[test]
    fn records_keep_their_order(records in proptest::collection::vec(gen_record(), 1..12)) {
        let (text, _) = document(&records);
        let out = Pipeline::new(&layout(), table()).expect("pipeline").run(&text).expect("run");
        prop_assert_eq!(record_heads(&out.text), record_heads(&text));
        prop_assert_eq!(
            out.text.lines().filter(|l| l.trim() == "));").count(),
            records.len()
        );
        prop_assert_eq!(out.report.records_scanned, records.len());
    }

    #[test]
    fn counts_add_up(records in proptest::collection::vec(gen_record(), 1..12)) {
        let (text, _) = document(&records);
        let out = Pipeline::new(&layout(), table()).expect("pipeline").run(&text).expect("run");
        let known = |r: &&GenRecord| r.app_id < KNOWN_BELOW;
        let open_known = records.iter().filter(known).filter(|r| r.state == SlotState::Open).count();
        let absent_known = records.iter().filter(known).filter(|r| r.state == SlotState::Absent).count();
        let unmatched = records
            .iter()
            .filter(|r| r.app_id >= KNOWN_BELOW && r.state != SlotState::Filled)
            .count();
        prop_assert_eq!(out.report.slots_written, open_known + 2 * absent_known);
        prop_assert_eq!(out.report.unmatched, unmatched);

        let r = &out.report;
        let accounted = r.anchors_resolved
            + r.unmatched
            + r.issues_of(IssueKind::NoAnchor).count()
            + r.issues_of(IssueKind::Skipped).count();
        prop_assert_eq!(accounted, r.records_scanned);
    }
}
