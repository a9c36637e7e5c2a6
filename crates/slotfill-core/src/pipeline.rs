//! Pipeline driver: scan → resolve → rewrite → render.
//!
//! A run owns the input buffer for its duration and renders the output once,
//! after every record has been planned. Only input and configuration
//! problems fail a run; per-record outcomes go to the [`EnrichReport`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arena::LineArena;
use crate::digest::text_digest;
use crate::error::{EnrichError, Result};
use crate::layout::{CompiledLayout, RecordLayout};
use crate::patch::{Patch, PatchSet};
use crate::report::{EnrichReport, IssueKind, RecordIssue};
use crate::resolve::Resolver;
use crate::rewrite::{placeholder_bundle, render_bundle, rewrite_record};
use crate::scan::{RecordScanner, ScanEvent, ScannedRecord};
use crate::strategy::AnchorStrategy;
use crate::table::{LookupTable, MatchPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Resolve anchors and write values into slots.
    #[default]
    Enrich,
    /// Insert sentinel placeholders into anchored records that have no slots.
    Scaffold,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Enrich => "enrich",
            Mode::Scaffold => "scaffold",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOutput {
    pub text: String,
    pub report: EnrichReport,
}

/// Read the operator's input file. Empty input is an error so that nothing
/// is ever written back over a truncated file.
pub fn read_input(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|source| EnrichError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Err(EnrichError::EmptyInput);
    }
    Ok(text)
}

/// One enrichment pass with the default (line-adjacency) strategy.
pub fn run(text: &str, table: &LookupTable, layout: &RecordLayout) -> Result<(String, EnrichReport)> {
    let output = Pipeline::new(layout, table.clone())?.run(text)?;
    Ok((output.text, output.report))
}

/// What one record contributes, committed only if its patches fit.
#[derive(Default)]
struct RecordPlan {
    patches: Vec<Patch>,
    repaired: usize,
    written: usize,
    skipped: usize,
    placeholders: usize,
    resolved: bool,
    derived: bool,
    unmatched: bool,
    issue: Option<IssueKind>,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    layout: CompiledLayout,
    table: LookupTable,
    strategy: AnchorStrategy,
    policy: Option<MatchPolicy>,
    repair_separators: bool,
    mode: Mode,
}

impl Pipeline {
    pub fn new(layout: &RecordLayout, table: LookupTable) -> Result<Self> {
        let layout = layout.compile()?;
        table.validate()?;
        Ok(Self {
            layout,
            table,
            strategy: AnchorStrategy::default(),
            policy: None,
            repair_separators: false,
            mode: Mode::default(),
        })
    }

    pub fn with_strategy(mut self, strategy: AnchorStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_separator_repair(mut self, enabled: bool) -> Self {
        self.repair_separators = enabled;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn strategy(&self) -> AnchorStrategy {
        self.strategy
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy.unwrap_or_else(|| self.strategy.default_policy())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn layout(&self) -> &CompiledLayout {
        &self.layout
    }

    pub fn table(&self) -> &LookupTable {
        &self.table
    }

    /// Scan without planning any edit.
    pub fn scan<'a>(&self, arena: &'a LineArena<'a>) -> RecordScanner<'a, '_> {
        RecordScanner::new(arena, &self.layout)
    }

    pub fn run(&self, text: &str) -> Result<EnrichOutput> {
        if text.trim().is_empty() {
            return Err(EnrichError::EmptyInput);
        }

        let policy = self.policy();
        let resolver = Resolver::new(&self.table, policy)?;
        let arena = LineArena::new(text);

        let mut report = EnrichReport {
            mode: self.mode,
            strategy: self.strategy,
            policy,
            input_digest: text_digest(text),
            hazards: self.table.specificity_hazards(policy),
            ..EnrichReport::default()
        };
        for hazard in &report.hazards {
            warn!(
                earlier = %hazard.earlier,
                later = %hazard.later,
                policy = %policy,
                "lookup pattern shadows a more specific one"
            );
        }

        let mut patches = PatchSet::new();
        for event in RecordScanner::new(&arena, &self.layout) {
            match event {
                ScanEvent::Warning(warning) => {
                    warn!(%warning, "structural anomaly");
                    report.warnings.push(warning);
                }
                ScanEvent::Record(record) => {
                    report.records_scanned += 1;
                    let plan = self.plan_record(&arena, &resolver, &record);
                    commit(plan, &record, self.strategy.anchor_for(&record), &mut patches, &mut report);
                }
            }
        }

        let rendered = patches.apply(&arena);
        report.remaining_sentinels = self.count_sentinels(&rendered);
        report.output_digest = text_digest(&rendered);
        info!(
            mode = %self.mode,
            strategy = %self.strategy,
            summary = %report.summary_line(),
            "run complete"
        );

        Ok(EnrichOutput {
            text: rendered,
            report,
        })
    }

    fn plan_record(
        &self,
        arena: &LineArena<'_>,
        resolver: &Resolver<'_>,
        record: &ScannedRecord,
    ) -> RecordPlan {
        let mut plan = self.plan_values(arena, resolver, record);
        // Records that receive nothing stay byte-identical, repairs included.
        if self.repair_separators && (plan.written > 0 || plan.placeholders > 0) {
            let repairs = self.separator_repairs(arena, record);
            plan.repaired = repairs.len();
            plan.patches.extend(repairs);
        }
        plan
    }

    fn plan_values(
        &self,
        arena: &LineArena<'_>,
        resolver: &Resolver<'_>,
        record: &ScannedRecord,
    ) -> RecordPlan {
        let mut plan = RecordPlan::default();
        let anchor = self.strategy.anchor_for(record);
        let Some(anchor) = anchor.as_deref() else {
            debug!(ordinal = record.ordinal, "record has no anchor");
            plan.issue = Some(IssueKind::NoAnchor);
            return plan;
        };

        if !record.slots.is_empty() && !record.has_open_slot() {
            plan.skipped = record.slots.len();
            plan.issue = Some(IssueKind::Skipped);
            return plan;
        }

        match self.mode {
            Mode::Scaffold => {
                if !record.slots.is_empty() {
                    // Partially scaffolded by hand; placeholders already exist.
                    return plan;
                }
                let rw = rewrite_record(arena, &self.layout, record, &placeholder_bundle(&self.layout));
                plan.placeholders = rw.inserted;
                plan.patches.extend(rw.patches);
            }
            Mode::Enrich => {
                let Some(resolution) = resolver.resolve(anchor) else {
                    debug!(ordinal = record.ordinal, anchor, "no lookup entry matched");
                    plan.unmatched = true;
                    plan.issue = Some(IssueKind::Unmatched);
                    return plan;
                };
                let literals = render_bundle(&self.layout, &resolution.values);
                let rw = rewrite_record(arena, &self.layout, record, &literals);
                debug!(
                    ordinal = record.ordinal,
                    anchor,
                    source = ?resolution.source,
                    written = rw.written,
                    skipped = rw.skipped,
                    "record planned"
                );
                plan.skipped = rw.skipped;
                if rw.written == 0 {
                    // The bundle has no value for any open slot.
                    plan.unmatched = true;
                    plan.issue = Some(IssueKind::Unmatched);
                    return plan;
                }
                plan.resolved = true;
                plan.derived = resolution.is_derived();
                plan.written = rw.written;
                plan.patches.extend(rw.patches);
            }
        }
        plan
    }

    /// Missing separators between a literal-ending field line and a
    /// following literal line inside the record.
    fn separator_repairs(&self, arena: &LineArena<'_>, record: &ScannedRecord) -> Vec<Patch> {
        let fields: Vec<_> = arena.lines()[record.start_line + 1..record.end_line]
            .iter()
            .filter(|l| !l.is_blank() && !self.layout.is_comment_only(l.text))
            .collect();

        let mut repairs = Vec::new();
        for pair in fields.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            let (code_end, has_separator) = self.layout.code_end(current.text);
            if has_separator || !current.text[..code_end].ends_with('"') {
                continue;
            }
            let (next_code, _) = self.layout.split_comment(next.text);
            if next_code.trim_start().starts_with('"') {
                repairs.push(Patch::AppendSeparator {
                    line: current.index,
                    at: code_end,
                    text: self.layout.separator().to_string(),
                });
            }
        }
        repairs
    }

    fn count_sentinels(&self, text: &str) -> usize {
        let arena = LineArena::new(text);
        RecordScanner::new(&arena, &self.layout)
            .filter_map(|e| match e {
                ScanEvent::Record(r) => Some(r.slots.iter().filter(|s| !s.filled).count()),
                ScanEvent::Warning(_) => None,
            })
            .sum()
    }
}

fn commit(
    plan: RecordPlan,
    record: &ScannedRecord,
    anchor: Option<String>,
    patches: &mut PatchSet,
    report: &mut EnrichReport,
) {
    let issue = |kind: IssueKind| RecordIssue {
        kind,
        ordinal: record.ordinal,
        line_no: record.start_line + 1,
        anchor: anchor.clone(),
        name: record.declared_name.clone(),
    };

    if let Err(err) = patches.extend_atomic(plan.patches) {
        warn!(ordinal = record.ordinal, error = %err, "record left untouched");
        report.issues.push(issue(IssueKind::Conflict));
        return;
    }

    report.separators_repaired += plan.repaired;
    report.slots_written += plan.written;
    report.slots_skipped += plan.skipped;
    report.placeholders_inserted += plan.placeholders;
    if plan.resolved {
        report.anchors_resolved += 1;
    }
    if plan.derived {
        report.anchors_derived += 1;
    }
    if plan.unmatched {
        report.unmatched += 1;
    }
    if let Some(kind) = plan.issue {
        report.issues.push(issue(kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SlotField;

    fn layout() -> RecordLayout {
        RecordLayout {
            record_start: r"new\s+Item\s*\(".to_string(),
            record_end: r"^\s*\)\s*\)\s*;\s*$".to_string(),
            declared_name: r#"new\s+Item\s*\(\s*[^,]*,\s*"([^"]*)""#.to_string(),
            anchor_markers: vec!["cdn.example".to_string()],
            comment_prefix: "//".to_string(),
            separator: ",".to_string(),
            slots: vec![SlotField::quoted("link", "\"\""), SlotField::bare("score", "0.0")],
        }
    }

    fn table() -> LookupTable {
        let mut table = LookupTable::new();
        table
            .push("/1145360/", ["https://store.example/app/1145360/Hades/", "4.9"])
            .push("/413150/", ["https://store.example/app/413150/Stardew_Valley/"]);
        table
    }

    const TWO_RECORDS: &str = r#"    void load() {
        items.add(new Item(id++, "Hades", 20,
            "https://cdn.example/apps/1145360/header.jpg"
        ));

        items.add(new Item(id++, "Mystery", 20,
            "https://cdn.example/apps/999/header.jpg",
            "", // link
            0.0 // score
        ));
    }
"#;

    #[test]
    fn enriches_and_reports() {
        let pipeline = Pipeline::new(&layout(), table()).expect("pipeline");
        let out = pipeline.run(TWO_RECORDS).expect("run");
        let r = &out.report;
        assert_eq!(r.records_scanned, 2);
        assert_eq!(r.anchors_resolved, 1);
        assert_eq!(r.slots_written, 2);
        assert_eq!(r.unmatched, 1);
        assert_eq!(r.remaining_sentinels, 2);
        assert!(!r.unchanged());

        let unmatched: Vec<_> = r.issues_of(IssueKind::Unmatched).collect();
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].name.as_deref(), Some("Mystery"));
        assert_eq!(unmatched[0].line_no, 6);

        assert!(out.text.contains(
            "            \"https://cdn.example/apps/1145360/header.jpg\",\n            \"https://store.example/app/1145360/Hades/\", // link\n            4.9 // score\n        ));"
        ));
    }

    #[test]
    fn second_run_is_noop() {
        let pipeline = Pipeline::new(&layout(), table()).expect("pipeline");
        let first = pipeline.run(TWO_RECORDS).expect("first");
        let second = pipeline.run(&first.text).expect("second");
        assert_eq!(second.text, first.text);
        assert!(second.report.unchanged());
        assert_eq!(second.report.slots_written, 0);
        assert_eq!(second.report.slots_skipped, 2);
    }

    #[test]
    fn scaffold_then_enrich_by_name() {
        let scaffold = Pipeline::new(&layout(), LookupTable::new())
            .expect("pipeline")
            .with_mode(Mode::Scaffold);
        let scaffolded = scaffold.run(TWO_RECORDS).expect("scaffold");
        assert_eq!(scaffolded.report.placeholders_inserted, 2);
        assert_eq!(scaffolded.report.remaining_sentinels, 4);
        assert!(scaffolded
            .text
            .contains("            \"\", // link\n            0.0 // score\n        ));"));

        let mut by_name = LookupTable::new();
        by_name.push("Hades", ["https://store.example/hades/", "4.9"]);
        let enrich = Pipeline::new(&layout(), by_name)
            .expect("pipeline")
            .with_strategy(AnchorStrategy::DeclaredName);
        assert_eq!(enrich.policy(), MatchPolicy::ExactToken);
        let out = enrich.run(&scaffolded.text).expect("enrich");
        assert_eq!(out.report.slots_written, 2);
        assert_eq!(out.report.remaining_sentinels, 2);
    }

    #[test]
    fn no_anchor_record_is_untouched() {
        let text = "new Item(1, \"A\",\n  \"plain\",\n  \"\", // link\n));\n";
        let pipeline = Pipeline::new(&layout(), table()).expect("pipeline");
        let out = pipeline.run(text).expect("run");
        assert_eq!(out.text, text);
        assert_eq!(out.report.issues_of(IssueKind::NoAnchor).count(), 1);
    }

    #[test]
    fn separator_repair_is_opt_in() {
        let text = "new Item(1, \"A\",\n  \"https://cdn.example/apps/413150/a.jpg\"\n  \"\", // link\n));\n";
        let plain = Pipeline::new(&layout(), table()).expect("pipeline");
        let out = plain.run(text).expect("run");
        assert_eq!(out.report.separators_repaired, 0);
        assert!(out.text.contains("a.jpg\"\n"));

        let repairing = plain.with_separator_repair(true);
        let out = repairing.run(text).expect("run");
        assert_eq!(out.report.separators_repaired, 1);
        assert_eq!(
            out.text,
            "new Item(1, \"A\",\n  \"https://cdn.example/apps/413150/a.jpg\",\n  \"https://store.example/app/413150/Stardew_Valley/\", // link\n));\n"
        );
    }

    #[test]
    fn separator_repair_leaves_unresolved_records_alone() {
        let text = "new Item(1, \"A\",\n  \"https://cdn.example/apps/999/a.jpg\"\n  \"\", // link\n));\nnew Item(2, \"B\",\n  \"plain\"\n  \"\", // link\n));\n";
        let pipeline = Pipeline::new(&layout(), table())
            .expect("pipeline")
            .with_separator_repair(true);
        let out = pipeline.run(text).expect("run");
        assert_eq!(out.text, text);
        assert_eq!(out.report.separators_repaired, 0);
        assert_eq!(out.report.unmatched, 1);
        assert_eq!(out.report.issues_of(IssueKind::NoAnchor).count(), 1);
    }

    #[test]
    fn empty_input_is_fatal() {
        let pipeline = Pipeline::new(&layout(), table()).expect("pipeline");
        assert!(matches!(pipeline.run("  \n\n"), Err(EnrichError::EmptyInput)));
    }

    #[test]
    fn convenience_run_matches_pipeline() {
        let (text, report) = run(TWO_RECORDS, &table(), &layout()).expect("run");
        assert_eq!(report.slots_written, 2);
        assert!(text.contains("4.9 // score"));
    }
}
