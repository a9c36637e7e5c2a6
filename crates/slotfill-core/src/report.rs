//! Per-run report.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::Mode;
use crate::scan::ScanWarning;
use crate::strategy::AnchorStrategy;
use crate::table::{MatchPolicy, SpecificityHazard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// No lookup entry matched the anchor; slot left at its sentinel.
    Unmatched,
    /// Every slot already held a value.
    Skipped,
    /// The record closed without an anchor for the selected strategy.
    NoAnchor,
    /// The record's edits overlapped edits already planned.
    Conflict,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Unmatched => "unmatched",
            IssueKind::Skipped => "skipped",
            IssueKind::NoAnchor => "no anchor",
            IssueKind::Conflict => "conflict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIssue {
    pub kind: IssueKind,
    pub ordinal: usize,
    /// 1-based line of the record start.
    pub line_no: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} (line {})", self.kind.as_str(), self.ordinal, self.line_no)?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        if let Some(anchor) = &self.anchor {
            write!(f, " anchor={anchor}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichReport {
    pub mode: Mode,
    pub strategy: AnchorStrategy,
    pub policy: MatchPolicy,
    pub records_scanned: usize,
    pub anchors_resolved: usize,
    /// Subset of `anchors_resolved` produced by the fallback rule.
    pub anchors_derived: usize,
    pub slots_written: usize,
    pub slots_skipped: usize,
    pub placeholders_inserted: usize,
    pub separators_repaired: usize,
    pub unmatched: usize,
    /// Sentinel slots still present in the output.
    pub remaining_sentinels: usize,
    pub warnings: Vec<ScanWarning>,
    pub hazards: Vec<SpecificityHazard>,
    pub issues: Vec<RecordIssue>,
    pub input_digest: String,
    pub output_digest: String,
}

impl EnrichReport {
    pub fn unchanged(&self) -> bool {
        self.input_digest == self.output_digest
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &RecordIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    pub fn summary_line(&self) -> String {
        format!(
            "scanned={} resolved={} written={} skipped={} unmatched={} warnings={}",
            self.records_scanned,
            self.anchors_resolved,
            self.slots_written,
            self.slots_skipped,
            self.unmatched,
            self.warnings.len()
        )
    }
}
