//! Slotfill core
//!
//! Enriches records embedded in free-form source text without parsing the
//! host format:
//! - [`scan`] walks an immutable [`arena::LineArena`] and yields record spans,
//!   anchor values and slot positions using the heuristics of a
//!   [`layout::RecordLayout`],
//! - [`resolve`] maps an anchor value to a [`table::LookupEntry`],
//! - [`rewrite`] turns a resolved bundle into position-tagged [`patch::Patch`]es,
//! - [`pipeline`] drives the pass and renders the text exactly once.
//!
//! Every byte not covered by a patch is reproduced verbatim, so a run over
//! already-enriched text is a no-op.

pub mod arena;
pub mod config;
pub mod digest;
pub mod error;
pub mod layout;
pub mod patch;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod rewrite;
pub mod scan;
pub mod strategy;
pub mod table;

pub use arena::{Line, LineArena};
pub use config::EnrichConfig;
pub use error::{EnrichError, Result};
pub use layout::{CompiledLayout, RecordLayout, SlotField, ValueKind};
pub use patch::{Patch, PatchSet};
pub use pipeline::{read_input, run, EnrichOutput, Mode, Pipeline};
pub use report::{EnrichReport, IssueKind, RecordIssue};
pub use resolve::{resolve, Resolution, ResolutionSource, Resolver};
pub use rewrite::{rewrite_record, RecordRewrite};
pub use scan::{AnchorValue, ExistingSlot, RecordScanner, ScanEvent, ScanWarning, ScannedRecord};
pub use strategy::AnchorStrategy;
pub use table::{FallbackRule, LookupEntry, LookupTable, MatchPolicy, SpecificityHazard};
