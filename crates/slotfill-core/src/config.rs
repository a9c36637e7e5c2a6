//! Run configuration (JSON).
//!
//! Every field is optional; omitted parts fall back to the defaults the
//! caller passes to [`EnrichConfig::into_pipeline`] (normally the compiled-in
//! catalog).
//!
//! ```json
//! {
//!   "strategy": "declared_name",
//!   "policy": "exact_token",
//!   "repair_separators": true,
//!   "table": { "entries": [ { "pattern": "Hades", "values": ["https://..."] } ] }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};
use crate::layout::RecordLayout;
use crate::pipeline::{Mode, Pipeline};
use crate::strategy::AnchorStrategy;
use crate::table::{FallbackRule, LookupTable, MatchPolicy};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichConfig {
    pub layout: Option<RecordLayout>,
    pub strategy: AnchorStrategy,
    /// Defaults to the strategy's policy.
    pub policy: Option<MatchPolicy>,
    pub table: Option<LookupTable>,
    /// Replaces any fallback carried by the table.
    pub fallback: Option<FallbackRule>,
    pub repair_separators: bool,
    pub mode: Mode,
}

impl EnrichConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EnrichError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EnrichError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn effective_policy(&self) -> MatchPolicy {
        self.policy.unwrap_or_else(|| self.strategy.default_policy())
    }

    /// Build a pipeline, filling gaps from `default_layout` and the table
    /// returned by `default_table` for the configured strategy.
    pub fn into_pipeline<F>(self, default_layout: &RecordLayout, default_table: F) -> Result<Pipeline>
    where
        F: FnOnce(AnchorStrategy) -> LookupTable,
    {
        let policy = self.effective_policy();
        let layout = self.layout.unwrap_or_else(|| default_layout.clone());
        let mut table = self.table.unwrap_or_else(|| default_table(self.strategy));
        if let Some(rule) = self.fallback {
            table.fallback = Some(rule);
        }
        Ok(Pipeline::new(&layout, table)?
            .with_strategy(self.strategy)
            .with_policy(policy)
            .with_separator_repair(self.repair_separators)
            .with_mode(self.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_defaults() {
        let config = EnrichConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, EnrichConfig::default());
        assert_eq!(config.effective_policy(), MatchPolicy::FirstDeclared);
    }

    #[test]
    fn strategy_sets_default_policy_unless_overridden() {
        let config = EnrichConfig::from_json_str(r#"{"strategy": "ordinal"}"#).expect("parse");
        assert_eq!(config.effective_policy(), MatchPolicy::ExactToken);

        let config =
            EnrichConfig::from_json_str(r#"{"strategy": "ordinal", "policy": "longest_pattern"}"#)
                .expect("parse");
        assert_eq!(config.effective_policy(), MatchPolicy::LongestPattern);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            EnrichConfig::from_json_str(r#"{"stratgey": "ordinal"}"#),
            Err(EnrichError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EnrichConfig::load(Path::new("/nonexistent/slotfill.json")).unwrap_err();
        assert!(matches!(err, EnrichError::Io { .. }));
    }
}
