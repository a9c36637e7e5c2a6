//! Anchor-detection strategies.
//!
//! The scanner records every candidate anchor for a record; a strategy picks
//! which one becomes the correlation input:
//!
//! | strategy         | anchor value                          | default policy   |
//! |------------------|---------------------------------------|------------------|
//! | `line-adjacency` | last anchor-marker line before a slot | `first-declared` |
//! | `declared-name`  | name captured from the start line     | `exact-token`    |
//! | `ordinal`        | 1-based record position               | `exact-token`    |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scan::ScannedRecord;
use crate::table::MatchPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStrategy {
    #[default]
    LineAdjacency,
    DeclaredName,
    Ordinal,
}

impl AnchorStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            AnchorStrategy::LineAdjacency => "line-adjacency",
            AnchorStrategy::DeclaredName => "declared-name",
            AnchorStrategy::Ordinal => "ordinal",
        }
    }

    /// Ordinals and names are whole tokens; substring containment would let
    /// `"1"` claim record 10.
    pub fn default_policy(self) -> MatchPolicy {
        match self {
            AnchorStrategy::LineAdjacency => MatchPolicy::FirstDeclared,
            AnchorStrategy::DeclaredName | AnchorStrategy::Ordinal => MatchPolicy::ExactToken,
        }
    }

    pub fn anchor_for(self, record: &ScannedRecord) -> Option<String> {
        match self {
            AnchorStrategy::LineAdjacency => record.adjacent_anchor.as_ref().map(|a| a.value.clone()),
            AnchorStrategy::DeclaredName => record
                .declared_name
                .as_ref()
                .filter(|n| !n.trim().is_empty())
                .cloned(),
            AnchorStrategy::Ordinal => Some(record.ordinal.to_string()),
        }
    }
}

impl fmt::Display for AnchorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnchorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "line-adjacency" | "adjacency" => Ok(AnchorStrategy::LineAdjacency),
            "declared-name" | "name" => Ok(AnchorStrategy::DeclaredName),
            "ordinal" | "position" => Ok(AnchorStrategy::Ordinal),
            other => Err(format!(
                "unknown anchor strategy `{other}` (expected line-adjacency, declared-name or ordinal)"
            )),
        }
    }
}
