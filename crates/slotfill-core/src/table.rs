//! Ordered lookup tables.
//!
//! An entry maps a correlation pattern to a value bundle. Bundles are
//! positional: value `i` belongs to the layout's slot field `i`, and a bundle
//! may be shorter than the field list.
//!
//! Pattern matching is substring based, which makes entry order meaningful:
//! under [`MatchPolicy::FirstDeclared`] a short pattern declared before a
//! longer one that contains it (`"73"` before `"730"`) shadows it for every
//! anchor containing the longer one. [`LookupTable::specificity_hazards`]
//! reports such pairs; [`MatchPolicy::LongestPattern`] and
//! [`MatchPolicy::ExactToken`] remove the dependence on manual ordering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EnrichError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Substring containment; the first declared entry wins.
    #[default]
    FirstDeclared,
    /// Substring containment; the longest pattern wins, ties by declaration order.
    LongestPattern,
    /// The pattern must not continue an alphanumeric run on either side
    /// (`"73"` does not match inside `"730"`); the first declared entry wins.
    ExactToken,
}

impl MatchPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchPolicy::FirstDeclared => "first-declared",
            MatchPolicy::LongestPattern => "longest-pattern",
            MatchPolicy::ExactToken => "exact-token",
        }
    }

    pub fn matches(self, pattern: &str, anchor: &str) -> bool {
        match self {
            MatchPolicy::FirstDeclared | MatchPolicy::LongestPattern => anchor.contains(pattern),
            MatchPolicy::ExactToken => contains_token(anchor, pattern),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "first-declared" | "first" => Ok(MatchPolicy::FirstDeclared),
            "longest-pattern" | "longest" => Ok(MatchPolicy::LongestPattern),
            "exact-token" | "exact" => Ok(MatchPolicy::ExactToken),
            other => Err(format!(
                "unknown match policy `{other}` (expected first-declared, longest-pattern or exact-token)"
            )),
        }
    }
}

/// `needle` occurs in `haystack` without extending an alphanumeric run.
///
/// Only edges of `needle` that are themselves alphanumeric need a boundary,
/// so delimited patterns such as `"/730/"` still match mid-token.
pub fn contains_token(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let first_alnum = needle.chars().next().is_some_and(char::is_alphanumeric);
    let last_alnum = needle.chars().next_back().is_some_and(char::is_alphanumeric);

    haystack.match_indices(needle).any(|(start, m)| {
        let end = start + m.len();
        let before_ok = !first_alnum
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let after_ok = !last_alnum
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        before_ok && after_ok
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub pattern: String,
    pub values: Vec<String>,
}

/// Derive the first bundle value from the anchor when no entry matches.
///
/// `capture` is a regex with at least one group; `template` is expanded with
/// `$1`/`${1}` references as in `regex::Captures::expand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    pub capture: String,
    pub template: String,
}

/// A specificity hazard: `earlier` would shadow `later` for anchors that
/// contain `later`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificityHazard {
    pub earlier_index: usize,
    pub earlier: String,
    pub later_index: usize,
    pub later: String,
}

impl fmt::Display for SpecificityHazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pattern #{} `{}` shadows #{} `{}`",
            self.earlier_index, self.earlier, self.later_index, self.later
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    pub entries: Vec<LookupEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackRule>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from compiled-in `(pattern, bundle)` pairs, keeping their order.
    pub fn from_static(entries: &[(&str, &[&str])]) -> Self {
        let mut table = Self::new();
        for (pattern, values) in entries {
            table.push(pattern, values.iter().copied());
        }
        table
    }

    pub fn push<I, S>(&mut self, pattern: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.push(LookupEntry {
            pattern: pattern.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_fallback(mut self, rule: FallbackRule) -> Self {
        self.fallback = Some(rule);
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(text)
            .map_err(|e| EnrichError::Config(format!("lookup table: {e}")))?;
        table.validate()?;
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LookupEntry> {
        self.entries.iter()
    }

    /// Reject entries that could never resolve sensibly.
    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.pattern.is_empty() {
                return Err(EnrichError::Config(format!(
                    "lookup entry #{i} has an empty pattern (it would match every anchor)"
                )));
            }
            if entry.values.is_empty() {
                return Err(EnrichError::Config(format!(
                    "lookup entry #{i} `{}` has no values",
                    entry.pattern
                )));
            }
        }
        Ok(())
    }

    /// Pairs where an earlier pattern matches inside a later one under
    /// `policy`, so the later entry can never win for anchors containing it.
    pub fn specificity_hazards(&self, policy: MatchPolicy) -> Vec<SpecificityHazard> {
        if policy == MatchPolicy::LongestPattern {
            return Vec::new();
        }
        let mut hazards = Vec::new();
        for (i, earlier) in self.entries.iter().enumerate() {
            for (j, later) in self.entries.iter().enumerate().skip(i + 1) {
                if earlier.pattern != later.pattern && policy.matches(&earlier.pattern, &later.pattern) {
                    hazards.push(SpecificityHazard {
                        earlier_index: i,
                        earlier: earlier.pattern.clone(),
                        later_index: j,
                        later: later.pattern.clone(),
                    });
                }
            }
        }
        hazards
    }
}
