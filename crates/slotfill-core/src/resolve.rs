//! Key resolver: anchor value → lookup entry.

use regex::Regex;

use crate::error::{EnrichError, Result};
use crate::table::{LookupEntry, LookupTable, MatchPolicy};

/// First entry, in declaration order, whose pattern is contained in `anchor`.
///
/// Order is significant: with `["73", "730"]`, an anchor containing `730`
/// resolves to the `73` entry. Use [`Resolver`] with a different
/// [`MatchPolicy`] when the table cannot be kept most-specific-first.
pub fn resolve<'t>(anchor: &str, table: &'t LookupTable) -> Option<&'t LookupEntry> {
    table
        .iter()
        .find(|e| MatchPolicy::FirstDeclared.matches(&e.pattern, anchor))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionSource {
    Table { index: usize, pattern: String },
    Derived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub source: ResolutionSource,
    pub values: Vec<String>,
}

impl Resolution {
    pub fn is_derived(&self) -> bool {
        self.source == ResolutionSource::Derived
    }
}

#[derive(Debug, Clone)]
struct CompiledFallback {
    capture: Regex,
    template: String,
}

#[derive(Debug, Clone)]
pub struct Resolver<'t> {
    table: &'t LookupTable,
    policy: MatchPolicy,
    fallback: Option<CompiledFallback>,
}

impl<'t> Resolver<'t> {
    pub fn new(table: &'t LookupTable, policy: MatchPolicy) -> Result<Self> {
        table.validate()?;
        let fallback = match &table.fallback {
            Some(rule) => {
                let capture =
                    Regex::new(&rule.capture).map_err(|source| EnrichError::InvalidPattern {
                        field: "fallback.capture".to_string(),
                        source,
                    })?;
                if capture.captures_len() < 2 {
                    return Err(EnrichError::Config(
                        "fallback capture needs at least one group".to_string(),
                    ));
                }
                Some(CompiledFallback {
                    capture,
                    template: rule.template.clone(),
                })
            }
            None => None,
        };
        Ok(Self {
            table,
            policy,
            fallback,
        })
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn resolve(&self, anchor: &str) -> Option<Resolution> {
        self.lookup(anchor)
            .map(|(index, entry)| Resolution {
                source: ResolutionSource::Table {
                    index,
                    pattern: entry.pattern.clone(),
                },
                values: entry.values.clone(),
            })
            .or_else(|| self.derive(anchor))
    }

    fn lookup(&self, anchor: &str) -> Option<(usize, &'t LookupEntry)> {
        let mut candidates = self
            .table
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.policy.matches(&e.pattern, anchor));

        match self.policy {
            MatchPolicy::FirstDeclared | MatchPolicy::ExactToken => candidates.next(),
            // `max_by_key` keeps the last maximum; fold keeps the first.
            MatchPolicy::LongestPattern => candidates.fold(None, |best, (i, e)| match best {
                Some((_, b)) if b.pattern.len() >= e.pattern.len() => best,
                _ => Some((i, e)),
            }),
        }
    }

    fn derive(&self, anchor: &str) -> Option<Resolution> {
        let fallback = self.fallback.as_ref()?;
        let caps = fallback.capture.captures(anchor)?;
        let mut value = String::new();
        caps.expand(&fallback.template, &mut value);
        if value.is_empty() {
            return None;
        }
        Some(Resolution {
            source: ResolutionSource::Derived,
            values: vec![value],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FallbackRule;

    fn conflicting() -> LookupTable {
        let mut table = LookupTable::new();
        table.push("73", ["seventy-three"]).push("730", ["seven-thirty"]);
        table
    }

    #[test]
    fn first_declared_substring_wins_even_when_less_specific() {
        let table = conflicting();
        let anchor = "https://cdn.example/steam/apps/730/header.jpg";

        let entry = resolve(anchor, &table).expect("match");
        assert_eq!(entry.values, vec!["seventy-three".to_string()]);

        let resolver = Resolver::new(&table, MatchPolicy::FirstDeclared).expect("resolver");
        let r = resolver.resolve(anchor).expect("match");
        assert_eq!(r.values, vec!["seventy-three".to_string()]);
        assert_eq!(
            r.source,
            ResolutionSource::Table {
                index: 0,
                pattern: "73".to_string()
            }
        );
    }

    #[test]
    fn longest_pattern_and_exact_token_pick_the_specific_entry() {
        let table = conflicting();
        let anchor = "https://cdn.example/steam/apps/730/header.jpg";
        for policy in [MatchPolicy::LongestPattern, MatchPolicy::ExactToken] {
            let resolver = Resolver::new(&table, policy).expect("resolver");
            let r = resolver.resolve(anchor).expect("match");
            assert_eq!(r.values, vec!["seven-thirty".to_string()], "{policy}");
        }
    }

    #[test]
    fn longest_pattern_ties_keep_declaration_order() {
        let mut table = LookupTable::new();
        table.push("abc", ["first"]).push("bcd", ["second"]);
        let resolver = Resolver::new(&table, MatchPolicy::LongestPattern).expect("resolver");
        assert_eq!(
            resolver.resolve("xabcdx").map(|r| r.values),
            Some(vec!["first".to_string()])
        );
    }

    #[test]
    fn no_match_is_none() {
        let table = conflicting();
        assert!(resolve("https://cdn.example/apps/999/x.jpg", &table).is_none());
        let resolver = Resolver::new(&table, MatchPolicy::FirstDeclared).expect("resolver");
        assert!(resolver.resolve("nothing here").is_none());
    }

    #[test]
    fn fallback_derives_first_value() {
        let table = conflicting().with_fallback(FallbackRule {
            capture: r"/apps/(\d+)/".to_string(),
            template: "https://store.example/app/${1}/".to_string(),
        });
        let resolver = Resolver::new(&table, MatchPolicy::ExactToken).expect("resolver");
        let r = resolver
            .resolve("https://cdn.example/steam/apps/588650/header.jpg")
            .expect("derived");
        assert!(r.is_derived());
        assert_eq!(r.values, vec!["https://store.example/app/588650/".to_string()]);

        // Table entries still take precedence.
        let r = resolver.resolve("/apps/730/").expect("table");
        assert!(!r.is_derived());
    }

    #[test]
    fn fallback_without_group_is_rejected() {
        let table = LookupTable::new().with_fallback(FallbackRule {
            capture: r"/apps/\d+/".to_string(),
            template: "x".to_string(),
        });
        assert!(matches!(
            Resolver::new(&table, MatchPolicy::FirstDeclared),
            Err(EnrichError::Config(_))
        ));
    }
}
