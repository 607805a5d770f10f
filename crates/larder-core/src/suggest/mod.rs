//! Ingredient-name suggestions from a partial text query.
//!
//! Three tiers, each a fallback for the previous one producing nothing:
//!
//! 1. **Facet search** over a short list of candidate facet-attribute
//!    names. The first name that answers is memoized for the session; a
//!    full miss is memoized too, so later calls skip the probing.
//! 2. **Field extraction**: a regular search restricted to the attributes
//!    that may carry structured ingredient lists, scanning every hit's
//!    ingredient fields.
//! 3. **Title words**: tokens of the hit titles as a last resort.
//!
//! Every service failure degrades to an empty result; suggestions never
//! error.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::services::{SearchHit, SearchRequest, SearchService};

/// Facet-attribute names probed in order of descending likelihood.
const FACET_CANDIDATES: [&str; 5] = [
    "ingredientNames",
    "ingredients",
    "ingredient",
    "ingredientList",
    "zutaten",
];

/// Attributes requested for the field-extraction tier.
const FIELD_TIER_ATTRIBUTES: [&str; 5] = [
    "title",
    "ingredientNames",
    "ingredients",
    "ingredientList",
    "mainIngredient",
];

/// Hits fetched for the field/title tiers.
const FALLBACK_HITS_PER_PAGE: u32 = 20;

/// Punctuation stripped from title tokens.
const TITLE_TRIM_CHARS: &str = "()[],.:-/–—»«'\"!?;";

/// Minimum query length; shorter queries return an empty result.
const MIN_QUERY_LEN: usize = 2;

// ---------------------------------------------------------------------------
// Facet memo
// ---------------------------------------------------------------------------

/// What is known about the index's ingredient facet.
///
/// An explicit tri-state rather than an optional string, so "not yet
/// probed" and "probed, none available" cannot be confused.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FacetProbe {
    /// Not probed yet; all candidates will be tried.
    #[default]
    Unknown,
    /// This facet name answered before; only it will be tried.
    Confirmed(String),
    /// Every candidate failed; the facet tier is skipped.
    ConfirmedNone,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Ranked suggestions plus the index's approximate match count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub count: u64,
    pub suggestions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves partial ingredient queries against the search index.
pub struct SuggestionResolver {
    search: Arc<dyn SearchService>,
    probe: FacetProbe,
}

impl SuggestionResolver {
    /// Create a resolver with an unprobed facet memo.
    pub fn new(search: Arc<dyn SearchService>) -> Self {
        Self {
            search,
            probe: FacetProbe::Unknown,
        }
    }

    /// The current facet memo state.
    pub fn probe(&self) -> &FacetProbe {
        &self.probe
    }

    /// Reset the facet memo (fresh session).
    pub fn reset(&mut self) {
        self.probe = FacetProbe::Unknown;
    }

    /// Resolve up to `limit` ranked ingredient-name suggestions.
    pub async fn suggest(&mut self, query: &str, limit: usize) -> Suggestions {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Suggestions::default();
        }

        if let Some(result) = self.facet_tier(query, limit).await {
            return result;
        }
        self.fallback_tiers(query, limit).await
    }

    /// Tier 1: probe the facet candidates, memoizing the outcome.
    async fn facet_tier(&mut self, query: &str, limit: usize) -> Option<Suggestions> {
        let candidates: Vec<String> = match &self.probe {
            FacetProbe::Confirmed(name) => vec![name.clone()],
            FacetProbe::Unknown => FACET_CANDIDATES.iter().map(|f| (*f).to_string()).collect(),
            FacetProbe::ConfirmedNone => Vec::new(),
        };

        for facet in candidates {
            match self
                .search
                .facet_query(&facet, query, limit as u32)
                .await
            {
                Ok(hits) => {
                    if !matches!(self.probe, FacetProbe::Confirmed(_)) {
                        tracing::info!(facet = %facet, "ingredient facet discovered");
                        self.probe = FacetProbe::Confirmed(facet);
                    }
                    return Some(Suggestions {
                        count: hits.iter().map(|h| h.count).sum(),
                        suggestions: hits.into_iter().map(|h| h.value).collect(),
                    });
                }
                Err(e) => {
                    tracing::debug!(facet = %facet, error = %e, "facet probe failed");
                }
            }
        }

        if self.probe == FacetProbe::Unknown {
            tracing::info!("no ingredient facet available, using fallback tiers");
            self.probe = FacetProbe::ConfirmedNone;
        }
        None
    }

    /// Tiers 2 and 3: one restricted search feeds both extractions.
    async fn fallback_tiers(&self, query: &str, limit: usize) -> Suggestions {
        let request = SearchRequest::new(query, FALLBACK_HITS_PER_PAGE)
            .with_attributes(&FIELD_TIER_ATTRIBUTES);

        let response = match self.search.search(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "suggestion fallback search failed");
                return Suggestions::default();
            }
        };

        let from_fields = extract_ingredient_fields(&response.hits, query);
        if !from_fields.is_empty() {
            return Suggestions {
                count: response.total_hits,
                suggestions: truncate(from_fields, limit),
            };
        }

        Suggestions {
            count: response.total_hits,
            suggestions: truncate(extract_title_words(&response.hits, query), limit),
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction + ranking
// ---------------------------------------------------------------------------

/// Tier 2: ingredient names from the hits' dedicated list fields that
/// contain the query (case-insensitive), ranked by descending frequency
/// then ascending length.
fn extract_ingredient_fields(hits: &[SearchHit], query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    let mut frequency = FrequencyTable::new();

    for hit in hits {
        for field in [&hit.ingredient_names, &hit.ingredient_list] {
            let Some(entries) = field else { continue };
            for entry in entries {
                if let Some(name) = entry.display_name() {
                    if name.to_lowercase().contains(&needle) {
                        frequency.bump(name);
                    }
                }
            }
        }
    }

    frequency.ranked()
}

/// Tier 3: whitespace tokens of the hit titles, punctuation-trimmed, at
/// least as long as the query and containing it case-insensitively.
fn extract_title_words(hits: &[SearchHit], query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    let query_len = query.chars().count();
    let mut frequency = FrequencyTable::new();

    for hit in hits {
        for word in hit.title.split_whitespace() {
            let word = word.trim_matches(|c: char| TITLE_TRIM_CHARS.contains(c));
            if word.chars().count() >= query_len && word.to_lowercase().contains(&needle) {
                frequency.bump(word);
            }
        }
    }

    frequency.ranked()
}

/// Occurrence counter preserving first-seen order, so full ties rank
/// deterministically.
struct FrequencyTable {
    order: Vec<String>,
    counts: HashMap<String, u32>,
}

impl FrequencyTable {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            counts: HashMap::new(),
        }
    }

    fn bump(&mut self, value: &str) {
        if let Some(count) = self.counts.get_mut(value) {
            *count += 1;
        } else {
            self.counts.insert(value.to_string(), 1);
            self.order.push(value.to_string());
        }
    }

    /// Values by descending frequency, then ascending length.
    fn ranked(self) -> Vec<String> {
        let mut values = self.order;
        values.sort_by(|a, b| {
            let ca = self.counts[a];
            let cb = self.counts[b];
            cb.cmp(&ca).then(a.chars().count().cmp(&b.chars().count()))
        });
        values
    }
}

fn truncate(mut values: Vec<String>, limit: usize) -> Vec<String> {
    values.truncate(limit);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::IngredientEntry;

    fn hit_with_list(entries: &[&str]) -> SearchHit {
        SearchHit {
            id: "r".to_string(),
            title: "Rezept".to_string(),
            ingredient_list: Some(
                entries
                    .iter()
                    .map(|e| IngredientEntry::Text((*e).to_string()))
                    .collect(),
            ),
            ..SearchHit::default()
        }
    }

    fn hit_with_title(title: &str) -> SearchHit {
        SearchHit {
            id: "r".to_string(),
            title: title.to_string(),
            ..SearchHit::default()
        }
    }

    #[test]
    fn field_extraction_ranks_by_frequency_then_length() {
        let hits = vec![
            hit_with_list(&["Tomaten", "Tomatenmark"]),
            hit_with_list(&["Tomaten"]),
        ];
        assert_eq!(
            extract_ingredient_fields(&hits, "toma"),
            vec!["Tomaten", "Tomatenmark"]
        );
    }

    #[test]
    fn field_extraction_is_case_insensitive() {
        let hits = vec![hit_with_list(&["TOMATEN", "Gurke"])];
        assert_eq!(extract_ingredient_fields(&hits, "toma"), vec!["TOMATEN"]);
    }

    #[test]
    fn equal_frequency_prefers_shorter() {
        let hits = vec![hit_with_list(&["Tomatenmark", "Tomaten"])];
        assert_eq!(
            extract_ingredient_fields(&hits, "toma"),
            vec!["Tomaten", "Tomatenmark"]
        );
    }

    #[test]
    fn title_words_are_trimmed_and_length_gated() {
        let hits = vec![
            hit_with_title("Suppe mit Tomaten, Basilikum"),
            hit_with_title("Tomaten-Risotto (Tomaten!)"),
        ];
        let words = extract_title_words(&hits, "tomaten");
        assert_eq!(words[0], "Tomaten");
        // "Tomaten-Risotto" contains the query and survives the trim.
        assert!(words.contains(&"Tomaten-Risotto".to_string()));
    }

    #[test]
    fn title_words_shorter_than_query_are_dropped() {
        let hits = vec![hit_with_title("Ei im Glas")];
        assert!(extract_title_words(&hits, "eier").is_empty());
    }

    #[test]
    fn frequency_table_keeps_first_seen_order_on_full_ties() {
        let mut table = FrequencyTable::new();
        table.bump("Birne");
        table.bump("Apfel");
        assert_eq!(table.ranked(), vec!["Birne", "Apfel"]);
    }
}
