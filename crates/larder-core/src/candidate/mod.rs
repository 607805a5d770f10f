//! Recipe candidates and the deduplicated pools they are collected into.

pub mod classify;
pub mod terms;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use classify::CourseType;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where a candidate was acquired from.
///
/// The mixing ratio treats `preferred` specially; `curated` and `searched`
/// both count as "other". The three-way split is intentional: recipes from
/// shared/managed collections are kept distinct from the user's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The user's own curated collections.
    Preferred,
    /// Shared/managed collections subscribed by the user.
    Curated,
    /// Free-text search results.
    Searched,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Preferred => "preferred",
            Self::Curated => "curated",
            Self::Searched => "searched",
        };
        f.write_str(s)
    }
}

/// Error returned when parsing an invalid [`Source`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown candidate source: {0:?}")]
pub struct SourceParseError(pub String);

impl FromStr for Source {
    type Err = SourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preferred" => Ok(Self::Preferred),
            "curated" => Ok(Self::Curated),
            "searched" => Ok(Self::Searched),
            other => Err(SourceParseError(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// RecipeCandidate
// ---------------------------------------------------------------------------

/// One recipe eligible for plan allocation.
///
/// Identity is `id`, unique within a planning session. The three display
/// fields (`thumbnail`, `image`, `url`) are populated lazily by enrichment
/// and transition from absent to present at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    /// Stable external recipe key.
    pub id: String,
    /// Recipe title.
    pub name: String,
    /// Total cook time in seconds. `0` means unknown/unspecified and is
    /// never filtered out by a time ceiling.
    pub total_time: u32,
    /// Acquisition source.
    pub source: Source,
    /// The collection the candidate came from (search results carry the
    /// portal name).
    pub collection_name: String,
    /// Thumbnail URL, filled by enrichment.
    pub thumbnail: Option<String>,
    /// Full-size image URL, filled by enrichment.
    pub image: Option<String>,
    /// Public recipe URL, filled by enrichment.
    pub url: Option<String>,
    /// Average rating, `0.0` when unrated.
    pub rating: f64,
}

impl RecipeCandidate {
    /// Create a candidate with no display metadata yet.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        total_time: u32,
        source: Source,
        collection_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            total_time,
            source,
            collection_name: collection_name.into(),
            thumbnail: None,
            image: None,
            url: None,
            rating: 0.0,
        }
    }

    /// Whether enrichment already ran (or was never needed).
    pub fn is_enriched(&self) -> bool {
        self.thumbnail.is_some() && self.image.is_some()
    }

    /// Human-readable cook time, e.g. `25 Min.` or `1 Std. 10 Min.`.
    pub fn total_time_label(&self) -> String {
        let minutes = self.total_time / 60;
        if minutes >= 60 {
            let (h, m) = (minutes / 60, minutes % 60);
            if m == 0 {
                format!("{h} Std.")
            } else {
                format!("{h} Std. {m} Min.")
            }
        } else {
            format!("{minutes} Min.")
        }
    }
}

// ---------------------------------------------------------------------------
// CandidatePool
// ---------------------------------------------------------------------------

/// An ordered collection of candidates, deduplicated by id at insertion
/// time. The first occurrence of an id wins; later inserts with the same
/// id are ignored.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    items: Vec<RecipeCandidate>,
    ids: HashSet<String>,
}

impl CandidatePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate. Returns `false` (and drops the candidate) if a
    /// candidate with the same id is already present.
    pub fn insert(&mut self, candidate: RecipeCandidate) -> bool {
        if self.ids.contains(&candidate.id) {
            return false;
        }
        self.ids.insert(candidate.id.clone());
        self.items.push(candidate);
        true
    }

    /// Whether an id is already present.
    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Candidates in insertion order.
    pub fn candidates(&self) -> &[RecipeCandidate] {
        &self.items
    }

    /// Number of candidates in the pool.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every candidate.
    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
    }

    /// Replace the pool contents, re-deduplicating from scratch.
    pub fn replace(&mut self, candidates: Vec<RecipeCandidate>) {
        self.clear();
        for candidate in candidates {
            self.insert(candidate);
        }
    }
}

impl FromIterator<RecipeCandidate> for CandidatePool {
    fn from_iter<I: IntoIterator<Item = RecipeCandidate>>(iter: I) -> Self {
        let mut pool = Self::new();
        for candidate in iter {
            pool.insert(candidate);
        }
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, name: &str) -> RecipeCandidate {
        RecipeCandidate::new(id, name, 0, Source::Searched, "Cookidoo")
    }

    #[test]
    fn pool_deduplicates_first_wins() {
        let mut pool = CandidatePool::new();
        assert!(pool.insert(candidate("r1", "Linsencurry")));
        assert!(!pool.insert(candidate("r1", "Anderes Rezept")));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.candidates()[0].name, "Linsencurry");
    }

    #[test]
    fn pool_preserves_insertion_order() {
        let pool: CandidatePool = ["r1", "r2", "r3"]
            .iter()
            .map(|id| candidate(id, "Rezept"))
            .collect();
        let ids: Vec<&str> = pool.candidates().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn replace_resets_dedup_state() {
        let mut pool = CandidatePool::new();
        pool.insert(candidate("r1", "Altes Rezept"));
        pool.replace(vec![candidate("r2", "Neues Rezept")]);
        assert!(!pool.contains_id("r1"));
        assert!(pool.contains_id("r2"));
        assert!(pool.insert(candidate("r1", "Altes Rezept")));
    }

    #[test]
    fn time_label_formats_hours_and_minutes() {
        let mut c = candidate("r1", "Braten");
        c.total_time = 25 * 60;
        assert_eq!(c.total_time_label(), "25 Min.");
        c.total_time = 60 * 60;
        assert_eq!(c.total_time_label(), "1 Std.");
        c.total_time = 70 * 60;
        assert_eq!(c.total_time_label(), "1 Std. 10 Min.");
        c.total_time = 0;
        assert_eq!(c.total_time_label(), "0 Min.");
    }

    #[test]
    fn enrichment_state_requires_both_images() {
        let mut c = candidate("r1", "Suppe");
        assert!(!c.is_enriched());
        c.thumbnail = Some("https://example/thumb.jpg".to_string());
        assert!(!c.is_enriched());
        c.image = Some("https://example/full.jpg".to_string());
        assert!(c.is_enriched());
    }

    #[test]
    fn source_roundtrip() {
        for source in [Source::Preferred, Source::Curated, Source::Searched] {
            assert_eq!(source.to_string().parse::<Source>().unwrap(), source);
        }
        assert!("managed".parse::<Source>().is_err());
    }
}
