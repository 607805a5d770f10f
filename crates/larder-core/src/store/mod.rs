//! The candidate store: one deduplicated pool per course/source, plus the
//! filtering views the allocator reads through.
//!
//! The store performs no I/O. It is mutated only by the pool acquirer and
//! read (as cloned snapshots) by the allocator, so allocation can be
//! reasoned about as a pure function of snapshot + filters + RNG.

use std::collections::HashSet;

use crate::candidate::{CandidatePool, CourseType, RecipeCandidate};
use crate::slot::SlotKey;

/// Typed pools of recipe candidates for one planning session.
#[derive(Debug, Default)]
pub struct CandidateStore {
    preferred: CandidatePool,
    curated: CandidatePool,
    searched: CandidatePool,
    starter: CandidatePool,
    dessert: CandidatePool,
}

/// Pool sizes, as reported after acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PoolCounts {
    pub preferred: usize,
    pub curated: usize,
    pub searched: usize,
    pub starter: usize,
    pub dessert: usize,
}

impl CandidateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pool snapshot backing a slot key: starter slots read the starter
    /// pool, dessert slots the dessert pool, main slots the concatenation
    /// preferred + curated + searched.
    pub fn pool_for(&self, slot: SlotKey) -> Vec<RecipeCandidate> {
        self.course_pool(slot.course())
    }

    /// The pool snapshot for a course.
    pub fn course_pool(&self, course: CourseType) -> Vec<RecipeCandidate> {
        match course {
            CourseType::Starter => self.starter.candidates().to_vec(),
            CourseType::Dessert => self.dessert.candidates().to_vec(),
            CourseType::Main => {
                let mut pool = Vec::with_capacity(
                    self.preferred.len() + self.curated.len() + self.searched.len(),
                );
                pool.extend_from_slice(self.preferred.candidates());
                pool.extend_from_slice(self.curated.candidates());
                pool.extend_from_slice(self.searched.candidates());
                pool
            }
        }
    }

    /// Insert into the pool matching the candidate's source. The id must
    /// not already exist in *any* of the three main sub-pools.
    pub fn insert_main(&mut self, candidate: RecipeCandidate) -> bool {
        if self.contains_main_id(&candidate.id) {
            return false;
        }
        match candidate.source {
            crate::candidate::Source::Preferred => self.preferred.insert(candidate),
            crate::candidate::Source::Curated => self.curated.insert(candidate),
            crate::candidate::Source::Searched => self.searched.insert(candidate),
        }
    }

    /// Insert into the starter pool.
    pub fn insert_starter(&mut self, candidate: RecipeCandidate) -> bool {
        self.starter.insert(candidate)
    }

    /// Insert into the dessert pool.
    pub fn insert_dessert(&mut self, candidate: RecipeCandidate) -> bool {
        self.dessert.insert(candidate)
    }

    /// Whether an id exists in any main-course sub-pool.
    pub fn contains_main_id(&self, id: &str) -> bool {
        self.preferred.contains_id(id)
            || self.curated.contains_id(id)
            || self.searched.contains_id(id)
    }

    /// Ids of the collection-sourced candidates (preferred + curated),
    /// used to deduplicate fresh search results against them.
    pub fn collection_ids(&self) -> HashSet<String> {
        self.preferred
            .candidates()
            .iter()
            .chain(self.curated.candidates())
            .map(|c| c.id.clone())
            .collect()
    }

    /// Drop the searched main pool (rebuilt by a filtered search).
    pub fn clear_searched(&mut self) {
        self.searched.clear();
    }

    /// Replace the searched main pool wholesale.
    pub fn replace_searched(&mut self, candidates: Vec<RecipeCandidate>) {
        self.searched.replace(candidates);
    }

    /// Replace a typed (starter/dessert) pool wholesale.
    pub fn replace_course_pool(&mut self, course: CourseType, candidates: Vec<RecipeCandidate>) {
        match course {
            CourseType::Starter => self.starter.replace(candidates),
            CourseType::Dessert => self.dessert.replace(candidates),
            CourseType::Main => self.searched.replace(candidates),
        }
    }

    /// Whether a typed pool has no candidates yet.
    pub fn course_pool_is_empty(&self, course: CourseType) -> bool {
        match course {
            CourseType::Starter => self.starter.is_empty(),
            CourseType::Dessert => self.dessert.is_empty(),
            CourseType::Main => {
                self.preferred.is_empty() && self.curated.is_empty() && self.searched.is_empty()
            }
        }
    }

    /// Empty every pool (fresh login or filter reset).
    pub fn clear_all(&mut self) {
        self.preferred.clear();
        self.curated.clear();
        self.searched.clear();
        self.starter.clear();
        self.dessert.clear();
    }

    /// Current pool sizes.
    pub fn counts(&self) -> PoolCounts {
        PoolCounts {
            preferred: self.preferred.len(),
            curated: self.curated.len(),
            searched: self.searched.len(),
            starter: self.starter.len(),
            dessert: self.dessert.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering views
// ---------------------------------------------------------------------------

/// Keep candidates within the cook-time ceiling. Unknown times
/// (`total_time == 0`) always pass; `None` means no restriction.
pub fn filter_by_time(
    candidates: Vec<RecipeCandidate>,
    max_minutes: Option<u32>,
) -> Vec<RecipeCandidate> {
    let Some(max_minutes) = max_minutes else {
        return candidates;
    };
    let max_seconds = max_minutes * 60;
    candidates
        .into_iter()
        .filter(|c| c.total_time == 0 || c.total_time <= max_seconds)
        .collect()
}

/// Drop candidates whose name contains any excluded term
/// (case-insensitive substring; terms are trimmed, empty terms ignored).
pub fn filter_by_ingredients(
    candidates: Vec<RecipeCandidate>,
    excluded: &[String],
) -> Vec<RecipeCandidate> {
    let needles: Vec<String> = excluded
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if needles.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|c| {
            let name = c.name.to_lowercase();
            !needles.iter().any(|needle| name.contains(needle))
        })
        .collect()
}
