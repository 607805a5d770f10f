//! Pool acquisition: builds and refreshes the candidate store from the
//! user's collections and the search index, and enriches selected
//! candidates with display metadata.
//!
//! All per-term searches within one call are dispatched as a single
//! concurrent batch and joined together; an individual failed term
//! degrades to an empty result for that term rather than aborting the
//! batch.

use std::sync::Arc;

use futures::future::join_all;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::candidate::{CandidatePool, CourseType, RecipeCandidate, Source, classify, terms};
use crate::error::PlannerError;
use crate::locale::{Locale, recipe_url};
use crate::services::{CollectionKind, RecipeService, SearchHit, SearchRequest, SearchService};
use crate::store::CandidateStore;

/// Host substituted for the `{assethost}` placeholder in hit image URLs.
const ASSET_HOST: &str = "assets.tmecosys.com";

/// Image transformation substituted for `{transformation}`.
const IMAGE_TRANSFORMATION: &str = "t_web_rdp_recipe_584x480";

/// Collection name attached to search-sourced candidates.
const SEARCH_COLLECTION_NAME: &str = "Cookidoo";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for pool acquisition.
///
/// The two supply thresholds are carried over unchanged from the original
/// policy; they are fields (not hard-coded) so callers can override them
/// without a code change.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Below this many collection recipes, `load_collections` backfills
    /// the searched pool.
    pub low_supply_backfill: usize,
    /// A category post-filter is discarded when it would leave fewer
    /// candidates than this.
    pub min_filtered_supply: usize,
    /// Maximum number of terms sampled per main-course search batch.
    pub max_search_terms: usize,
    /// Maximum number of terms sampled per starter/dessert search batch.
    pub max_course_terms: usize,
    /// Hits requested per main-course search term.
    pub hits_per_term: u32,
    /// Hits requested per starter/dessert search term.
    pub hits_per_course_term: u32,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            low_supply_backfill: 20,
            min_filtered_supply: 10,
            max_search_terms: 20,
            max_course_terms: 10,
            hits_per_term: 40,
            hits_per_course_term: 30,
        }
    }
}

/// Search-filter selections used to rebuild the searched main pool.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub categories: Vec<String>,
    pub cuisines: Vec<String>,
    pub preferred_ingredients: Vec<String>,
    pub languages: Vec<String>,
}

impl SearchFilters {
    /// Whether any filter group is active.
    pub fn is_active(&self) -> bool {
        !self.categories.is_empty()
            || !self.cuisines.is_empty()
            || !self.preferred_ingredients.is_empty()
            || !self.languages.is_empty()
    }

    /// Wire-level filter expression restricting hits to the selected
    /// languages, or `None` when no language is selected.
    fn language_expression(&self) -> Option<String> {
        if self.languages.is_empty() {
            return None;
        }
        let clauses: Vec<String> = self
            .languages
            .iter()
            .map(|l| format!("language:{l}"))
            .collect();
        Some(clauses.join(" OR "))
    }
}

/// What `load_collections` gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CollectionCounts {
    pub preferred_recipes: usize,
    pub curated_recipes: usize,
    pub searched_recipes: usize,
    pub preferred_collections: usize,
    pub curated_collections: usize,
}

// ---------------------------------------------------------------------------
// PoolAcquirer
// ---------------------------------------------------------------------------

/// Builds and refreshes [`CandidateStore`] pools and enriches candidates.
pub struct PoolAcquirer {
    recipes: Arc<dyn RecipeService>,
    search: Arc<dyn SearchService>,
    locale: Locale,
    config: AcquireConfig,
}

impl PoolAcquirer {
    /// Create an acquirer for one logged-in session.
    pub fn new(
        recipes: Arc<dyn RecipeService>,
        search: Arc<dyn SearchService>,
        locale: Locale,
    ) -> Self {
        Self {
            recipes,
            search,
            locale,
            config: AcquireConfig::default(),
        }
    }

    /// Override the acquisition tunables.
    pub fn with_config(mut self, config: AcquireConfig) -> Self {
        self.config = config;
        self
    }

    /// The locale this acquirer builds candidates for.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Load every page of both native collection kinds into the preferred
    /// and curated pools, then backfill the searched pool when the
    /// combined supply is low.
    pub async fn load_collections<R: Rng>(
        &self,
        store: &mut CandidateStore,
        rng: &mut R,
    ) -> Result<CollectionCounts, PlannerError> {
        store.clear_all();

        let preferred_collections = self
            .load_collection_kind(store, CollectionKind::Custom, Source::Preferred)
            .await?;
        let curated_collections = self
            .load_collection_kind(store, CollectionKind::Managed, Source::Curated)
            .await?;

        let mut counts = store.counts();
        let from_collections = counts.preferred + counts.curated;

        if from_collections < self.config.low_supply_backfill {
            tracing::info!(
                collected = from_collections,
                threshold = self.config.low_supply_backfill,
                "collection supply low, backfilling from search"
            );
            let terms = sample_terms(terms::MAIN_SEARCH_TERMS, self.config.max_search_terms, rng);
            let found = self
                .fan_out(&terms, self.config.hits_per_term, CourseType::Main, None)
                .await;
            for candidate in found {
                store.insert_main(candidate);
            }
            counts = store.counts();
        }

        tracing::info!(
            preferred = counts.preferred,
            curated = counts.curated,
            searched = counts.searched,
            "collections loaded"
        );

        Ok(CollectionCounts {
            preferred_recipes: counts.preferred,
            curated_recipes: counts.curated,
            searched_recipes: counts.searched,
            preferred_collections,
            curated_collections,
        })
    }

    /// Rebuild the searched main pool with filter-expanded terms.
    ///
    /// Each active filter group prepends its expansions to a ten-term
    /// truncation of the current term list, compounding in order
    /// (categories, then cuisines, then preferred ingredients). A category
    /// post-filter on titles is reverted when it would leave fewer than
    /// [`AcquireConfig::min_filtered_supply`] candidates.
    pub async fn search_with_filters<R: Rng>(
        &self,
        store: &mut CandidateStore,
        filters: &SearchFilters,
        rng: &mut R,
    ) -> Result<usize, PlannerError> {
        let mut search_terms: Vec<String> = terms::MAIN_SEARCH_TERMS
            .iter()
            .map(|t| (*t).to_string())
            .collect();

        if !filters.categories.is_empty() {
            let extra: Vec<String> = filters
                .categories
                .iter()
                .flat_map(|c| terms::category_synonyms(c))
                .collect();
            search_terms = prepend_truncated(extra, search_terms);
        }
        if !filters.cuisines.is_empty() {
            let extra: Vec<String> = filters
                .cuisines
                .iter()
                .flat_map(|c| terms::cuisine_synonyms(c))
                .collect();
            search_terms = prepend_truncated(extra, search_terms);
        }
        if !filters.preferred_ingredients.is_empty() {
            search_terms = prepend_truncated(filters.preferred_ingredients.clone(), search_terms);
        }

        let terms_to_use = sample_owned_terms(&search_terms, self.config.max_search_terms, rng);
        let found = self
            .fan_out(
                &terms_to_use,
                self.config.hits_per_term,
                CourseType::Main,
                filters.language_expression(),
            )
            .await;

        // Deduplicate against the collection pools and within the batch.
        let collection_ids = store.collection_ids();
        let mut pool = CandidatePool::new();
        for candidate in found {
            if !collection_ids.contains(&candidate.id) {
                pool.insert(candidate);
            }
        }
        let mut results: Vec<RecipeCandidate> = pool.candidates().to_vec();

        if !filters.categories.is_empty() {
            let keywords: Vec<String> = filters
                .categories
                .iter()
                .flat_map(|c| terms::category_synonyms(c))
                .map(|k| k.to_lowercase())
                .collect();
            let filtered: Vec<RecipeCandidate> = results
                .iter()
                .filter(|c| {
                    let name = c.name.to_lowercase();
                    keywords.iter().any(|kw| name.contains(kw))
                })
                .cloned()
                .collect();
            // Relax the post-filter rather than starving the allocator.
            if filtered.len() >= self.config.min_filtered_supply {
                results = filtered;
            } else {
                tracing::debug!(
                    kept = filtered.len(),
                    needed = self.config.min_filtered_supply,
                    "category post-filter too strict, keeping unfiltered results"
                );
            }
        }

        let size = results.len();
        store.replace_searched(results);
        tracing::info!(searched = size, "filtered search pool rebuilt");
        Ok(size)
    }

    /// Lazily populate the starter/dessert pool the first time a plan
    /// needs it. A no-op while the pool is non-empty (and for the main
    /// course, which is supplied by collections + filtered search).
    pub async fn ensure_course_pool<R: Rng>(
        &self,
        store: &mut CandidateStore,
        course: CourseType,
        rng: &mut R,
    ) -> Result<(), PlannerError> {
        let bank = match course {
            CourseType::Starter => terms::STARTER_SEARCH_TERMS,
            CourseType::Dessert => terms::DESSERT_SEARCH_TERMS,
            CourseType::Main => return Ok(()),
        };
        if !store.course_pool_is_empty(course) {
            return Ok(());
        }

        let terms = sample_terms(bank, self.config.max_course_terms, rng);
        let found = self
            .fan_out(&terms, self.config.hits_per_course_term, course, None)
            .await;

        let pool: CandidatePool = found.into_iter().collect();
        let size = pool.len();
        store.replace_course_pool(course, pool.candidates().to_vec());
        tracing::info!(course = %course, size, "typed pool loaded");
        Ok(())
    }

    /// Fill a candidate's display metadata from the recipe detail
    /// endpoint. Idempotent: a candidate that already carries thumbnail
    /// and image is returned unchanged without a network call, and
    /// present fields are never overwritten. Any fetch failure returns
    /// the candidate unchanged; enrichment must never block planning.
    pub async fn enrich(&self, mut candidate: RecipeCandidate) -> RecipeCandidate {
        if candidate.is_enriched() {
            return candidate;
        }
        match self.recipes.recipe_detail(&candidate.id).await {
            Ok(detail) => {
                if candidate.thumbnail.is_none() {
                    candidate.thumbnail = detail.thumbnail;
                }
                if candidate.image.is_none() {
                    candidate.image = detail.image;
                }
                if candidate.url.is_none() {
                    candidate.url = detail.url;
                }
            }
            Err(e) => {
                tracing::debug!(recipe_id = %candidate.id, error = %e, "enrichment failed");
            }
        }
        candidate
    }

    /// Enrich a batch of candidates as one concurrent batch.
    pub async fn enrich_all(&self, candidates: Vec<RecipeCandidate>) -> Vec<RecipeCandidate> {
        join_all(candidates.into_iter().map(|c| self.enrich(c))).await
    }

    /// Load all pages of one collection kind into the store. Returns the
    /// number of collections seen.
    async fn load_collection_kind(
        &self,
        store: &mut CandidateStore,
        kind: CollectionKind,
        source: Source,
    ) -> Result<usize, PlannerError> {
        let count = self.recipes.count_collections(kind).await?;
        let mut collections = Vec::new();
        for page in 0..count.pages {
            collections.extend(self.recipes.list_collections(kind, page).await?);
        }

        let seen = collections.len();
        for collection in collections {
            for chapter in collection.chapters {
                for recipe in chapter.recipes {
                    store.insert_main(RecipeCandidate::new(
                        recipe.id,
                        recipe.name,
                        recipe.total_time,
                        source,
                        collection.name.clone(),
                    ));
                }
            }
        }
        Ok(seen)
    }

    /// Dispatch one search per term as a single concurrent batch and join
    /// the classified candidates. A failing term logs and contributes
    /// nothing.
    async fn fan_out(
        &self,
        terms: &[String],
        hits_per_page: u32,
        course: CourseType,
        filters: Option<String>,
    ) -> Vec<RecipeCandidate> {
        let searches = terms.iter().map(|term| {
            let request = SearchRequest::new(term.clone(), hits_per_page)
                .with_filters(filters.clone());
            let search = Arc::clone(&self.search);
            async move {
                match search.search(&request).await {
                    Ok(response) => {
                        tracing::debug!(
                            term = %request.query,
                            course = %course,
                            hits = response.hits.len(),
                            "search term resolved"
                        );
                        response.hits
                    }
                    Err(e) => {
                        tracing::warn!(term = %request.query, error = %e, "search term failed");
                        Vec::new()
                    }
                }
            }
        });

        join_all(searches)
            .await
            .into_iter()
            .flatten()
            .filter_map(|hit| candidate_from_hit(&hit, &self.locale, course))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Hit conversion
// ---------------------------------------------------------------------------

/// Convert a raw search hit into a candidate for the given course, or
/// `None` when the hit is unusable or fails the course classification.
pub fn candidate_from_hit(
    hit: &SearchHit,
    locale: &Locale,
    course: CourseType,
) -> Option<RecipeCandidate> {
    if hit.id.is_empty() || hit.title.is_empty() {
        return None;
    }
    if !classify::matches_course(&hit.title, course) {
        return None;
    }

    let (thumbnail, image) = expand_image_template(hit.image.as_deref());

    Some(RecipeCandidate {
        id: hit.id.clone(),
        name: hit.title.clone(),
        total_time: hit.total_time_seconds(),
        source: Source::Searched,
        collection_name: SEARCH_COLLECTION_NAME.to_string(),
        thumbnail,
        image,
        url: Some(recipe_url(locale, &hit.id)),
        rating: hit.rating(),
    })
}

/// Expand the asset-host and transformation placeholders of a hit image
/// URL into concrete thumbnail/image URLs.
fn expand_image_template(raw: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return (None, None);
    };
    let url = raw.replace("{assethost}", ASSET_HOST);
    if url.contains("{transformation}") {
        let sized = url.replace("{transformation}", IMAGE_TRANSFORMATION);
        (Some(sized.clone()), Some(sized))
    } else {
        (Some(url.clone()), Some(url))
    }
}

// ---------------------------------------------------------------------------
// Term sampling
// ---------------------------------------------------------------------------

/// Random sample (without replacement) of up to `max` terms from a bank.
fn sample_terms<R: Rng>(bank: &[&str], max: usize, rng: &mut R) -> Vec<String> {
    bank.choose_multiple(rng, max.min(bank.len()))
        .map(|t| (*t).to_string())
        .collect()
}

/// Random sample (without replacement) of up to `max` owned terms.
fn sample_owned_terms<R: Rng>(terms: &[String], max: usize, rng: &mut R) -> Vec<String> {
    terms
        .choose_multiple(rng, max.min(terms.len()))
        .cloned()
        .collect()
}

/// Prepend filter expansions to a ten-term truncation of the current list.
fn prepend_truncated(extra: Vec<String>, current: Vec<String>) -> Vec<String> {
    let mut combined = extra;
    combined.extend(current.into_iter().take(10));
    combined
}
