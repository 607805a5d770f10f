//! Acquisition tests: pagination, dedup, low-supply backfill, the
//! relax-if-too-strict post-filter, lazy typed pools, and enrichment.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use rand::SeedableRng;
use rand::rngs::StdRng;

use larder_core::acquire::{PoolAcquirer, SearchFilters};
use larder_core::candidate::{CourseType, RecipeCandidate, Source};
use larder_core::locale::Locale;
use larder_core::services::{CollectionKind, RecipeDetail};
use larder_core::store::CandidateStore;
use larder_test_utils::{
    FakeRecipeService, FakeSearchService, collection, collection_recipe, search_hit,
    timed_search_hit,
};

fn locale() -> Locale {
    Locale {
        country: "de".to_string(),
        language: "de-DE".to_string(),
    }
}

fn acquirer(
    recipes: &Arc<FakeRecipeService>,
    search: &Arc<FakeSearchService>,
) -> PoolAcquirer {
    PoolAcquirer::new(Arc::clone(recipes) as _, Arc::clone(search) as _, locale())
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ===========================================================================
// load_collections
// ===========================================================================

#[tokio::test]
async fn collections_are_flattened_across_pages_and_chapters() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());

    recipes.add_page(
        CollectionKind::Custom,
        vec![collection(
            "Woche 1",
            (0..12)
                .map(|i| collection_recipe(&format!("p{i}"), &format!("Gericht {i}"), 1800))
                .collect(),
        )],
    );
    recipes.add_page(
        CollectionKind::Custom,
        vec![collection(
            "Woche 2",
            (12..22)
                .map(|i| collection_recipe(&format!("p{i}"), &format!("Gericht {i}"), 1800))
                .collect(),
        )],
    );
    recipes.add_page(
        CollectionKind::Managed,
        vec![collection(
            "Abo",
            vec![collection_recipe("c0", "Abo-Gericht", 1800)],
        )],
    );

    let mut store = CandidateStore::new();
    let counts = acquirer(&recipes, &search)
        .load_collections(&mut store, &mut rng())
        .await
        .unwrap();

    assert_eq!(counts.preferred_recipes, 22);
    assert_eq!(counts.curated_recipes, 1);
    assert_eq!(counts.preferred_collections, 2);
    assert_eq!(counts.curated_collections, 1);
    // 23 >= 20: no backfill.
    assert_eq!(counts.searched_recipes, 0);
    assert_eq!(search.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_ids_across_kinds_keep_the_first_occurrence() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());

    recipes.add_page(
        CollectionKind::Custom,
        vec![collection(
            "Eigene",
            vec![collection_recipe("r1", "Eigene Fassung", 1800)],
        )],
    );
    recipes.add_page(
        CollectionKind::Managed,
        vec![collection(
            "Abo",
            vec![collection_recipe("r1", "Abo-Fassung", 1800)],
        )],
    );

    let mut store = CandidateStore::new();
    let counts = acquirer(&recipes, &search)
        .load_collections(&mut store, &mut rng())
        .await
        .unwrap();

    assert_eq!(counts.preferred_recipes, 1);
    assert_eq!(counts.curated_recipes, 0);
    let pool = store.course_pool(CourseType::Main);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].source, Source::Preferred);
}

#[tokio::test]
async fn low_supply_triggers_the_search_backfill() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());

    recipes.add_page(
        CollectionKind::Custom,
        vec![collection(
            "Klein",
            vec![collection_recipe("p0", "Einziges Gericht", 1800)],
        )],
    );
    search.set_default_hits(vec![
        search_hit("s1", "Linsencurry"),
        search_hit("s2", "Gemüselasagne"),
        search_hit("p0", "Einziges Gericht"), // already collected: deduplicated
        search_hit("x1", "Schoko-Smoothie"),  // classified away for mains
    ]);

    let mut store = CandidateStore::new();
    let counts = acquirer(&recipes, &search)
        .load_collections(&mut store, &mut rng())
        .await
        .unwrap();

    assert_eq!(counts.preferred_recipes, 1);
    assert_eq!(counts.searched_recipes, 2);
    // Up to 20 terms are dispatched as one concurrent batch.
    assert_eq!(search.search_calls.load(Ordering::SeqCst), 20);
    assert!(!store.course_pool(CourseType::Main).iter().any(|c| c.id == "x1"));
}

#[tokio::test]
async fn backfilled_candidates_carry_search_metadata() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());
    search.set_default_hits(vec![timed_search_hit("s1", "Linsencurry", 2100.0)]);

    let mut store = CandidateStore::new();
    acquirer(&recipes, &search)
        .load_collections(&mut store, &mut rng())
        .await
        .unwrap();

    let pool = store.course_pool(CourseType::Main);
    assert_eq!(pool.len(), 1);
    let candidate = &pool[0];
    assert_eq!(candidate.source, Source::Searched);
    assert_eq!(candidate.total_time, 2100);
    assert_eq!(candidate.collection_name, "Cookidoo");
    assert_eq!(
        candidate.url.as_deref(),
        Some("https://cookidoo.de/recipes/recipe/de-DE/s1")
    );
}

// ===========================================================================
// search_with_filters
// ===========================================================================

#[tokio::test]
async fn filtered_search_excludes_collection_recipes() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());

    recipes.add_page(
        CollectionKind::Custom,
        vec![collection(
            "Eigene",
            vec![collection_recipe("dup", "Bekanntes Gericht", 1800)],
        )],
    );
    search.set_default_hits(vec![
        search_hit("dup", "Bekanntes Gericht"),
        search_hit("new", "Neues Gericht"),
    ]);

    let acquirer = acquirer(&recipes, &search);
    let mut store = CandidateStore::new();
    let mut rng = rng();
    acquirer.load_collections(&mut store, &mut rng).await.unwrap();

    let size = acquirer
        .search_with_filters(&mut store, &SearchFilters::default(), &mut rng)
        .await
        .unwrap();

    assert_eq!(size, 1);
    let pool = store.course_pool(CourseType::Main);
    assert_eq!(pool.iter().filter(|c| c.id == "dup").count(), 1);
    assert!(pool.iter().any(|c| c.id == "new"));
}

#[tokio::test]
async fn category_post_filter_applies_when_supply_remains() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());

    let mut hits: Vec<_> = (0..12)
        .map(|i| search_hit(&format!("v{i}"), &format!("Veganes Gericht {i}")))
        .collect();
    hits.push(search_hit("m1", "Rindsbraten"));
    search.set_default_hits(hits);

    let mut store = CandidateStore::new();
    let filters = SearchFilters {
        categories: vec!["vegan".to_string()],
        ..SearchFilters::default()
    };
    let size = acquirer(&recipes, &search)
        .search_with_filters(&mut store, &filters, &mut rng())
        .await
        .unwrap();

    // 12 vegan hits survive the post-filter; the roast is dropped.
    assert_eq!(size, 12);
    assert!(!store.course_pool(CourseType::Main).iter().any(|c| c.id == "m1"));
}

#[tokio::test]
async fn category_post_filter_is_relaxed_when_too_strict() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());

    // Only 3 hits match the category keywords: below the threshold of 10,
    // so the unfiltered result is kept.
    let mut hits: Vec<_> = (0..3)
        .map(|i| search_hit(&format!("v{i}"), &format!("Veganes Gericht {i}")))
        .collect();
    hits.extend((0..8).map(|i| search_hit(&format!("m{i}"), &format!("Braten {i}"))));
    search.set_default_hits(hits);

    let mut store = CandidateStore::new();
    let filters = SearchFilters {
        categories: vec!["vegan".to_string()],
        ..SearchFilters::default()
    };
    let size = acquirer(&recipes, &search)
        .search_with_filters(&mut store, &filters, &mut rng())
        .await
        .unwrap();

    assert_eq!(size, 11);
}

#[tokio::test]
async fn language_filters_reach_the_search_request() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());
    search.set_default_hits(vec![search_hit("s1", "Gericht")]);

    let mut store = CandidateStore::new();
    let filters = SearchFilters {
        languages: vec!["de-DE".to_string()],
        ..SearchFilters::default()
    };
    acquirer(&recipes, &search)
        .search_with_filters(&mut store, &filters, &mut rng())
        .await
        .unwrap();

    let request = search.last_request().expect("a search must have run");
    assert_eq!(request.filters.as_deref(), Some("language:de-DE"));
}

#[tokio::test]
async fn failing_searches_degrade_to_an_empty_pool() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());
    search.fail_all_searches();

    let mut store = CandidateStore::new();
    let size = acquirer(&recipes, &search)
        .search_with_filters(&mut store, &SearchFilters::default(), &mut rng())
        .await
        .unwrap();

    assert_eq!(size, 0);
}

// ===========================================================================
// ensure_course_pool
// ===========================================================================

#[tokio::test]
async fn typed_pools_load_lazily_and_only_once() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());
    search.set_default_hits(vec![
        search_hit("v1", "Minestrone"),
        search_hit("d1", "Apfelstrudel"),
        search_hit("m1", "Lasagne"),
    ]);

    let acquirer = acquirer(&recipes, &search);
    let mut store = CandidateStore::new();
    let mut rng = rng();

    acquirer
        .ensure_course_pool(&mut store, CourseType::Starter, &mut rng)
        .await
        .unwrap();
    let calls_after_first = search.search_calls.load(Ordering::SeqCst);
    assert_eq!(calls_after_first, 10);

    let starters = store.course_pool(CourseType::Starter);
    assert_eq!(starters.len(), 1);
    assert_eq!(starters[0].id, "v1");

    // Non-empty pool: the second ensure is a no-op.
    acquirer
        .ensure_course_pool(&mut store, CourseType::Starter, &mut rng)
        .await
        .unwrap();
    assert_eq!(search.search_calls.load(Ordering::SeqCst), calls_after_first);

    // The dessert pool is independent and classifies its own titles.
    acquirer
        .ensure_course_pool(&mut store, CourseType::Dessert, &mut rng)
        .await
        .unwrap();
    let desserts = store.course_pool(CourseType::Dessert);
    assert_eq!(desserts.len(), 1);
    assert_eq!(desserts[0].id, "d1");
}

// ===========================================================================
// Enrichment
// ===========================================================================

fn bare_candidate(id: &str) -> RecipeCandidate {
    RecipeCandidate::new(id, "Gericht", 1800, Source::Preferred, "Eigene")
}

#[tokio::test]
async fn enrichment_fills_missing_display_fields() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());
    recipes.set_detail(
        "r1",
        RecipeDetail {
            thumbnail: Some("https://img/thumb.jpg".to_string()),
            image: Some("https://img/full.jpg".to_string()),
            url: Some("https://portal/r1".to_string()),
        },
    );

    let enriched = acquirer(&recipes, &search).enrich(bare_candidate("r1")).await;

    assert_eq!(enriched.thumbnail.as_deref(), Some("https://img/thumb.jpg"));
    assert_eq!(enriched.image.as_deref(), Some("https://img/full.jpg"));
    assert_eq!(enriched.url.as_deref(), Some("https://portal/r1"));
    assert_eq!(recipes.detail_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn enrichment_is_idempotent_with_no_second_fetch() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());
    recipes.set_detail(
        "r1",
        RecipeDetail {
            thumbnail: Some("https://img/thumb.jpg".to_string()),
            image: Some("https://img/full.jpg".to_string()),
            url: Some("https://portal/r1".to_string()),
        },
    );

    let acquirer = acquirer(&recipes, &search);
    let once = acquirer.enrich(bare_candidate("r1")).await;
    let twice = acquirer.enrich(once.clone()).await;

    assert_eq!(once, twice);
    assert_eq!(
        recipes.detail_calls.load(Ordering::SeqCst),
        1,
        "an already-enriched candidate must not be fetched again"
    );
}

#[tokio::test]
async fn enrichment_failure_returns_the_candidate_unchanged() {
    let recipes = Arc::new(FakeRecipeService::new());
    let search = Arc::new(FakeSearchService::new());

    let original = bare_candidate("missing");
    let enriched = acquirer(&recipes, &search).enrich(original.clone()).await;

    assert_eq!(enriched, original);
}
