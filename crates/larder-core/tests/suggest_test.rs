//! Suggestion-resolver tests: the three fallback tiers and the tri-state
//! facet memo.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use larder_core::services::{FacetHit, IngredientEntry, SearchHit};
use larder_core::suggest::{FacetProbe, SuggestionResolver};
use larder_test_utils::FakeSearchService;

fn facet_hit(value: &str, count: u64) -> FacetHit {
    FacetHit {
        value: value.to_string(),
        count,
    }
}

fn hit_with_ingredients(id: &str, ingredients: &[&str]) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        title: "Rezept".to_string(),
        ingredient_list: Some(
            ingredients
                .iter()
                .map(|i| IngredientEntry::Text((*i).to_string()))
                .collect(),
        ),
        ..SearchHit::default()
    }
}

fn resolver(search: &Arc<FakeSearchService>) -> SuggestionResolver {
    SuggestionResolver::new(Arc::clone(search) as _)
}

// ===========================================================================
// Tier 1: facets
// ===========================================================================

#[tokio::test]
async fn first_answering_facet_is_used_and_memoized() {
    let search = Arc::new(FakeSearchService::new());
    search.set_facet(
        "ingredientNames",
        vec![facet_hit("Tomaten", 12), facet_hit("Tomatenmark", 5)],
    );

    let mut resolver = resolver(&search);
    let result = resolver.suggest("toma", 5).await;

    assert_eq!(result.count, 17);
    assert_eq!(result.suggestions, vec!["Tomaten", "Tomatenmark"]);
    assert_eq!(
        resolver.probe(),
        &FacetProbe::Confirmed("ingredientNames".to_string())
    );

    // The memoized name is probed directly on the next call.
    let calls_before = search.facet_calls.load(Ordering::SeqCst);
    resolver.suggest("gur", 5).await;
    assert_eq!(
        search.facet_calls.load(Ordering::SeqCst),
        calls_before + 1
    );
}

#[tokio::test]
async fn later_facet_candidates_are_probed_in_order() {
    let search = Arc::new(FakeSearchService::new());
    // Only the fourth candidate name answers.
    search.set_facet("ingredientList", vec![facet_hit("Tomaten", 3)]);

    let mut resolver = resolver(&search);
    let result = resolver.suggest("toma", 5).await;

    assert_eq!(result.suggestions, vec!["Tomaten"]);
    assert_eq!(
        resolver.probe(),
        &FacetProbe::Confirmed("ingredientList".to_string())
    );
    // ingredientNames, ingredients, ingredient failed; ingredientList hit.
    assert_eq!(search.facet_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn a_full_facet_miss_is_memoized_and_skipped_afterwards() {
    let search = Arc::new(FakeSearchService::new());
    search.set_default_hits(vec![hit_with_ingredients("r1", &["Tomaten"])]);

    let mut resolver = resolver(&search);
    resolver.suggest("toma", 5).await;

    assert_eq!(resolver.probe(), &FacetProbe::ConfirmedNone);
    assert_eq!(search.facet_calls.load(Ordering::SeqCst), 5);

    // No further probing once confirmed unavailable.
    resolver.suggest("toma", 5).await;
    assert_eq!(search.facet_calls.load(Ordering::SeqCst), 5);
}

// ===========================================================================
// Tier 2: ingredient fields
// ===========================================================================

#[tokio::test]
async fn field_tier_ranks_by_frequency_then_length() {
    let search = Arc::new(FakeSearchService::new());
    search.set_response(
        "toma",
        vec![
            hit_with_ingredients("r1", &["Tomaten", "Tomatenmark"]),
            hit_with_ingredients("r2", &["Tomaten"]),
        ],
        2,
    );

    let mut resolver = resolver(&search);
    let result = resolver.suggest("toma", 5).await;

    assert_eq!(result.count, 2);
    assert_eq!(result.suggestions, vec!["Tomaten", "Tomatenmark"]);
}

#[tokio::test]
async fn field_tier_requests_the_ingredient_attributes() {
    let search = Arc::new(FakeSearchService::new());
    search.set_default_hits(vec![hit_with_ingredients("r1", &["Tomaten"])]);

    let mut resolver = resolver(&search);
    resolver.suggest("toma", 5).await;

    let request = search.last_request().expect("fallback search must run");
    let attributes = request.attributes_to_retrieve.expect("attributes restricted");
    assert!(attributes.contains(&"ingredientList".to_string()));
    assert!(attributes.contains(&"title".to_string()));
    assert_eq!(request.hits_per_page, 20);
}

#[tokio::test]
async fn the_limit_caps_the_suggestions() {
    let search = Arc::new(FakeSearchService::new());
    search.set_default_hits(vec![hit_with_ingredients(
        "r1",
        &["Tomaten", "Tomatenmark", "Tomatensaft", "Tomatenpüree"],
    )]);

    let mut resolver = resolver(&search);
    let result = resolver.suggest("toma", 2).await;
    assert_eq!(result.suggestions.len(), 2);
}

// ===========================================================================
// Tier 3: title words
// ===========================================================================

#[tokio::test]
async fn title_tier_kicks_in_when_no_ingredient_fields_match() {
    let search = Arc::new(FakeSearchService::new());
    search.set_default_hits(vec![
        SearchHit {
            id: "r1".to_string(),
            title: "Tomatensuppe mit Basilikum".to_string(),
            ..SearchHit::default()
        },
        SearchHit {
            id: "r2".to_string(),
            title: "Gefüllte Tomaten (vegetarisch)".to_string(),
            ..SearchHit::default()
        },
    ]);

    let mut resolver = resolver(&search);
    let result = resolver.suggest("tomaten", 5).await;

    assert_eq!(result.suggestions, vec!["Tomaten", "Tomatensuppe"]);
}

// ===========================================================================
// Degradation
// ===========================================================================

#[tokio::test]
async fn short_queries_return_empty_without_any_service_call() {
    let search = Arc::new(FakeSearchService::new());
    let mut resolver = resolver(&search);

    let result = resolver.suggest(" t ", 5).await;

    assert_eq!(result.count, 0);
    assert!(result.suggestions.is_empty());
    assert_eq!(search.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(search.facet_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_failure_degrades_to_empty() {
    let search = Arc::new(FakeSearchService::new());
    search.fail_all_searches();

    let mut resolver = resolver(&search);
    let result = resolver.suggest("toma", 5).await;

    assert_eq!(result.count, 0);
    assert!(result.suggestions.is_empty());
}
