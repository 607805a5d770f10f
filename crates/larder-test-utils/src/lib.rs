//! Shared in-memory fakes for the larder service traits.
//!
//! Integration tests build a `PlannerContext` over these instead of the
//! HTTP adapters. Fixtures are mutex-held so tests configure them after
//! construction; call counters are atomics so tests can assert how often
//! an endpoint was hit (e.g. enrichment idempotence).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use larder_core::error::PlannerError;
use larder_core::locale::Locale;
use larder_core::services::{
    CalendarDay, Chapter, Collection, CollectionCount, CollectionKind, CollectionRecipe,
    Credentials, FacetHit, IngredientLine, LoginInfo, RecipeDetail, RecipeService, SearchHit,
    SearchRequest, SearchResponse, SearchService, ShoppingList, ShoppingService,
};

fn upstream(message: &str) -> PlannerError {
    PlannerError::Upstream(message.to_string())
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// A search hit with just id and title set.
pub fn search_hit(id: &str, title: &str) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        title: title.to_string(),
        ..SearchHit::default()
    }
}

/// A search hit with a total time in seconds.
pub fn timed_search_hit(id: &str, title: &str, total_time: f64) -> SearchHit {
    SearchHit {
        total_time: Some(total_time),
        ..search_hit(id, title)
    }
}

/// A collection recipe entry.
pub fn collection_recipe(id: &str, name: &str, total_time: u32) -> CollectionRecipe {
    CollectionRecipe {
        id: id.to_string(),
        name: name.to_string(),
        total_time,
    }
}

/// A single-chapter collection.
pub fn collection(name: &str, recipes: Vec<CollectionRecipe>) -> Collection {
    Collection {
        name: name.to_string(),
        chapters: vec![Chapter { recipes }],
    }
}

// ---------------------------------------------------------------------------
// FakeRecipeService
// ---------------------------------------------------------------------------

/// In-memory recipe portal.
#[derive(Default)]
pub struct FakeRecipeService {
    pages: Mutex<HashMap<CollectionKind, Vec<Vec<Collection>>>>,
    details: Mutex<HashMap<String, RecipeDetail>>,
    ingredients: Mutex<HashMap<String, Vec<IngredientLine>>>,
    calendar: Mutex<BTreeMap<NaiveDate, Vec<String>>>,
    failing_days: Mutex<HashSet<NaiveDate>>,
    reject_login: AtomicBool,
    fail_shopping: AtomicBool,
    pub detail_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
}

impl FakeRecipeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page of collections for a kind.
    pub fn add_page(&self, kind: CollectionKind, collections: Vec<Collection>) {
        self.pages
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push(collections);
    }

    /// Register the detail payload returned for a recipe id.
    pub fn set_detail(&self, recipe_id: &str, detail: RecipeDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(recipe_id.to_string(), detail);
    }

    /// Register ingredient lines for a recipe id.
    pub fn set_ingredients(&self, recipe_id: &str, lines: Vec<IngredientLine>) {
        self.ingredients
            .lock()
            .unwrap()
            .insert(recipe_id.to_string(), lines);
    }

    /// Make calendar writes fail for one date.
    pub fn fail_day(&self, date: NaiveDate) {
        self.failing_days.lock().unwrap().insert(date);
    }

    /// Make the next logins fail.
    pub fn reject_logins(&self) {
        self.reject_login.store(true, Ordering::SeqCst);
    }

    /// Make native shopping-list writes fail.
    pub fn fail_shopping_list(&self) {
        self.fail_shopping.store(true, Ordering::SeqCst);
    }

    /// The calendar contents accumulated by `add_to_calendar`.
    pub fn calendar_entries(&self) -> BTreeMap<NaiveDate, Vec<String>> {
        self.calendar.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecipeService for FakeRecipeService {
    async fn login(
        &self,
        credentials: &Credentials,
        _locale: &Locale,
    ) -> Result<LoginInfo, PlannerError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(upstream("login rejected"));
        }
        Ok(LoginInfo {
            username: credentials.email.clone(),
            subscription_active: true,
        })
    }

    async fn count_collections(
        &self,
        kind: CollectionKind,
    ) -> Result<CollectionCount, PlannerError> {
        let pages = self.pages.lock().unwrap();
        let kind_pages = pages.get(&kind).cloned().unwrap_or_default();
        Ok(CollectionCount {
            total: kind_pages.iter().map(|p| p.len() as u32).sum(),
            pages: kind_pages.len() as u32,
        })
    }

    async fn list_collections(
        &self,
        kind: CollectionKind,
        page: u32,
    ) -> Result<Vec<Collection>, PlannerError> {
        let pages = self.pages.lock().unwrap();
        Ok(pages
            .get(&kind)
            .and_then(|p| p.get(page as usize))
            .cloned()
            .unwrap_or_default())
    }

    async fn recipe_detail(&self, recipe_id: &str) -> Result<RecipeDetail, PlannerError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .unwrap()
            .get(recipe_id)
            .cloned()
            .ok_or_else(|| upstream("recipe detail not found"))
    }

    async fn add_to_calendar(
        &self,
        day: NaiveDate,
        recipe_ids: &[String],
    ) -> Result<(), PlannerError> {
        if self.failing_days.lock().unwrap().contains(&day) {
            return Err(upstream("calendar write failed"));
        }
        self.calendar
            .lock()
            .unwrap()
            .entry(day)
            .or_default()
            .extend_from_slice(recipe_ids);
        Ok(())
    }

    async fn calendar_week(&self, monday: NaiveDate) -> Result<Vec<CalendarDay>, PlannerError> {
        let calendar = self.calendar.lock().unwrap();
        Ok((0..7)
            .map(|offset| {
                let date = monday + Duration::days(offset);
                CalendarDay {
                    date,
                    recipe_ids: calendar.get(&date).cloned().unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn remove_from_calendar(
        &self,
        day: NaiveDate,
        recipe_id: &str,
    ) -> Result<(), PlannerError> {
        let mut calendar = self.calendar.lock().unwrap();
        let Some(ids) = calendar.get_mut(&day) else {
            return Err(upstream("no calendar entry for day"));
        };
        let Some(position) = ids.iter().position(|id| id == recipe_id) else {
            return Err(upstream("recipe not in calendar"));
        };
        ids.remove(position);
        Ok(())
    }

    async fn ingredients_for_recipes(
        &self,
        recipe_ids: &[String],
    ) -> Result<Vec<IngredientLine>, PlannerError> {
        let ingredients = self.ingredients.lock().unwrap();
        Ok(recipe_ids
            .iter()
            .flat_map(|id| ingredients.get(id).cloned().unwrap_or_default())
            .collect())
    }

    async fn add_to_shopping_list(&self, recipe_ids: &[String]) -> Result<usize, PlannerError> {
        if self.fail_shopping.load(Ordering::SeqCst) {
            return Err(upstream("shopping list unavailable"));
        }
        let ingredients = self.ingredients.lock().unwrap();
        Ok(recipe_ids
            .iter()
            .map(|id| ingredients.get(id).map_or(1, Vec::len))
            .sum())
    }
}

// ---------------------------------------------------------------------------
// FakeSearchService
// ---------------------------------------------------------------------------

/// In-memory search index.
#[derive(Default)]
pub struct FakeSearchService {
    responses: Mutex<HashMap<String, SearchResponse>>,
    default_response: Mutex<SearchResponse>,
    facets: Mutex<HashMap<String, Vec<FacetHit>>>,
    fail_searches: AtomicBool,
    pub search_calls: AtomicUsize,
    pub facet_calls: AtomicUsize,
    pub prepare_calls: AtomicUsize,
    last_request: Mutex<Option<SearchRequest>>,
}

impl FakeSearchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits returned for queries without a dedicated response.
    pub fn set_default_hits(&self, hits: Vec<SearchHit>) {
        let total_hits = hits.len() as u64;
        *self.default_response.lock().unwrap() = SearchResponse { hits, total_hits };
    }

    /// Response for one specific query string.
    pub fn set_response(&self, query: &str, hits: Vec<SearchHit>, total_hits: u64) {
        self.responses
            .lock()
            .unwrap()
            .insert(query.to_string(), SearchResponse { hits, total_hits });
    }

    /// Make a facet attribute answer with the given values. Facets
    /// without an entry fail, like an index that does not expose them.
    pub fn set_facet(&self, facet: &str, hits: Vec<FacetHit>) {
        self.facets.lock().unwrap().insert(facet.to_string(), hits);
    }

    /// Make every search fail.
    pub fn fail_all_searches(&self) {
        self.fail_searches.store(true, Ordering::SeqCst);
    }

    /// The most recent search request, if any.
    pub fn last_request(&self) -> Option<SearchRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchService for FakeSearchService {
    async fn prepare(&self, _locale: &Locale) -> Result<(), PlannerError> {
        self.prepare_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, PlannerError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if self.fail_searches.load(Ordering::SeqCst) {
            return Err(upstream("search unavailable"));
        }
        if let Some(response) = self.responses.lock().unwrap().get(&request.query) {
            return Ok(response.clone());
        }
        Ok(self.default_response.lock().unwrap().clone())
    }

    async fn facet_query(
        &self,
        facet: &str,
        _partial: &str,
        max_hits: u32,
    ) -> Result<Vec<FacetHit>, PlannerError> {
        self.facet_calls.fetch_add(1, Ordering::SeqCst);
        let facets = self.facets.lock().unwrap();
        let Some(hits) = facets.get(facet) else {
            return Err(upstream("facet not available"));
        };
        Ok(hits.iter().take(max_hits as usize).cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// FakeShoppingService
// ---------------------------------------------------------------------------

/// In-memory external shopping-list service.
#[derive(Default)]
pub struct FakeShoppingService {
    lists: Mutex<Vec<ShoppingList>>,
    added: Mutex<Vec<(String, String, String)>>,
    reject_login: AtomicBool,
    failing_items: Mutex<HashSet<String>>,
}

impl FakeShoppingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_list(&self, uuid: &str, name: &str) {
        self.lists.lock().unwrap().push(ShoppingList {
            uuid: uuid.to_string(),
            name: name.to_string(),
        });
    }

    pub fn reject_logins(&self) {
        self.reject_login.store(true, Ordering::SeqCst);
    }

    /// Make adding one specific item name fail.
    pub fn fail_item(&self, name: &str) {
        self.failing_items.lock().unwrap().insert(name.to_string());
    }

    /// Items added so far, as (list_uuid, name, note).
    pub fn added_items(&self) -> Vec<(String, String, String)> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShoppingService for FakeShoppingService {
    async fn login(&self, _email: &str, _password: &str) -> Result<(), PlannerError> {
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(upstream("shopping login rejected"));
        }
        Ok(())
    }

    async fn lists(&self) -> Result<Vec<ShoppingList>, PlannerError> {
        Ok(self.lists.lock().unwrap().clone())
    }

    async fn add_item(
        &self,
        list_uuid: &str,
        name: &str,
        note: &str,
    ) -> Result<(), PlannerError> {
        if self.failing_items.lock().unwrap().contains(name) {
            return Err(upstream("item rejected"));
        }
        self.added.lock().unwrap().push((
            list_uuid.to_string(),
            name.to_string(),
            note.to_string(),
        ));
        Ok(())
    }
}
