//! The consumed collaborator interfaces: recipe portal, recipe search
//! index, and external shopping list.
//!
//! Each trait is intentionally object-safe so adapters can be stored as
//! `Arc<dyn ...>` and swapped for in-memory fakes in tests. Adapters map
//! their transport failures to [`PlannerError::Upstream`]; callers decide
//! per call site whether to degrade or propagate.

pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::PlannerError;
use crate::locale::Locale;

pub use types::{
    CalendarDay, Chapter, Collection, CollectionCount, CollectionKind, CollectionRecipe,
    Credentials, FacetHit, IngredientEntry, IngredientLine, LoginInfo, RecipeDetail,
    SearchHit, SearchRequest, SearchResponse, ShoppingList,
};

/// The recipe portal: authentication, collections, recipe details, the
/// weekly calendar, and the portal's native shopping list.
#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Authenticate a portal session for the given locale.
    async fn login(
        &self,
        credentials: &Credentials,
        locale: &Locale,
    ) -> Result<LoginInfo, PlannerError>;

    /// Pagination summary for one collection kind.
    async fn count_collections(
        &self,
        kind: CollectionKind,
    ) -> Result<CollectionCount, PlannerError>;

    /// Fetch one page of collections of the given kind.
    async fn list_collections(
        &self,
        kind: CollectionKind,
        page: u32,
    ) -> Result<Vec<Collection>, PlannerError>;

    /// Fetch display metadata for one recipe.
    async fn recipe_detail(&self, recipe_id: &str) -> Result<RecipeDetail, PlannerError>;

    /// Add recipes to the calendar on the given day.
    async fn add_to_calendar(
        &self,
        day: NaiveDate,
        recipe_ids: &[String],
    ) -> Result<(), PlannerError>;

    /// The calendar contents for the week starting at `monday`.
    async fn calendar_week(&self, monday: NaiveDate) -> Result<Vec<CalendarDay>, PlannerError>;

    /// Remove one recipe from the calendar on the given day.
    async fn remove_from_calendar(
        &self,
        day: NaiveDate,
        recipe_id: &str,
    ) -> Result<(), PlannerError>;

    /// Ingredient lines for a set of recipes (for shopping-list export).
    async fn ingredients_for_recipes(
        &self,
        recipe_ids: &[String],
    ) -> Result<Vec<IngredientLine>, PlannerError>;

    /// Add the recipes' ingredients to the portal's native shopping list.
    /// Returns the number of items added.
    async fn add_to_shopping_list(&self, recipe_ids: &[String]) -> Result<usize, PlannerError>;
}

/// The recipe search index.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Discover and cache the session-scoped API key for the locale.
    ///
    /// Called once after login. Implementations without a key handshake
    /// may no-op.
    async fn prepare(&self, locale: &Locale) -> Result<(), PlannerError>;

    /// Run a free-text search.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, PlannerError>;

    /// Query distinct values of a facet attribute matching a partial
    /// string. Fails when the index does not expose the facet.
    async fn facet_query(
        &self,
        facet: &str,
        partial: &str,
        max_hits: u32,
    ) -> Result<Vec<FacetHit>, PlannerError>;
}

/// The external shopping-list service.
#[async_trait]
pub trait ShoppingService: Send + Sync {
    /// Authenticate against the shopping service.
    async fn login(&self, email: &str, password: &str) -> Result<(), PlannerError>;

    /// The user's shopping lists.
    async fn lists(&self) -> Result<Vec<ShoppingList>, PlannerError>;

    /// Add one item to a list.
    async fn add_item(
        &self,
        list_uuid: &str,
        name: &str,
        note: &str,
    ) -> Result<(), PlannerError>;
}

// Compile-time assertions: the service traits must stay object-safe.
const _: () = {
    fn _assert_object_safe(
        _: &dyn RecipeService,
        _: &dyn SearchService,
        _: &dyn ShoppingService,
    ) {
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    /// A trivial search service proving the trait can be implemented and
    /// used as `dyn SearchService`.
    struct NoopSearch;

    #[async_trait]
    impl SearchService for NoopSearch {
        async fn prepare(&self, _locale: &Locale) -> Result<(), PlannerError> {
            Ok(())
        }

        async fn search(
            &self,
            _request: &SearchRequest,
        ) -> Result<SearchResponse, PlannerError> {
            Ok(SearchResponse::default())
        }

        async fn facet_query(
            &self,
            _facet: &str,
            _partial: &str,
            _max_hits: u32,
        ) -> Result<Vec<FacetHit>, PlannerError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn search_service_is_object_safe() {
        let service: Box<dyn SearchService> = Box::new(NoopSearch);
        let response = service
            .search(&SearchRequest::new("Pasta", 40))
            .await
            .unwrap();
        assert!(response.hits.is_empty());
    }
}
