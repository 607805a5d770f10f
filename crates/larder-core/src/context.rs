//! The per-session planner context.
//!
//! One `PlannerContext` per user session, owned by the caller and passed
//! through the boundary; there is no global state. The caller serializes
//! access (one in-flight operation at a time per session); the context
//! itself never runs two operations concurrently.

use std::sync::Arc;

use chrono::Local;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::acquire::{AcquireConfig, CollectionCounts, PoolAcquirer, SearchFilters};
use crate::allocate::{
    self, AllocationOptions, AllocationRequest, SingleOptions, WeekPlan,
};
use crate::calendar::{self, SaveReport, week_start};
use crate::candidate::{CourseType, RecipeCandidate};
use crate::error::PlannerError;
use crate::locale::{Locale, resolve_localization};
use crate::services::{
    Credentials, LoginInfo, RecipeService, SearchService, ShoppingList, ShoppingService,
};
use crate::store::{CandidateStore, PoolCounts};
use crate::suggest::{SuggestionResolver, Suggestions};

/// Session state for one user: services, pools, facet memo, and the
/// random source driving selection.
pub struct PlannerContext {
    recipes: Arc<dyn RecipeService>,
    search: Arc<dyn SearchService>,
    shopping: Option<Arc<dyn ShoppingService>>,
    store: CandidateStore,
    acquirer: Option<PoolAcquirer>,
    resolver: SuggestionResolver,
    config: AcquireConfig,
    rng: StdRng,
}

impl PlannerContext {
    /// Create a context with an OS-seeded random source.
    pub fn new(recipes: Arc<dyn RecipeService>, search: Arc<dyn SearchService>) -> Self {
        Self::with_rng(recipes, search, StdRng::from_os_rng())
    }

    /// Create a context with a caller-provided random source (tests seed
    /// this for reproducible selections).
    pub fn with_rng(
        recipes: Arc<dyn RecipeService>,
        search: Arc<dyn SearchService>,
        rng: StdRng,
    ) -> Self {
        let resolver = SuggestionResolver::new(Arc::clone(&search));
        Self {
            recipes,
            search,
            shopping: None,
            store: CandidateStore::new(),
            acquirer: None,
            resolver,
            config: AcquireConfig::default(),
            rng,
        }
    }

    /// Override the acquisition tunables for this session.
    pub fn with_config(mut self, config: AcquireConfig) -> Self {
        self.config = config;
        self
    }

    /// Whether a portal login succeeded in this session.
    pub fn is_logged_in(&self) -> bool {
        self.acquirer.is_some()
    }

    /// The session locale, once logged in.
    pub fn locale(&self) -> Option<&Locale> {
        self.acquirer.as_ref().map(PoolAcquirer::locale)
    }

    /// Current pool sizes.
    pub fn pool_counts(&self) -> PoolCounts {
        self.store.counts()
    }

    /// Log in to the recipe portal, resolve the locale, and prepare the
    /// search session. Clears all pools and the facet memo: a fresh login
    /// starts a fresh planning session.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        country: &str,
        language: &str,
    ) -> Result<LoginInfo, PlannerError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(PlannerError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let locale = resolve_localization(country, language)?;
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let info = self.recipes.login(&credentials, &locale).await?;

        // Key discovery is best-effort: without it, searches degrade to
        // empty results instead of blocking the session.
        if let Err(e) = self.search.prepare(&locale).await {
            tracing::warn!(error = %e, "search session preparation failed");
        }

        self.store.clear_all();
        self.resolver.reset();
        self.acquirer = Some(
            PoolAcquirer::new(
                Arc::clone(&self.recipes),
                Arc::clone(&self.search),
                locale,
            )
            .with_config(self.config.clone()),
        );

        tracing::info!(username = %info.username, "portal login succeeded");
        Ok(info)
    }

    /// Build the preferred/curated pools from the user's collections,
    /// backfilling from search when supply is low.
    pub async fn acquire_pools(&mut self) -> Result<CollectionCounts, PlannerError> {
        let acquirer = self.acquirer.as_ref().ok_or(PlannerError::NotAuthenticated)?;
        acquirer
            .load_collections(&mut self.store, &mut self.rng)
            .await
    }

    /// Rebuild the searched main pool for the given filter selections.
    pub async fn refresh_search(&mut self, filters: &SearchFilters) -> Result<usize, PlannerError> {
        let acquirer = self.acquirer.as_ref().ok_or(PlannerError::NotAuthenticated)?;
        acquirer
            .search_with_filters(&mut self.store, filters, &mut self.rng)
            .await
    }

    /// Generate a weekly plan for the requested grid.
    pub async fn allocate_plan(
        &mut self,
        request: &AllocationRequest,
        options: &AllocationOptions,
    ) -> Result<WeekPlan, PlannerError> {
        let acquirer = self.acquirer.as_ref().ok_or(PlannerError::NotAuthenticated)?;
        if request.is_empty() {
            return Ok(WeekPlan::default());
        }

        for course in request.courses() {
            acquirer
                .ensure_course_pool(&mut self.store, course, &mut self.rng)
                .await?;
        }

        Ok(allocate::generate_plan(&self.store, acquirer, request, options, &mut self.rng).await)
    }

    /// Draw a single recipe for one slot (reroll).
    pub async fn allocate_single(
        &mut self,
        course: CourseType,
        options: &SingleOptions,
    ) -> Result<Option<RecipeCandidate>, PlannerError> {
        let acquirer = self.acquirer.as_ref().ok_or(PlannerError::NotAuthenticated)?;
        acquirer
            .ensure_course_pool(&mut self.store, course, &mut self.rng)
            .await?;
        Ok(allocate::generate_single(&self.store, acquirer, course, options, &mut self.rng).await)
    }

    /// Ranked ingredient-name suggestions for a partial query. Degrades
    /// to an empty result on any upstream failure.
    pub async fn suggest_ingredients(&mut self, query: &str, limit: usize) -> Suggestions {
        self.resolver.suggest(query, limit).await
    }

    /// Save a plan into the calendar week `week_offset` weeks from now.
    pub async fn save_week(
        &self,
        plan: &WeekPlan,
        week_offset: i32,
        add_to_shopping: bool,
    ) -> Result<SaveReport, PlannerError> {
        if !self.is_logged_in() {
            return Err(PlannerError::NotAuthenticated);
        }
        let monday = week_start(Local::now().date_naive(), week_offset);
        Ok(calendar::save_week(self.recipes.as_ref(), plan, monday, add_to_shopping).await)
    }

    /// Clear the calendar week `week_offset` weeks from now.
    pub async fn clear_week(&self, week_offset: i32) -> Result<usize, PlannerError> {
        if !self.is_logged_in() {
            return Err(PlannerError::NotAuthenticated);
        }
        let monday = week_start(Local::now().date_naive(), week_offset);
        calendar::clear_week(self.recipes.as_ref(), monday).await
    }

    /// Connect the external shopping service and list its shopping lists.
    pub async fn connect_shopping(
        &mut self,
        service: Arc<dyn ShoppingService>,
        email: &str,
        password: &str,
    ) -> Result<Vec<ShoppingList>, PlannerError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(PlannerError::Validation(
                "shopping email and password are required".to_string(),
            ));
        }
        service.login(email.trim(), password).await?;
        let lists = service.lists().await?;
        self.shopping = Some(service);
        Ok(lists)
    }

    /// Push the plan's ingredient lines onto a connected shopping list.
    pub async fn push_plan_to_shopping(
        &self,
        list_uuid: &str,
        plan: &WeekPlan,
    ) -> Result<usize, PlannerError> {
        if !self.is_logged_in() {
            return Err(PlannerError::NotAuthenticated);
        }
        let shopping = self
            .shopping
            .as_deref()
            .ok_or(PlannerError::NotAuthenticated)?;
        let recipe_ids = plan.recipe_ids();
        calendar::push_to_shopping(self.recipes.as_ref(), shopping, list_uuid, &recipe_ids).await
    }
}
