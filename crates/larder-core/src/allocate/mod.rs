//! Plan allocation: fills a day × slot grid from the candidate store.
//!
//! Slots are processed in the fixed canonical order ([`SLOT_ORDER`]), not
//! grid order, so scarcity behaves reproducibly: a scarce starter pool is
//! drawn from before the meal's main course enlarges the dedup set, and
//! repeated runs with the same seed select the same recipes.
//! Under-supply degrades to absent slots; it is never an error.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;

use crate::acquire::PoolAcquirer;
use crate::candidate::{CourseType, RecipeCandidate, Source};
use crate::slot::{MealTime, SLOT_ORDER, SlotKey, Weekday};
use crate::store::{CandidateStore, filter_by_ingredients, filter_by_time};

// ---------------------------------------------------------------------------
// Request / options
// ---------------------------------------------------------------------------

/// Which slots to fill on which days.
#[derive(Debug, Clone, Default)]
pub struct AllocationRequest {
    days: BTreeMap<Weekday, Vec<SlotKey>>,
}

impl AllocationRequest {
    /// An empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the given slots for a day (builder form).
    pub fn with_day(mut self, day: Weekday, slots: &[SlotKey]) -> Self {
        self.insert(day, slots);
        self
    }

    /// Request the given slots for a day.
    pub fn insert(&mut self, day: Weekday, slots: &[SlotKey]) {
        self.days.entry(day).or_default().extend_from_slice(slots);
    }

    /// Whether any slot is requested at all.
    pub fn is_empty(&self) -> bool {
        self.days.values().all(|slots| slots.is_empty())
    }

    /// The requested day → slots mapping.
    pub fn days(&self) -> &BTreeMap<Weekday, Vec<SlotKey>> {
        &self.days
    }

    /// Every course requested anywhere in the grid.
    pub fn courses(&self) -> HashSet<CourseType> {
        self.days
            .values()
            .flatten()
            .map(|slot| slot.course())
            .collect()
    }

    /// The days requesting a slot key, in week order.
    fn days_for_slot(&self, slot: SlotKey) -> Vec<Weekday> {
        self.days
            .iter()
            .filter(|(_, slots)| slots.contains(&slot))
            .map(|(day, _)| *day)
            .collect()
    }
}

/// Constraints applied to a full-grid allocation.
#[derive(Debug, Clone)]
pub struct AllocationOptions {
    /// Target percentage of main slots drawn from the preferred source
    /// (0-100), honored as far as supply allows.
    pub preferred_ratio: u8,
    /// Recipe ids never to select (e.g. last week's plan).
    pub exclude_ids: HashSet<String>,
    /// Cook-time ceiling for midday slots, in minutes.
    pub midday_max_minutes: Option<u32>,
    /// Cook-time ceiling for evening slots, in minutes.
    pub evening_max_minutes: Option<u32>,
    /// Ingredient terms that must not appear in a selected recipe name.
    pub exclude_ingredients: Vec<String>,
}

impl Default for AllocationOptions {
    fn default() -> Self {
        Self {
            preferred_ratio: 70,
            exclude_ids: HashSet::new(),
            midday_max_minutes: None,
            evening_max_minutes: None,
            exclude_ingredients: Vec::new(),
        }
    }
}

impl AllocationOptions {
    /// The effective ceiling for a meal time.
    fn ceiling(&self, meal: MealTime) -> Option<u32> {
        match meal {
            MealTime::Midday => self.midday_max_minutes,
            MealTime::Evening => self.evening_max_minutes,
        }
    }
}

/// Constraints for drawing one recipe (reroll of a single slot).
#[derive(Debug, Clone)]
pub struct SingleOptions {
    pub preferred_ratio: u8,
    pub exclude_ids: HashSet<String>,
    pub max_minutes: Option<u32>,
    pub exclude_ingredients: Vec<String>,
}

impl Default for SingleOptions {
    fn default() -> Self {
        Self {
            preferred_ratio: 70,
            exclude_ids: HashSet::new(),
            max_minutes: None,
            exclude_ingredients: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// The slots of one day: requested slot keys mapped to their assignment
/// (absent = unfilled).
pub type DayPlan = BTreeMap<SlotKey, Option<RecipeCandidate>>;

/// A generated weekly plan, owned by the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeekPlan {
    pub days: BTreeMap<Weekday, DayPlan>,
}

impl WeekPlan {
    /// The assignment for a (day, slot) cell, if the cell was requested
    /// and filled.
    pub fn get(&self, day: Weekday, slot: SlotKey) -> Option<&RecipeCandidate> {
        self.days.get(&day)?.get(&slot)?.as_ref()
    }

    /// Every filled cell in (day, slot) order.
    pub fn filled(&self) -> impl Iterator<Item = (Weekday, SlotKey, &RecipeCandidate)> {
        self.days.iter().flat_map(|(day, slots)| {
            slots
                .iter()
                .filter_map(|(slot, assignment)| assignment.as_ref().map(|c| (*day, *slot, c)))
        })
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        self.filled().count()
    }

    /// Ids of every assigned recipe.
    pub fn recipe_ids(&self) -> Vec<String> {
        self.filled().map(|(_, _, c)| c.id.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Fill the requested grid from the store's pools.
///
/// For each slot key in canonical order: the backing pool is narrowed by
/// the meal-time ceiling, the ingredient exclusions, the caller's exclude
/// set, and everything already assigned in this run; main slots are then
/// drawn per the preferred/other ratio (shrinking whichever sub-pool is
/// undersupplied and growing the other, never exceeding availability),
/// starter/dessert slots uniformly. The combined selection is shuffled so
/// which day receives a preferred recipe is random, enriched as one
/// concurrent batch, and assigned in week order. Days beyond the number
/// of available selections stay absent.
///
/// The starter/dessert pools must already be ensured by the caller (the
/// planner context does this for every course the request names).
pub async fn generate_plan<R: Rng>(
    store: &CandidateStore,
    acquirer: &PoolAcquirer,
    request: &AllocationRequest,
    options: &AllocationOptions,
    rng: &mut R,
) -> WeekPlan {
    let mut plan = WeekPlan::default();
    for (day, slots) in request.days() {
        let day_plan: DayPlan = slots.iter().map(|slot| (*slot, None)).collect();
        plan.days.insert(*day, day_plan);
    }

    let mut seen: HashSet<String> = HashSet::new();

    for slot in SLOT_ORDER {
        let days = request.days_for_slot(slot);
        if days.is_empty() {
            continue;
        }
        let n = days.len();

        let pool = store.pool_for(slot);
        let filtered = filter_by_time(pool, options.ceiling(slot.meal_time()));
        let filtered = filter_by_ingredients(filtered, &options.exclude_ingredients);
        let available: Vec<RecipeCandidate> = filtered
            .into_iter()
            .filter(|c| !options.exclude_ids.contains(&c.id) && !seen.contains(&c.id))
            .collect();

        let mut selected = match slot.course() {
            CourseType::Main => select_mains(available, n, options.preferred_ratio, rng),
            CourseType::Starter | CourseType::Dessert => sample(available, n, rng),
        };
        selected.shuffle(rng);

        let enriched = acquirer.enrich_all(selected).await;
        for candidate in &enriched {
            seen.insert(candidate.id.clone());
        }

        tracing::debug!(
            slot = %slot,
            requested = n,
            assigned = enriched.len(),
            "slot allocated"
        );

        for (i, day) in days.iter().enumerate() {
            if let Some(day_plan) = plan.days.get_mut(day) {
                day_plan.insert(slot, enriched.get(i).cloned());
            }
        }
    }

    plan
}

/// Draw a single recipe for one slot (the n = 1 specialization).
///
/// For mains, a weighted coin flip decides preferred vs. other, falling
/// back to whichever sub-pool is non-empty; starters/desserts draw
/// uniformly. Returns `None` when nothing is available.
pub async fn generate_single<R: Rng>(
    store: &CandidateStore,
    acquirer: &PoolAcquirer,
    course: CourseType,
    options: &SingleOptions,
    rng: &mut R,
) -> Option<RecipeCandidate> {
    let pool = store.course_pool(course);
    let filtered = filter_by_time(pool, options.max_minutes);
    let filtered = filter_by_ingredients(filtered, &options.exclude_ingredients);
    let available: Vec<RecipeCandidate> = filtered
        .into_iter()
        .filter(|c| !options.exclude_ids.contains(&c.id))
        .collect();

    let picked = match course {
        CourseType::Main => {
            let (preferred, other): (Vec<_>, Vec<_>) = available
                .into_iter()
                .partition(|c| c.source == Source::Preferred);
            let use_preferred =
                rng.random_range(1..=100u32) <= u32::from(options.preferred_ratio);
            if use_preferred && !preferred.is_empty() {
                preferred.choose(rng).cloned()
            } else if !other.is_empty() {
                other.choose(rng).cloned()
            } else if !preferred.is_empty() {
                preferred.choose(rng).cloned()
            } else {
                None
            }
        }
        CourseType::Starter | CourseType::Dessert => available.choose(rng).cloned(),
    };

    match picked {
        Some(candidate) => Some(acquirer.enrich(candidate).await),
        None => None,
    }
}

// ---------------------------------------------------------------------------
// Selection helpers
// ---------------------------------------------------------------------------

/// The ratio's target number of preferred selections for `n` main slots.
pub fn preferred_target(n: usize, ratio: u8) -> usize {
    (((n as f64) * f64::from(ratio) / 100.0).round() as usize).min(n)
}

/// Select up to `n` mains honoring the preferred/other ratio as far as
/// supply allows: an undersupplied sub-pool shrinks its target and the
/// other sub-pool grows correspondingly, capped by its own availability.
fn select_mains<R: Rng>(
    available: Vec<RecipeCandidate>,
    n: usize,
    ratio: u8,
    rng: &mut R,
) -> Vec<RecipeCandidate> {
    let (preferred, other): (Vec<_>, Vec<_>) = available
        .into_iter()
        .partition(|c| c.source == Source::Preferred);

    let mut n_preferred = preferred_target(n, ratio);
    let mut n_other = n - n_preferred;

    if preferred.len() < n_preferred {
        n_preferred = preferred.len();
        n_other = n - n_preferred;
    }
    if other.len() < n_other {
        n_other = other.len();
        n_preferred = preferred.len().min(n - n_other);
    }

    let mut selected = sample(preferred, n_preferred, rng);
    selected.extend(sample(other, n_other, rng));
    selected
}

/// Uniform sample without replacement of up to `k` candidates.
fn sample<R: Rng>(pool: Vec<RecipeCandidate>, k: usize, rng: &mut R) -> Vec<RecipeCandidate> {
    pool.choose_multiple(rng, k.min(pool.len()))
        .cloned()
        .collect()
}
