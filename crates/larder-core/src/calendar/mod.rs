//! Persisting a finished plan into the portal calendar and shopping lists.
//!
//! Saving follows a partial-success contract: each day is written
//! independently, failures are collected into the report next to the
//! successful rows, and the operation as a whole never aborts halfway.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::allocate::WeekPlan;
use crate::error::PlannerError;
use crate::services::{RecipeService, ShoppingService};
use crate::slot::SlotKey;

/// Report row label for shopping-list failures (matches the plan rows'
/// German day labels).
const SHOPPING_ROW: &str = "Einkaufsliste";

/// One successfully saved (day, slot) cell.
#[derive(Debug, Clone, Serialize)]
pub struct SavedSlot {
    pub day: String,
    pub slot: SlotKey,
    pub recipe: String,
}

/// One failed step of a save operation.
#[derive(Debug, Clone, Serialize)]
pub struct SaveError {
    pub day: String,
    pub error: String,
}

/// Outcome of saving a plan: successes and failures side by side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SaveReport {
    pub saved: Vec<SavedSlot>,
    pub errors: Vec<SaveError>,
    pub shopping_added: usize,
}

/// The Monday of the week `week_offset` weeks from today's week.
pub fn week_start(today: NaiveDate, week_offset: i32) -> NaiveDate {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    monday + Duration::weeks(i64::from(week_offset))
}

/// Write the plan's filled cells into the calendar week starting at
/// `monday`, one day at a time. Optionally pushes the saved recipes'
/// ingredients onto the portal's native shopping list afterwards.
pub async fn save_week(
    recipes: &dyn RecipeService,
    plan: &WeekPlan,
    monday: NaiveDate,
    add_to_shopping: bool,
) -> SaveReport {
    let mut report = SaveReport::default();
    let mut shopping_ids: Vec<String> = Vec::new();

    for (day, slots) in &plan.days {
        let recipe_ids: Vec<String> = slots
            .values()
            .flatten()
            .map(|c| c.id.clone())
            .collect();
        if recipe_ids.is_empty() {
            continue;
        }

        let date = monday + Duration::days(day.index() as i64);
        match recipes.add_to_calendar(date, &recipe_ids).await {
            Ok(()) => {
                for (slot, assignment) in slots {
                    if let Some(candidate) = assignment {
                        report.saved.push(SavedSlot {
                            day: day.label().to_string(),
                            slot: *slot,
                            recipe: candidate.name.clone(),
                        });
                        shopping_ids.push(candidate.id.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!(day = %day, error = %e, "calendar save failed for day");
                report.errors.push(SaveError {
                    day: day.label().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    if add_to_shopping && !shopping_ids.is_empty() {
        match recipes.add_to_shopping_list(&shopping_ids).await {
            Ok(added) => report.shopping_added = added,
            Err(e) => {
                tracing::warn!(error = %e, "shopping-list population failed");
                report.errors.push(SaveError {
                    day: SHOPPING_ROW.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Remove every recipe from the calendar week starting at `monday`.
/// Individual removals are best-effort; returns the number removed.
pub async fn clear_week(
    recipes: &dyn RecipeService,
    monday: NaiveDate,
) -> Result<usize, PlannerError> {
    let days = recipes.calendar_week(monday).await?;
    let mut removed = 0;

    for day in days {
        for recipe_id in day.recipe_ids {
            match recipes.remove_from_calendar(day.date, &recipe_id).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::debug!(date = %day.date, recipe_id = %recipe_id, error = %e,
                        "calendar removal failed");
                }
            }
        }
    }

    Ok(removed)
}

/// Push the ingredient lines of the given recipes onto an external
/// shopping list. Individual item failures are skipped; returns the
/// number of items added.
pub async fn push_to_shopping(
    recipes: &dyn RecipeService,
    shopping: &dyn ShoppingService,
    list_uuid: &str,
    recipe_ids: &[String],
) -> Result<usize, PlannerError> {
    let lines = recipes.ingredients_for_recipes(recipe_ids).await?;
    let mut added = 0;

    for line in lines {
        match shopping
            .add_item(list_uuid, &line.name, &line.description)
            .await
        {
            Ok(()) => added += 1,
            Err(e) => {
                tracing::warn!(item = %line.name, error = %e, "shopping item not added");
            }
        }
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_start_is_the_monday_of_the_current_week() {
        // 2026-08-05 is a Wednesday.
        let wednesday = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(
            week_start(wednesday, 0),
            NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
        );
    }

    #[test]
    fn week_start_applies_the_offset() {
        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        assert_eq!(
            week_start(monday, 1),
            NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()
        );
        assert_eq!(
            week_start(monday, -1),
            NaiveDate::from_ymd_opt(2026, 7, 27).unwrap()
        );
    }
}
