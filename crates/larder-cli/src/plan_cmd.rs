//! The `larder plan` command: generate, render, and optionally persist a
//! weekly plan.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use larder_core::acquire::SearchFilters;
use larder_core::allocate::{AllocationOptions, AllocationRequest, WeekPlan};
use larder_core::calendar::SaveReport;
use larder_core::slot::{SlotKey, WEEKDAYS, Weekday};
use larder_http::HttpShoppingService;

use crate::config::{self, ResolvedPortal};
use crate::session::{self, with_deadline};

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Days to plan, comma-separated (e.g. "mon,wed,fri"; default: all)
    #[arg(long)]
    pub days: Option<String>,

    /// Slots to fill per day, comma-separated slot keys
    /// (m_v, m, m_d, a_v, a, a_d)
    #[arg(long, default_value = "m,a")]
    pub slots: String,

    /// Percentage of main slots drawn from your own collections (0-100)
    #[arg(long, default_value_t = 70)]
    pub ratio: u8,

    /// Cook-time ceiling for midday slots, in minutes
    #[arg(long)]
    pub midday_max: Option<u32>,

    /// Cook-time ceiling for evening slots, in minutes
    #[arg(long)]
    pub evening_max: Option<u32>,

    /// Ingredient term to exclude (repeatable)
    #[arg(long = "exclude-ingredient")]
    pub exclude_ingredients: Vec<String>,

    /// Recipe id to exclude, e.g. last week's picks (repeatable)
    #[arg(long = "exclude-id")]
    pub exclude_ids: Vec<String>,

    /// Category filter for the search pool (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Cuisine filter for the search pool (repeatable)
    #[arg(long = "cuisine")]
    pub cuisines: Vec<String>,

    /// Preferred ingredient to search for (repeatable)
    #[arg(long = "ingredient")]
    pub ingredients: Vec<String>,

    /// Restrict search hits to a language tag (repeatable)
    #[arg(long = "language-filter")]
    pub languages: Vec<String>,

    /// Save the plan into the portal calendar
    #[arg(long)]
    pub save: bool,

    /// Week to save into, relative to the current week
    #[arg(long, default_value_t = 0)]
    pub week_offset: i32,

    /// Clear the target calendar week before saving
    #[arg(long)]
    pub clear_first: bool,

    /// Also push ingredients onto the portal's native shopping list
    #[arg(long)]
    pub native_shopping: bool,

    /// Push ingredients onto this external shopping list (list UUID)
    #[arg(long)]
    pub bring_list: Option<String>,

    /// Print the plan as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Execute the `larder plan` command.
pub async fn run_plan(args: &PlanArgs, portal: &ResolvedPortal) -> Result<()> {
    let days = parse_days(args.days.as_deref())?;
    let slots = parse_slots(&args.slots)?;

    let mut session = session::open(portal).await?;

    let counts = with_deadline(session.context.acquire_pools()).await?;
    tracing::info!(
        preferred = counts.preferred_recipes,
        curated = counts.curated_recipes,
        searched = counts.searched_recipes,
        "pools acquired"
    );

    let filters = SearchFilters {
        categories: args.categories.clone(),
        cuisines: args.cuisines.clone(),
        preferred_ingredients: args.ingredients.clone(),
        languages: args.languages.clone(),
    };
    if filters.is_active() {
        let size = with_deadline(session.context.refresh_search(&filters)).await?;
        tracing::info!(searched = size, "search pool refreshed for filters");
    }

    let mut request = AllocationRequest::new();
    for day in &days {
        request.insert(*day, &slots);
    }
    let options = AllocationOptions {
        preferred_ratio: args.ratio.min(100),
        exclude_ids: args.exclude_ids.iter().cloned().collect::<HashSet<_>>(),
        midday_max_minutes: args.midday_max,
        evening_max_minutes: args.evening_max,
        exclude_ingredients: args.exclude_ingredients.clone(),
    };

    let plan = with_deadline(session.context.allocate_plan(&request, &options)).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        render_plan(&plan);
    }

    if args.save {
        save_plan(&mut session, &plan, args).await?;
    }

    Ok(())
}

/// Persist a generated plan per the command's save flags.
async fn save_plan(
    session: &mut session::Session,
    plan: &WeekPlan,
    args: &PlanArgs,
) -> Result<()> {
    if args.clear_first {
        let removed = with_deadline(session.context.clear_week(args.week_offset)).await?;
        println!("Removed {removed} recipes from the target week.");
    }

    let report =
        with_deadline(session.context.save_week(plan, args.week_offset, args.native_shopping))
            .await?;
    render_report(&report);

    if let Some(list_uuid) = &args.bring_list {
        let shopping = config::resolve_shopping()
            .context("--bring-list requires shopping credentials")?;
        let service = Arc::new(HttpShoppingService::new(session.client.clone()));
        with_deadline(session.context.connect_shopping(
            service,
            &shopping.email,
            &shopping.password,
        ))
        .await?;
        let added =
            with_deadline(session.context.push_plan_to_shopping(list_uuid, plan)).await?;
        println!("Added {added} items to the shopping list.");
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Argument parsing
// -----------------------------------------------------------------------

/// Parse a comma-separated day list; `None` selects the whole week.
pub fn parse_days(spec: Option<&str>) -> Result<Vec<Weekday>> {
    let Some(spec) = spec else {
        return Ok(WEEKDAYS.to_vec());
    };
    let mut days = Vec::new();
    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let day: Weekday = token
            .parse()
            .with_context(|| format!("invalid day {token:?}"))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

/// Parse a comma-separated slot-key list.
pub fn parse_slots(spec: &str) -> Result<Vec<SlotKey>> {
    let mut slots = Vec::new();
    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let slot: SlotKey = token
            .parse()
            .with_context(|| format!("invalid slot key {token:?}"))?;
        if !slots.contains(&slot) {
            slots.push(slot);
        }
    }
    Ok(slots)
}

// -----------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------

fn render_plan(plan: &WeekPlan) {
    for (day, slots) in &plan.days {
        println!("{}", day.label());
        for (slot, assignment) in slots {
            match assignment {
                Some(recipe) => println!(
                    "  {:<4} {} ({}) [{}]",
                    slot.as_str(),
                    recipe.name,
                    recipe.total_time_label(),
                    recipe.source
                ),
                None => println!("  {:<4} (kein Rezept verfügbar)", slot.as_str()),
            }
        }
    }
}

fn render_report(report: &SaveReport) {
    println!("Saved {} recipes to the calendar.", report.saved.len());
    if report.shopping_added > 0 {
        println!(
            "Added {} items to the portal shopping list.",
            report.shopping_added
        );
    }
    for error in &report.errors {
        println!("  {}: {}", error.day, error.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_days_cover_the_week() {
        assert_eq!(parse_days(None).unwrap().len(), 7);
    }

    #[test]
    fn days_parse_and_deduplicate() {
        let days = parse_days(Some("mon, wed,mon")).unwrap();
        assert_eq!(days, vec![Weekday::Monday, Weekday::Wednesday]);
    }

    #[test]
    fn invalid_day_is_an_error() {
        assert!(parse_days(Some("funday")).is_err());
    }

    #[test]
    fn slots_parse_slot_keys() {
        let slots = parse_slots("m,a,m_d").unwrap();
        assert_eq!(
            slots,
            vec![SlotKey::MiddayMain, SlotKey::EveningMain, SlotKey::MiddayDessert]
        );
    }

    #[test]
    fn invalid_slot_is_an_error() {
        assert!(parse_slots("m,breakfast").is_err());
    }
}
