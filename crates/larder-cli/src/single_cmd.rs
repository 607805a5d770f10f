//! The `larder single` command: draw one recipe for a slot (reroll).

use std::collections::HashSet;

use anyhow::{Context, Result};
use clap::Args;

use larder_core::allocate::SingleOptions;
use larder_core::candidate::CourseType;

use crate::config::ResolvedPortal;
use crate::session::{self, with_deadline};

#[derive(Debug, Args)]
pub struct SingleArgs {
    /// Course to draw for: starter, main, or dessert
    #[arg(long, default_value = "main")]
    pub course: String,

    /// Percentage chance of drawing from your own collections (0-100)
    #[arg(long, default_value_t = 70)]
    pub ratio: u8,

    /// Cook-time ceiling in minutes
    #[arg(long)]
    pub max_minutes: Option<u32>,

    /// Ingredient term to exclude (repeatable)
    #[arg(long = "exclude-ingredient")]
    pub exclude_ingredients: Vec<String>,

    /// Recipe id to exclude (repeatable)
    #[arg(long = "exclude-id")]
    pub exclude_ids: Vec<String>,

    /// Print the recipe as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Execute the `larder single` command.
pub async fn run_single(args: &SingleArgs, portal: &ResolvedPortal) -> Result<()> {
    let course: CourseType = args
        .course
        .parse()
        .with_context(|| format!("invalid course {:?}", args.course))?;

    let mut session = session::open(portal).await?;

    // Main-course supply comes from the collections; starters and
    // desserts are ensured lazily by the draw itself.
    if course == CourseType::Main {
        with_deadline(session.context.acquire_pools()).await?;
    }

    let options = SingleOptions {
        preferred_ratio: args.ratio.min(100),
        exclude_ids: args.exclude_ids.iter().cloned().collect::<HashSet<_>>(),
        max_minutes: args.max_minutes,
        exclude_ingredients: args.exclude_ingredients.clone(),
    };

    let picked = with_deadline(session.context.allocate_single(course, &options)).await?;

    match picked {
        Some(recipe) if args.json => println!("{}", serde_json::to_string_pretty(&recipe)?),
        Some(recipe) => {
            println!(
                "{} ({}) [{}]",
                recipe.name,
                recipe.total_time_label(),
                recipe.source
            );
            if let Some(url) = &recipe.url {
                println!("{url}");
            }
        }
        None => println!("No recipe available for the given constraints."),
    }

    Ok(())
}
