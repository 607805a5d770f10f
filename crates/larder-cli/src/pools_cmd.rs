//! The `larder pools` command: load and inspect the candidate pools.

use anyhow::Result;

use crate::config::ResolvedPortal;
use crate::session::{self, with_deadline};

/// Execute the `larder pools` command.
pub async fn run_pools(portal: &ResolvedPortal, json: bool) -> Result<()> {
    let mut session = session::open(portal).await?;

    let counts = with_deadline(session.context.acquire_pools()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    println!(
        "Collections: {} own, {} subscribed",
        counts.preferred_collections, counts.curated_collections
    );
    println!("  preferred recipes: {}", counts.preferred_recipes);
    println!("  curated recipes:   {}", counts.curated_recipes);
    println!("  searched recipes:  {}", counts.searched_recipes);
    if counts.searched_recipes > 0 {
        println!("(search backfill was triggered by low collection supply)");
    }
    Ok(())
}
