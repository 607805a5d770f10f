//! The `larder clear-week` command.

use anyhow::Result;

use crate::config::ResolvedPortal;
use crate::session::{self, with_deadline};

/// Execute the `larder clear-week` command.
pub async fn run_clear_week(week_offset: i32, portal: &ResolvedPortal) -> Result<()> {
    let session = session::open(portal).await?;
    let removed = with_deadline(session.context.clear_week(week_offset)).await?;
    println!("Removed {removed} recipes from the calendar week.");
    Ok(())
}
