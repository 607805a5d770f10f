//! The `larder suggest` command: ingredient-name autocompletion.

use anyhow::Result;

use crate::config::ResolvedPortal;
use crate::session;

/// Execute the `larder suggest` command.
pub async fn run_suggest(query: &str, limit: usize, portal: &ResolvedPortal) -> Result<()> {
    let mut session = session::open(portal).await?;

    let suggestions = session.context.suggest_ingredients(query, limit).await;

    if suggestions.suggestions.is_empty() {
        println!("No suggestions for {query:?}.");
        return Ok(());
    }

    println!("~{} matching recipes", suggestions.count);
    for suggestion in &suggestions.suggestions {
        println!("  {suggestion}");
    }
    Ok(())
}
