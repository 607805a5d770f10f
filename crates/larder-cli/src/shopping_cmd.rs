//! The `larder shopping-lists` command: enumerate external shopping lists.

use anyhow::Result;

use larder_core::services::ShoppingService;
use larder_http::{HttpShoppingService, build_client};

use crate::config;
use crate::session::{OPERATION_TIMEOUT, with_deadline};

/// Execute the `larder shopping-lists` command.
pub async fn run_lists() -> Result<()> {
    let shopping = config::resolve_shopping()?;
    let client = build_client(OPERATION_TIMEOUT)?;
    let service = HttpShoppingService::new(client);

    with_deadline(service.login(&shopping.email, &shopping.password)).await?;
    let lists = with_deadline(service.lists()).await?;

    if lists.is_empty() {
        println!("No shopping lists found.");
        return Ok(());
    }
    for list in lists {
        println!("{}  {}", list.uuid, list.name);
    }
    Ok(())
}
