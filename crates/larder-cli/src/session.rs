//! Session wiring: shared HTTP client, service adapters, portal login.
//!
//! Every boundary operation is wrapped in one overall deadline; a timeout
//! degrades that operation to a failure instead of hanging the command.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};

use larder_core::context::PlannerContext;
use larder_core::error::PlannerError;
use larder_http::{HttpRecipeService, HttpSearchService, build_client};

use crate::config::ResolvedPortal;

/// Overall deadline for one boundary operation.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Run a planner operation under the session deadline.
pub async fn with_deadline<T, F>(operation: F) -> Result<T>
where
    F: Future<Output = Result<T, PlannerError>>,
{
    match tokio::time::timeout(OPERATION_TIMEOUT, operation).await {
        Ok(result) => Ok(result?),
        Err(_) => bail!(
            "operation timed out after {}s",
            OPERATION_TIMEOUT.as_secs()
        ),
    }
}

/// A logged-in planning session plus the shared HTTP client (for wiring
/// further adapters, e.g. the shopping service).
pub struct Session {
    pub context: PlannerContext,
    pub client: reqwest::Client,
}

/// Build the adapters over one shared client and log in to the portal.
pub async fn open(portal: &ResolvedPortal) -> Result<Session> {
    let client = build_client(OPERATION_TIMEOUT)?;
    let recipes = Arc::new(HttpRecipeService::new(client.clone()));
    let search = Arc::new(HttpSearchService::new(client.clone()));

    let mut context = PlannerContext::new(recipes, search);
    let info = with_deadline(context.login(
        &portal.email,
        &portal.password,
        &portal.country,
        &portal.language,
    ))
    .await?;
    tracing::info!(username = %info.username, "portal session opened");

    Ok(Session { context, client })
}
