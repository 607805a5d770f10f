//! HTTP adapters for the larder service traits.
//!
//! One shared [`reqwest::Client`] per session is cloned into every adapter
//! (`Client` is a cheap handle over a shared connection pool). Transport
//! and status failures are mapped to [`PlannerError::Upstream`]; the core
//! decides per call site whether to degrade or propagate.

pub mod portal;
pub mod search;
pub mod shopping;

use std::time::Duration;

use larder_core::error::PlannerError;

pub use portal::HttpRecipeService;
pub use search::HttpSearchService;
pub use shopping::HttpShoppingService;

/// Build the shared HTTP client with the session-wide request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, PlannerError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PlannerError::Upstream(format!("failed to create HTTP client: {e}")))
}
