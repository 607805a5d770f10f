//! Adapter for the portal's hosted search index.
//!
//! The index requires a session-scoped API key that is not served by any
//! API endpoint; it is embedded in the portal's search page markup. On
//! `prepare` the adapter fetches that page and pattern-matches the key
//! out of the response body, caching it for the rest of the session.

use std::sync::RwLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use larder_core::error::PlannerError;
use larder_core::locale::{Locale, search_page_url};
use larder_core::services::{FacetHit, SearchRequest, SearchResponse, SearchService, SearchHit};

/// Application id of the hosted search index.
const SEARCH_APP_ID: &str = "3TA8NT85XJ";

/// Index queried for recipes.
const SEARCH_INDEX: &str = "recipes-production";

fn index_base() -> String {
    format!("https://{SEARCH_APP_ID}-dsn.algolia.net/1/indexes/{SEARCH_INDEX}")
}

fn upstream(message: impl Into<String>) -> PlannerError {
    PlannerError::Upstream(message.into())
}

/// Pull the search API key out of a search-page response body.
///
/// The key is a base64-ish token of at least 40 characters assigned to an
/// `"apiKey"` property somewhere in the embedded configuration.
pub fn extract_api_key(body: &str) -> Option<String> {
    let pattern = Regex::new(r#""apiKey"\s*:\s*"([A-Za-z0-9+/=]{40,})""#).ok()?;
    pattern
        .captures(body)
        .map(|captures| captures[1].to_string())
}

#[derive(Debug, Deserialize)]
struct WireSearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
    #[serde(default, rename = "nbHits")]
    nb_hits: u64,
}

#[derive(Debug, Deserialize)]
struct WireFacetResponse {
    #[serde(default, rename = "facetHits")]
    facet_hits: Vec<FacetHit>,
}

/// HTTP implementation of [`SearchService`].
pub struct HttpSearchService {
    client: reqwest::Client,
    api_key: RwLock<Option<String>>,
}

impl HttpSearchService {
    /// Create an adapter over the session's shared client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            api_key: RwLock::new(None),
        }
    }

    fn key(&self) -> Result<String, PlannerError> {
        self.api_key
            .read()
            .expect("api key lock poisoned")
            .clone()
            .ok_or_else(|| upstream("search session not prepared (no API key)"))
    }

    async fn post_index(
        &self,
        url: &str,
        payload: serde_json::Value,
    ) -> Result<reqwest::Response, PlannerError> {
        let key = self.key()?;
        let response = self
            .client
            .post(url)
            .header("X-Algolia-Application-Id", SEARCH_APP_ID)
            .header("X-Algolia-API-Key", key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| upstream(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(upstream(format!(
                "search index returned status {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl SearchService for HttpSearchService {
    async fn prepare(&self, locale: &Locale) -> Result<(), PlannerError> {
        let url = search_page_url(locale);
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| upstream(format!("search page fetch failed: {e}")))?
            .text()
            .await
            .map_err(|e| upstream(format!("search page body unreadable: {e}")))?;

        match extract_api_key(&body) {
            Some(key) => {
                tracing::info!(key_len = key.len(), "search API key discovered");
                *self.api_key.write().expect("api key lock poisoned") = Some(key);
                Ok(())
            }
            None => Err(upstream("no API key found in search page")),
        }
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, PlannerError> {
        let mut payload = json!({
            "query": request.query,
            "hitsPerPage": request.hits_per_page,
        });
        if let Some(filters) = &request.filters {
            payload["filters"] = json!(filters);
        }
        if let Some(attributes) = &request.attributes_to_retrieve {
            payload["attributesToRetrieve"] = json!(attributes);
        }

        let url = format!("{}/query", index_base());
        let wire: WireSearchResponse = self
            .post_index(&url, payload)
            .await?
            .json()
            .await
            .map_err(|e| upstream(format!("search response unreadable: {e}")))?;

        Ok(SearchResponse {
            hits: wire.hits,
            total_hits: wire.nb_hits,
        })
    }

    async fn facet_query(
        &self,
        facet: &str,
        partial: &str,
        max_hits: u32,
    ) -> Result<Vec<FacetHit>, PlannerError> {
        let url = format!("{}/facets/{facet}/query", index_base());
        let payload = json!({
            "facetQuery": partial,
            "maxFacetHits": max_hits,
        });

        let wire: WireFacetResponse = self
            .post_index(&url, payload)
            .await?
            .json()
            .await
            .map_err(|e| upstream(format!("facet response unreadable: {e}")))?;

        Ok(wire.facet_hits)
    }
}
