//! Adapter for the recipe portal's REST API.
//!
//! Login establishes a bearer token and pins the storefront base URL for
//! the session; every later call requires both.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use larder_core::error::PlannerError;
use larder_core::locale::{Locale, portal_domain};
use larder_core::services::{
    CalendarDay, Collection, CollectionCount, CollectionKind, Credentials, IngredientLine,
    LoginInfo, RecipeDetail, RecipeService,
};

fn upstream(message: impl Into<String>) -> PlannerError {
    PlannerError::Upstream(message.into())
}

/// Session state established by login.
#[derive(Debug, Clone)]
struct PortalSession {
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct WireLogin {
    access_token: String,
    username: String,
    #[serde(default)]
    subscription_active: bool,
}

#[derive(Debug, Deserialize)]
struct WireCollectionsPage {
    #[serde(default)]
    collections: Vec<Collection>,
    #[serde(default)]
    page_count: u32,
    #[serde(default)]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct WireCalendarWeek {
    #[serde(default)]
    days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
struct WireIngredients {
    #[serde(default)]
    ingredients: Vec<IngredientLine>,
}

#[derive(Debug, Deserialize)]
struct WireShoppingAdded {
    #[serde(default)]
    added: usize,
}

/// HTTP implementation of [`RecipeService`].
pub struct HttpRecipeService {
    client: reqwest::Client,
    session: RwLock<Option<PortalSession>>,
}

impl HttpRecipeService {
    /// Create an adapter over the session's shared client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            session: RwLock::new(None),
        }
    }

    fn session(&self) -> Result<PortalSession, PlannerError> {
        self.session
            .read()
            .expect("portal session lock poisoned")
            .clone()
            .ok_or(PlannerError::NotAuthenticated)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, PlannerError> {
        let session = self.session()?;
        let url = format!("{}{path}", session.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|e| upstream(format!("portal request failed: {e}")))?;
        Self::decode(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<T, PlannerError> {
        let session = self.session()?;
        let url = format!("{}{path}", session.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&session.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| upstream(format!("portal request failed: {e}")))?;
        Self::decode(response).await
    }

    /// POST a payload where only the status matters (the portal may
    /// answer with an empty body).
    async fn post_ok(&self, path: &str, payload: serde_json::Value) -> Result<(), PlannerError> {
        let session = self.session()?;
        let url = format!("{}{path}", session.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&session.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| upstream(format!("portal request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(upstream(format!(
                "portal returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlannerError> {
        if !response.status().is_success() {
            return Err(upstream(format!(
                "portal returned status {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| upstream(format!("portal response unreadable: {e}")))
    }

    fn collections_path(kind: CollectionKind, page: u32) -> String {
        format!("/api/collections/{kind}?page={page}")
    }
}

#[async_trait]
impl RecipeService for HttpRecipeService {
    async fn login(
        &self,
        credentials: &Credentials,
        locale: &Locale,
    ) -> Result<LoginInfo, PlannerError> {
        let base_url = format!("https://{}", portal_domain(&locale.country));
        let response = self
            .client
            .post(format!("{base_url}/api/auth/login"))
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password,
                "language": locale.language,
            }))
            .send()
            .await
            .map_err(|e| upstream(format!("portal login failed: {e}")))?;

        let wire: WireLogin = Self::decode(response).await?;

        *self.session.write().expect("portal session lock poisoned") = Some(PortalSession {
            base_url,
            token: wire.access_token,
        });

        Ok(LoginInfo {
            username: wire.username,
            subscription_active: wire.subscription_active,
        })
    }

    async fn count_collections(
        &self,
        kind: CollectionKind,
    ) -> Result<CollectionCount, PlannerError> {
        let page: WireCollectionsPage = self.get_json(&Self::collections_path(kind, 0)).await?;
        Ok(CollectionCount {
            total: page.total,
            pages: page.page_count,
        })
    }

    async fn list_collections(
        &self,
        kind: CollectionKind,
        page: u32,
    ) -> Result<Vec<Collection>, PlannerError> {
        let page: WireCollectionsPage = self.get_json(&Self::collections_path(kind, page)).await?;
        Ok(page.collections)
    }

    async fn recipe_detail(&self, recipe_id: &str) -> Result<RecipeDetail, PlannerError> {
        self.get_json(&format!("/api/recipes/{recipe_id}")).await
    }

    async fn add_to_calendar(
        &self,
        day: NaiveDate,
        recipe_ids: &[String],
    ) -> Result<(), PlannerError> {
        self.post_ok(
            &format!("/api/planner/{day}"),
            json!({ "recipe_ids": recipe_ids }),
        )
        .await
    }

    async fn calendar_week(&self, monday: NaiveDate) -> Result<Vec<CalendarDay>, PlannerError> {
        let week: WireCalendarWeek = self
            .get_json(&format!("/api/planner/week/{monday}"))
            .await?;
        Ok(week.days)
    }

    async fn remove_from_calendar(
        &self,
        day: NaiveDate,
        recipe_id: &str,
    ) -> Result<(), PlannerError> {
        let session = self.session()?;
        let url = format!("{}/api/planner/{day}/{recipe_id}", session.base_url);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|e| upstream(format!("portal request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(upstream(format!(
                "portal returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn ingredients_for_recipes(
        &self,
        recipe_ids: &[String],
    ) -> Result<Vec<IngredientLine>, PlannerError> {
        let wire: WireIngredients = self
            .post_json(
                "/api/shopping-list/ingredients",
                json!({ "recipe_ids": recipe_ids }),
            )
            .await?;
        Ok(wire.ingredients)
    }

    async fn add_to_shopping_list(&self, recipe_ids: &[String]) -> Result<usize, PlannerError> {
        let wire: WireShoppingAdded = self
            .post_json(
                "/api/shopping-list/recipes",
                json!({ "recipe_ids": recipe_ids }),
            )
            .await?;
        Ok(wire.added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_path_uses_kind_token() {
        assert_eq!(
            HttpRecipeService::collections_path(CollectionKind::Custom, 2),
            "/api/collections/custom?page=2"
        );
        assert_eq!(
            HttpRecipeService::collections_path(CollectionKind::Managed, 0),
            "/api/collections/managed?page=0"
        );
    }

    #[tokio::test]
    async fn calls_before_login_are_not_authenticated() {
        let service = HttpRecipeService::new(reqwest::Client::new());
        let result = service.count_collections(CollectionKind::Custom).await;
        assert!(matches!(result, Err(PlannerError::NotAuthenticated)));
    }

    #[test]
    fn wire_login_deserializes() {
        let wire: WireLogin = serde_json::from_str(
            r#"{"access_token": "tok", "username": "koch", "subscription_active": true}"#,
        )
        .unwrap();
        assert_eq!(wire.username, "koch");
        assert!(wire.subscription_active);
    }
}
