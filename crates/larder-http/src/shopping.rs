//! Adapter for the Bring-style external shopping-list service.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use larder_core::error::PlannerError;
use larder_core::services::{ShoppingList, ShoppingService};

/// Default service endpoint.
const DEFAULT_BASE_URL: &str = "https://api.getbring.com/rest/v2";

fn upstream(message: impl Into<String>) -> PlannerError {
    PlannerError::Upstream(message.into())
}

#[derive(Debug, Clone)]
struct ShoppingSession {
    user_uuid: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct WireShoppingLogin {
    uuid: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct WireLists {
    #[serde(default)]
    lists: Vec<WireList>,
}

#[derive(Debug, Deserialize)]
struct WireList {
    #[serde(rename = "listUuid")]
    list_uuid: String,
    name: String,
}

/// HTTP implementation of [`ShoppingService`].
pub struct HttpShoppingService {
    client: reqwest::Client,
    base_url: String,
    session: RwLock<Option<ShoppingSession>>,
}

impl HttpShoppingService {
    /// Create an adapter over the session's shared client.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Create an adapter against a non-default endpoint.
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            session: RwLock::new(None),
        }
    }

    fn session(&self) -> Result<ShoppingSession, PlannerError> {
        self.session
            .read()
            .expect("shopping session lock poisoned")
            .clone()
            .ok_or(PlannerError::NotAuthenticated)
    }
}

#[async_trait]
impl ShoppingService for HttpShoppingService {
    async fn login(&self, email: &str, password: &str) -> Result<(), PlannerError> {
        let response = self
            .client
            .post(format!("{}/bringauth", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| upstream(format!("shopping login failed: {e}")))?;

        if !response.status().is_success() {
            return Err(upstream(format!(
                "shopping service returned status {}",
                response.status()
            )));
        }

        let wire: WireShoppingLogin = response
            .json()
            .await
            .map_err(|e| upstream(format!("shopping login response unreadable: {e}")))?;

        *self
            .session
            .write()
            .expect("shopping session lock poisoned") = Some(ShoppingSession {
            user_uuid: wire.uuid,
            token: wire.access_token,
        });
        Ok(())
    }

    async fn lists(&self) -> Result<Vec<ShoppingList>, PlannerError> {
        let session = self.session()?;
        let response = self
            .client
            .get(format!(
                "{}/bringusers/{}/lists",
                self.base_url, session.user_uuid
            ))
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|e| upstream(format!("shopping request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(upstream(format!(
                "shopping service returned status {}",
                response.status()
            )));
        }

        let wire: WireLists = response
            .json()
            .await
            .map_err(|e| upstream(format!("shopping lists unreadable: {e}")))?;

        Ok(wire
            .lists
            .into_iter()
            .map(|l| ShoppingList {
                uuid: l.list_uuid,
                name: l.name,
            })
            .collect())
    }

    async fn add_item(
        &self,
        list_uuid: &str,
        name: &str,
        note: &str,
    ) -> Result<(), PlannerError> {
        let session = self.session()?;
        let response = self
            .client
            .post(format!("{}/bringlists/{list_uuid}/items", self.base_url))
            .bearer_auth(&session.token)
            .json(&json!({ "name": name, "specification": note }))
            .send()
            .await
            .map_err(|e| upstream(format!("shopping request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(upstream(format!(
                "shopping service returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_lists_deserialize_wire_names() {
        let wire: WireLists = serde_json::from_str(
            r#"{"lists": [{"listUuid": "u-1", "name": "Zuhause"}]}"#,
        )
        .unwrap();
        assert_eq!(wire.lists[0].list_uuid, "u-1");
    }

    #[tokio::test]
    async fn calls_before_login_are_not_authenticated() {
        let service = HttpShoppingService::new(reqwest::Client::new());
        assert!(matches!(
            service.lists().await,
            Err(PlannerError::NotAuthenticated)
        ));
    }
}
