use reqwest::Method;

use super::{segment, ApiClient};
use crate::errors::ConsoleError;
use crate::models::token::{AccessToken, AccessTokenPayload};

impl ApiClient {
    pub async fn list_access_tokens(&self) -> Result<Vec<AccessToken>, ConsoleError> {
        let req = self.request(Method::GET, "api/v1/access-token-list")?;
        self.fetch_json(req).await
    }

    /// Returns the newly issued token.
    pub async fn create_access_token(
        &self,
        payload: &AccessTokenPayload,
    ) -> Result<String, ConsoleError> {
        let req = self.request(Method::POST, "api/v1/access-token")?.json(payload);
        self.fetch_string(req).await
    }

    pub async fn update_access_token(
        &self,
        token: &str,
        payload: &AccessTokenPayload,
    ) -> Result<(), ConsoleError> {
        let path = format!("api/v1/access-token/{}", segment(token));
        let req = self.request(Method::POST, &path)?.json(payload);
        self.fetch_empty(req).await
    }

    pub async fn delete_access_token(&self, token: &str) -> Result<(), ConsoleError> {
        let path = format!("api/v1/access-token/{}", segment(token));
        let req = self.request(Method::DELETE, &path)?;
        self.fetch_empty(req).await
    }
}
