use reqwest::Method;

use super::ApiClient;
use crate::errors::ConsoleError;
use crate::models::oauth2::{AuthorizeUrlRequest, OAuth2Entity, OAuth2Payload};

impl ApiClient {
    pub async fn list_oauth2(&self) -> Result<Vec<OAuth2Entity>, ConsoleError> {
        let req = self.request(Method::GET, "api/v1/oauth2-list")?;
        self.fetch_json(req).await
    }

    pub async fn create_oauth2(&self, payload: &OAuth2Payload) -> Result<(), ConsoleError> {
        let req = self.request(Method::POST, "api/v1/oauth2")?.json(payload);
        self.fetch_empty(req).await
    }

    /// Partial update: only the fields present in `payload` change.
    pub async fn update_oauth2(&self, id: u64, payload: &OAuth2Payload) -> Result<(), ConsoleError> {
        let req = self
            .request(Method::POST, &format!("api/v1/oauth2/{}", id))?
            .json(payload);
        self.fetch_empty(req).await
    }

    pub async fn delete_oauth2(&self, id: u64) -> Result<(), ConsoleError> {
        let req = self.request(Method::DELETE, &format!("api/v1/oauth2/{}", id))?;
        self.fetch_empty(req).await
    }

    /// URL the account owner must open to grant mailbox access.
    pub async fn authorize_url(&self, request: &AuthorizeUrlRequest) -> Result<String, ConsoleError> {
        let req = self
            .request(Method::POST, "api/v1/oauth2-authorize-url")?
            .json(request);
        self.fetch_string(req).await
    }
}
