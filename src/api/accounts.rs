use reqwest::Method;

use super::ApiClient;
use crate::errors::ConsoleError;
use crate::models::account::{MinimalAccount, Proxy};

impl ApiClient {
    pub async fn list_minimal_accounts(&self) -> Result<Vec<MinimalAccount>, ConsoleError> {
        let req = self.request(Method::GET, "api/v1/minimal-account-list")?;
        self.fetch_json(req).await
    }

    pub async fn list_proxies(&self) -> Result<Vec<Proxy>, ConsoleError> {
        let req = self.request(Method::GET, "api/v1/list-proxy")?;
        self.fetch_json(req).await
    }
}
