use reqwest::Method;
use serde::Serialize;

use super::ApiClient;
use crate::errors::ConsoleError;

#[derive(Serialize)]
struct PasswordBody<'a> {
    password: &'a str,
}

impl ApiClient {
    /// Exchange the root password for a root token.
    pub async fn login(&self, password: &str) -> Result<String, ConsoleError> {
        let req = self
            .request(Method::POST, "api/login")?
            .json(&PasswordBody { password });
        self.fetch_string(req).await
    }

    /// Invalidate the current root token and return its replacement.
    pub async fn reset_root_token(&self) -> Result<String, ConsoleError> {
        let req = self.request(Method::POST, "api/v1/reset-root-token")?;
        self.fetch_string(req).await
    }

    pub async fn reset_root_password(&self, password: &str) -> Result<(), ConsoleError> {
        let req = self
            .request(Method::POST, "api/v1/reset-root-password")?
            .json(&PasswordBody { password });
        self.fetch_empty(req).await
    }
}
