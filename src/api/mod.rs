//! Typed client for the archive server's administration REST API.
//!
//! Every call is a single attempt: no retry middleware, failures surface to
//! the caller as [`ConsoleError`] and the operator resubmits.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::ConsoleError;
use crate::session::Session;

pub mod accounts;
pub mod auth;
pub mod mailbox;
pub mod oauth2;
pub mod tokens;

/// Longest raw (non-JSON) error body echoed back to the operator.
const MAX_RAW_ERROR_LEN: usize = 512;

pub struct ApiClient {
    base: Url,
    http: Client,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Result<Self, ConsoleError> {
        // A trailing slash keeps any path prefix of the base when joining.
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| anyhow::anyhow!("invalid server URL '{}': {}", base_url, e))?;

        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("bichon-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base,
            http,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Start a request to `path` (relative, e.g. `api/v1/oauth2-list`),
    /// carrying the session's bearer token when there is one.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ConsoleError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| anyhow::anyhow!("invalid endpoint path '{}': {}", path, e))?;
        let mut req = self.http.request(method, url);
        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token.as_str());
        }
        Ok(req)
    }

    /// Send and map non-2xx responses to errors.
    async fn execute(&self, req: RequestBuilder) -> Result<Response, ConsoleError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let resp = req
            .header("x-request-id", &request_id)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(request_id = %request_id, error = %e, "api request failed");
                ConsoleError::Network(e)
            })?;

        let status = resp.status();
        tracing::debug!(
            request_id = %request_id,
            url = %resp.url(),
            status = %status,
            "api response"
        );
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::warn!(
            request_id = %request_id,
            status = %status,
            message = message.as_deref().unwrap_or(""),
            "api returned an error"
        );
        if status == StatusCode::UNAUTHORIZED {
            Err(ConsoleError::Unauthorized { message })
        } else {
            Err(ConsoleError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ConsoleError> {
        let resp = self.execute(req).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Endpoints that hand back a single token or URL reply either with a
    /// JSON string or with plain text.
    async fn fetch_string(&self, req: RequestBuilder) -> Result<String, ConsoleError> {
        let resp = self.execute(req).await?;
        let body = resp.text().await?;
        Ok(decode_string_body(&body))
    }

    async fn fetch_empty(&self, req: RequestBuilder) -> Result<(), ConsoleError> {
        self.execute(req).await?;
        Ok(())
    }
}

/// Pull an operator-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from),
        Err(_) => Some(trimmed.chars().take(MAX_RAW_ERROR_LEN).collect()),
    }
}

fn decode_string_body(body: &str) -> String {
    match serde_json::from_str::<String>(body) {
        Ok(s) => s,
        Err(_) => body.trim().to_string(),
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
