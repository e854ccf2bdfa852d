use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A registered identity-provider configuration used to authorize mailbox
/// access without storing the user's password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Entity {
    pub id: u64,
    #[serde(default)]
    pub description: Option<String>,
    pub client_id: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    #[serde(default)]
    pub extra_params: Option<BTreeMap<String, String>>,
    pub enabled: bool,
    #[serde(default)]
    pub use_proxy: Option<u64>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Body of the OAuth2 create and update endpoints.
///
/// Every field is optional so the same type serves full edits and the
/// enable toggle, which only sends `enabled`. `client_secret` left `None`
/// on update keeps the stored secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OAuth2Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_params: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_proxy: Option<u64>,
}

impl OAuth2Payload {
    pub fn toggle(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeUrlRequest {
    pub account_id: u64,
    pub oauth2_id: u64,
}
