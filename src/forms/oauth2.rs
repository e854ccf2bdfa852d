use std::collections::BTreeMap;
use std::str::FromStr;

use crate::errors::ValidationErrors;
use crate::i18n::{fill, Strings};
use crate::models::oauth2::{OAuth2Entity, OAuth2Payload};

use super::{description_too_long, FormMode};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamInput {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2FormInput {
    pub description: Option<String>,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Option<Vec<String>>,
    pub extra_params: Option<Vec<ParamInput>>,
    pub enabled: bool,
    pub use_proxy: Option<u64>,
}

impl Default for OAuth2FormInput {
    fn default() -> Self {
        Self {
            description: None,
            client_id: String::new(),
            client_secret: Some(String::new()),
            auth_url: String::new(),
            token_url: String::new(),
            redirect_uri: String::new(),
            scopes: Some(Vec::new()),
            extra_params: Some(Vec::new()),
            enabled: true,
            use_proxy: None,
        }
    }
}

impl OAuth2FormInput {
    /// Pre-fill for editing. The secret is never echoed back by the server,
    /// so it starts empty and stays untouched unless the operator types one.
    pub fn from_entity(entity: &OAuth2Entity) -> Self {
        Self {
            description: entity.description.clone(),
            client_id: entity.client_id.clone(),
            client_secret: None,
            auth_url: entity.auth_url.clone(),
            token_url: entity.token_url.clone(),
            redirect_uri: entity.redirect_uri.clone(),
            scopes: entity.scopes.clone(),
            extra_params: entity.extra_params.as_ref().map(|params| {
                params
                    .iter()
                    .map(|(key, value)| ParamInput {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect()
            }),
            enabled: entity.enabled,
            use_proxy: entity.use_proxy,
        }
    }

    /// Fill the provider endpoints, scopes and params of a well-known IdP.
    pub fn apply_preset(&mut self, preset: OAuth2Preset) {
        let (auth_url, token_url, scopes, params) = match preset {
            OAuth2Preset::Google => (
                "https://accounts.google.com/o/oauth2/v2/auth",
                "https://oauth2.googleapis.com/token",
                vec!["https://mail.google.com/"],
                vec![("access_type", "offline"), ("prompt", "consent")],
            ),
            OAuth2Preset::Microsoft => (
                "https://login.microsoftonline.com/consumers/oauth2/v2.0/authorize",
                "https://login.microsoftonline.com/consumers/oauth2/v2.0/token",
                vec!["https://outlook.office.com/IMAP.AccessAsUser.All", "offline_access"],
                vec![("prompt", "consent")],
            ),
        };

        self.auth_url = auth_url.to_string();
        self.token_url = token_url.to_string();
        self.enabled = true;
        self.scopes = Some(scopes.into_iter().map(String::from).collect());
        self.extra_params = Some(
            params
                .into_iter()
                .map(|(k, v)| ParamInput {
                    key: k.to_string(),
                    value: v.to_string(),
                })
                .collect(),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuth2Preset {
    Google,
    Microsoft,
}

impl FromStr for OAuth2Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" | "gmail" => Ok(OAuth2Preset::Google),
            "microsoft" | "outlook" => Ok(OAuth2Preset::Microsoft),
            other => Err(format!("unknown preset '{}': expected google or microsoft", other)),
        }
    }
}

pub struct OAuth2Schema<'a> {
    strings: &'a Strings,
}

impl<'a> OAuth2Schema<'a> {
    pub fn new(strings: &'a Strings) -> Self {
        Self { strings }
    }

    pub fn parse(
        &self,
        input: &OAuth2FormInput,
        mode: FormMode,
    ) -> Result<OAuth2Payload, ValidationErrors> {
        let s = self.strings;
        let mut errors = ValidationErrors::new();

        if let Some(desc) = &input.description {
            if description_too_long(desc) {
                errors.push("description", s.description_too_long.as_str());
            }
        }
        if input.client_id.is_empty() {
            errors.push("client_id", s.client_id_required.as_str());
        }
        self.check_url(&input.auth_url, "auth_url", "Authorization URL", &mut errors);
        self.check_url(&input.token_url, "token_url", "Token URL", &mut errors);
        self.check_url(&input.redirect_uri, "redirect_uri", "Redirect URI", &mut errors);

        if let Some(scopes) = &input.scopes {
            if scopes.iter().any(|scope| scope.is_empty()) {
                errors.push("scopes", s.value_cannot_be_empty.as_str());
            }
        }
        if let Some(params) = &input.extra_params {
            if params.iter().any(|p| p.key.is_empty()) {
                errors.push("extra_params", s.key_cannot_be_empty.as_str());
            }
            if params.iter().any(|p| p.value.is_empty()) {
                errors.push("extra_params", s.value_cannot_be_empty.as_str());
            }
        }

        // Create must carry a secret; edit keeps the stored one when blank.
        let client_secret = match mode {
            FormMode::Create => match input.client_secret.as_deref() {
                Some(secret) if !secret.is_empty() => Some(secret.to_string()),
                _ => {
                    errors.push("client_secret", s.client_secret_required.as_str());
                    None
                }
            },
            FormMode::Edit => input
                .client_secret
                .as_deref()
                .filter(|secret| !secret.trim().is_empty())
                .map(String::from),
        };

        let extra_params = input.extra_params.as_ref().map(|params| {
            params
                .iter()
                .map(|p| (p.key.clone(), p.value.clone()))
                .collect::<BTreeMap<_, _>>()
        });

        errors.into_result(OAuth2Payload {
            description: input.description.clone(),
            client_id: Some(input.client_id.clone()),
            client_secret,
            auth_url: Some(input.auth_url.clone()),
            token_url: Some(input.token_url.clone()),
            redirect_uri: Some(input.redirect_uri.clone()),
            scopes: input.scopes.clone(),
            extra_params,
            enabled: Some(input.enabled),
            use_proxy: input.use_proxy,
        })
    }

    fn check_url(&self, value: &str, path: &'static str, label: &str, errors: &mut ValidationErrors) {
        if value.is_empty() {
            errors.push(path, fill(&self.strings.field_required, &[("field", label)]));
        } else if url::Url::parse(value).is_err() {
            errors.push(path, fill(&self.strings.invalid_url, &[("field", label)]));
        }
    }
}
