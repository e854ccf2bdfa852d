use crate::cache::{Invalidation, QueryKey};
use crate::errors::{ConsoleError, ValidationErrors};
use crate::forms::oauth2::{OAuth2FormInput, OAuth2Schema};
use crate::forms::FormMode;
use crate::i18n::{fill, Strings};
use crate::models::oauth2::{AuthorizeUrlRequest, OAuth2Entity, OAuth2Payload};
use crate::mutation::Mutation;
use crate::notification::Notice;

use super::{Console, Report};

const ACCOUNT_PATH: &str = "account";

/// Create or edit dialog for one OAuth2 application.
pub struct OAuth2Dialog<'a> {
    console: &'a Console,
    current: Option<OAuth2Entity>,
    mutation: Mutation,
}

impl<'a> OAuth2Dialog<'a> {
    pub fn create(console: &'a Console) -> Self {
        Self {
            console,
            current: None,
            mutation: Mutation::new(),
        }
    }

    pub fn edit(console: &'a Console, entity: OAuth2Entity) -> Self {
        Self {
            console,
            current: Some(entity),
            mutation: Mutation::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        if self.current.is_some() {
            FormMode::Edit
        } else {
            FormMode::Create
        }
    }

    pub fn initial_input(&self) -> OAuth2FormInput {
        self.current
            .as_ref()
            .map(OAuth2FormInput::from_entity)
            .unwrap_or_default()
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    pub async fn submit(&self, input: &OAuth2FormInput) -> Result<(), ConsoleError> {
        let s = &self.console.strings;
        let payload = OAuth2Schema::new(s).parse(input, self.mode())?;
        let api = &self.console.api;

        let (action, failed) = match self.mode() {
            FormMode::Create => (&s.created, &s.creation_failed),
            FormMode::Edit => (&s.updated, &s.update_failed),
        };
        let report = Report {
            success: Some(Notice::success(
                fill(&s.oauth2_saved_title, &[("action", action.as_str())]),
                fill(&s.oauth2_saved_desc, &[("action", action.to_lowercase().as_str())]),
            )),
            failure_title: fill(&s.oauth2_save_failed_title, &[("action", failed.as_str())]),
            fallback: fill(&s.token_save_fallback, &[("action", failed.as_str())]),
            invalidate: vec![Invalidation::Exact(QueryKey::OAuth2List)],
        };

        match &self.current {
            None => {
                self.console
                    .mutate(&self.mutation, report, api.create_oauth2(&payload))
                    .await
            }
            Some(current) => {
                self.console
                    .mutate(&self.mutation, report, api.update_oauth2(current.id, &payload))
                    .await
            }
        }
    }
}

/// The enable/disable switch on an OAuth2 row.
pub struct EnableToggle<'a> {
    console: &'a Console,
    mutation: Mutation,
}

impl<'a> EnableToggle<'a> {
    pub fn new(console: &'a Console) -> Self {
        Self {
            console,
            mutation: Mutation::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    /// Flip `entity.enabled`. Returns the new state.
    pub async fn toggle(&self, entity: &OAuth2Entity) -> Result<bool, ConsoleError> {
        let s = &self.console.strings;
        let target = !entity.enabled;
        let action = if entity.enabled { &s.disabled } else { &s.enabled };
        let report = Report {
            success: Some(Notice::success(
                s.oauth2_client_updated.as_str(),
                fill(&s.oauth2_toggled_desc, &[("action", action.to_lowercase().as_str())]),
            )),
            failure_title: s.update_failed.clone(),
            fallback: s.status_update_fallback.clone(),
            invalidate: vec![Invalidation::Exact(QueryKey::OAuth2List)],
        };
        let payload = OAuth2Payload::toggle(target);
        self.console
            .mutate(
                &self.mutation,
                report,
                self.console.api.update_oauth2(entity.id, &payload),
            )
            .await?;
        Ok(target)
    }
}

/// Typed-confirmation delete of one OAuth2 application.
pub struct OAuth2DeleteDialog<'a> {
    console: &'a Console,
    id: u64,
    mutation: Mutation,
}

impl<'a> OAuth2DeleteDialog<'a> {
    pub fn new(console: &'a Console, id: u64) -> Self {
        Self {
            console,
            id,
            mutation: Mutation::new(),
        }
    }

    pub fn accepts(&self, confirmation: &str) -> bool {
        confirmation.trim() == self.id.to_string()
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    pub async fn confirm(&self, confirmation: &str) -> Result<(), ConsoleError> {
        if !self.accepts(confirmation) {
            return Err(ConsoleError::ConfirmationMismatch);
        }
        let s = &self.console.strings;
        let report = Report {
            success: Some(Notice::success(
                s.oauth2_deleted.as_str(),
                s.oauth2_deleted_desc.as_str(),
            )),
            failure_title: s.oauth2_delete_failed.clone(),
            fallback: s.oauth2_delete_fallback.clone(),
            invalidate: vec![Invalidation::Exact(QueryKey::OAuth2List)],
        };
        self.console
            .mutate(&self.mutation, report, self.console.api.delete_oauth2(self.id))
            .await
    }
}

/// Starts the browser authorization of a mail account against one OAuth2
/// application.
pub struct AuthorizeDialog<'a> {
    console: &'a Console,
    oauth2_id: u64,
    mutation: Mutation,
}

impl<'a> AuthorizeDialog<'a> {
    pub fn new(console: &'a Console, oauth2_id: u64) -> Self {
        Self {
            console,
            oauth2_id,
            mutation: Mutation::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    /// Fetch the provider URL the operator has to open.
    pub async fn authorize(&self, account_id: Option<u64>) -> Result<String, ConsoleError> {
        let s = &self.console.strings;
        let account_id = match account_id {
            Some(id) => id,
            None => {
                let mut errors = ValidationErrors::new();
                errors.push(ACCOUNT_PATH, s.select_an_account.as_str());
                return Err(errors.into());
            }
        };
        let request = AuthorizeUrlRequest {
            account_id,
            oauth2_id: self.oauth2_id,
        };
        let report = Report {
            success: None,
            failure_title: s.authorize_failed.clone(),
            fallback: s.authorize_fallback.clone(),
            invalidate: Vec::new(),
        };
        self.console
            .mutate(&self.mutation, report, self.console.api.authorize_url(&request))
            .await
    }
}

/// What the server reported back on the OAuth2 redirect page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Failed(String),
    Succeeded,
    Unknown,
}

impl CallbackOutcome {
    /// Read the outcome from the callback URL's query string
    /// (`error`, `message`, `success`).
    pub fn from_query(query: &str, strings: &Strings) -> Self {
        let mut error = false;
        let mut success = false;
        let mut message = None;
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match &*key {
                "error" => error = value == "true",
                "success" => success = value == "true",
                "message" => message = Some(value.into_owned()),
                _ => {}
            }
        }

        if error {
            let message = message
                .filter(|m| !m.is_empty())
                .map(|m| m.replace("\\n", "\n").replace("\\\"", ""))
                .unwrap_or_else(|| strings.unknown_error.clone());
            CallbackOutcome::Failed(message)
        } else if success {
            CallbackOutcome::Succeeded
        } else {
            CallbackOutcome::Unknown
        }
    }

    pub fn notice(&self, strings: &Strings) -> Notice {
        match self {
            CallbackOutcome::Failed(message) => Notice::failure(strings.auth_failed.as_str(), message.as_str()),
            CallbackOutcome::Succeeded => Notice::success(
                strings.auth_success.as_str(),
                strings.auth_success_desc.as_str(),
            ),
            CallbackOutcome::Unknown => Notice::failure(
                strings.unknown_error.as_str(),
                strings.auth_no_status.as_str(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_failure_message_is_cleaned() {
        let strings = Strings::default();
        let outcome = CallbackOutcome::from_query(
            r#"?error=true&message=token%20exchange%20failed%3A%5Cn%5C%22invalid_grant%5C%22"#,
            &strings,
        );
        assert_eq!(
            outcome,
            CallbackOutcome::Failed("token exchange failed:\ninvalid_grant".to_string())
        );
    }

    #[test]
    fn test_callback_failure_without_message() {
        let strings = Strings::default();
        assert_eq!(
            CallbackOutcome::from_query("error=true", &strings),
            CallbackOutcome::Failed("Unknown error".to_string())
        );
    }

    #[test]
    fn test_callback_success_and_unknown() {
        let strings = Strings::default();
        assert_eq!(
            CallbackOutcome::from_query("success=true", &strings),
            CallbackOutcome::Succeeded
        );
        assert_eq!(CallbackOutcome::from_query("", &strings), CallbackOutcome::Unknown);
        assert!(!CallbackOutcome::Succeeded.notice(&strings).is_failure());
        assert!(CallbackOutcome::Unknown.notice(&strings).is_failure());
    }
}
