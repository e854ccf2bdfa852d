use crate::cache::{Invalidation, QueryKey};
use crate::errors::ConsoleError;
use crate::forms::token::{TokenFormInput, TokenSchema};
use crate::forms::FormMode;
use crate::i18n::fill;
use crate::models::token::AccessToken;
use crate::mutation::Mutation;
use crate::notification::Notice;

use super::{Console, Report};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSaved {
    /// The server's reply to a create, normally the new token string.
    Created(String),
    Updated,
}

/// Create or edit dialog for one access token.
pub struct TokenDialog<'a> {
    console: &'a Console,
    current: Option<AccessToken>,
    mutation: Mutation,
}

impl<'a> TokenDialog<'a> {
    pub fn create(console: &'a Console) -> Self {
        Self {
            console,
            current: None,
            mutation: Mutation::new(),
        }
    }

    pub fn edit(console: &'a Console, token: AccessToken) -> Self {
        Self {
            console,
            current: Some(token),
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

    pub fn initial_input(&self) -> TokenFormInput {
        self.current
            .as_ref()
            .map(TokenFormInput::from_token)
            .unwrap_or_default()
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    /// Validate `input` and save it. Field errors come back as
    /// [`ConsoleError::Validation`] without any request being sent.
    pub async fn submit(&self, input: &TokenFormInput) -> Result<TokenSaved, ConsoleError> {
        let s = &self.console.strings;
        let payload = TokenSchema::new(s).parse(input)?;
        let api = &self.console.api;

        let (action, failed) = match self.mode() {
            FormMode::Create => (&s.created, &s.creation_failed),
            FormMode::Edit => (&s.updated, &s.update_failed),
        };
        let report = Report {
            success: Some(Notice::success(
                format!("{} {}", s.token_title, action),
                fill(&s.token_saved_desc, &[("action", action.to_lowercase().as_str())]),
            )),
            failure_title: format!("{} {}", s.token_title, failed),
            fallback: fill(&s.token_save_fallback, &[("action", failed.as_str())]),
            invalidate: vec![Invalidation::Exact(QueryKey::AccessTokens)],
        };

        match &self.current {
            None => {
                let token = self
                    .console
                    .mutate(&self.mutation, report, api.create_access_token(&payload))
                    .await?;
                tracing::info!(accounts = payload.accounts.len(), "access token created");
                Ok(TokenSaved::Created(token))
            }
            Some(current) => {
                self.console
                    .mutate(
                        &self.mutation,
                        report,
                        api.update_access_token(&current.token, &payload),
                    )
                    .await?;
                tracing::info!(accounts = payload.accounts.len(), "access token updated");
                Ok(TokenSaved::Updated)
            }
        }
    }
}

/// Typed-confirmation delete of one access token.
pub struct TokenDeleteDialog<'a> {
    console: &'a Console,
    token: String,
    mutation: Mutation,
}

impl<'a> TokenDeleteDialog<'a> {
    pub fn new(console: &'a Console, token: impl Into<String>) -> Self {
        Self {
            console,
            token: token.into(),
            mutation: Mutation::new(),
        }
    }

    /// Whether the typed confirmation unlocks the delete button.
    pub fn accepts(&self, confirmation: &str) -> bool {
        confirmation.trim() == self.token
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
                s.token_deleted.as_str(),
                s.token_deleted_desc.as_str(),
            )),
            failure_title: s.token_delete_failed.clone(),
            fallback: s.delete_fallback.clone(),
            invalidate: vec![Invalidation::Exact(QueryKey::AccessTokens)],
        };
        self.console
            .mutate(
                &self.mutation,
                report,
                self.console.api.delete_access_token(&self.token),
            )
            .await
    }
}
