//! Root sign-in and the root-access settings page.

use std::path::Path;

use crate::errors::ConsoleError;
use crate::forms::auth::{validate_login_password, validate_root_password, ROOT_USERNAME};
use crate::mutation::Mutation;
use crate::notification::Notice;

use super::{Console, Report};

pub struct SignIn<'a> {
    console: &'a Console,
    mutation: Mutation,
}

impl<'a> SignIn<'a> {
    pub fn new(console: &'a Console) -> Self {
        Self {
            console,
            mutation: Mutation::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    /// Sign in as root. On success the session holds the returned token.
    pub async fn sign_in(&self, password: &str) -> Result<(), ConsoleError> {
        let s = &self.console.strings;
        validate_login_password(password, s)?;

        match self.mutation.run(self.console.api.login(password)).await {
            Ok(token) => {
                self.console.session().set(token);
                tracing::info!(user = ROOT_USERNAME, "signed in");
                Ok(())
            }
            Err(ConsoleError::Busy) => Err(ConsoleError::Busy),
            Err(e) => {
                let notice = if e.is_unauthorized() {
                    Notice::failure(s.login_failed.as_str(), s.invalid_password.as_str())
                } else {
                    Notice::failure(s.something_went_wrong.as_str(), e.user_message(&s.login_failed))
                };
                tracing::warn!(error = %e, "sign-in failed");
                self.console.notify(notice);
                Err(e)
            }
        }
    }
}

/// Root token and root password resets.
pub struct RootAccess<'a> {
    console: &'a Console,
    token_reset: Mutation,
    password_reset: Mutation,
}

impl<'a> RootAccess<'a> {
    pub fn new(console: &'a Console) -> Self {
        Self {
            console,
            token_reset: Mutation::new(),
            password_reset: Mutation::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.token_reset.is_pending() || self.password_reset.is_pending()
    }

    /// Rotate the root token and switch the session over to it.
    ///
    /// With `export`, the new token is also written to that file. A failed
    /// write is reported as a failure notice but does not undo the reset:
    /// the token is still returned.
    pub async fn reset_token(&self, export: Option<&Path>) -> Result<String, ConsoleError> {
        let s = &self.console.strings;
        let report = Report {
            success: Some(Notice::success(
                s.root_token_reset.as_str(),
                s.login_info_updated.as_str(),
            )),
            failure_title: s.reset_failed.clone(),
            fallback: s.something_went_wrong.clone(),
            invalidate: Vec::new(),
        };
        let token = self
            .console
            .mutate(&self.token_reset, report, self.console.api.reset_root_token())
            .await?;
        self.console.session().set(token.as_str());
        tracing::info!("root token reset");

        if let Some(path) = export {
            if let Err(e) = write_token(path, &token) {
                let e = ConsoleError::from(e);
                tracing::warn!(path = %path.display(), error = %e, "failed to export root token");
                self.console
                    .notify(Notice::failure(s.failed_to_copy.as_str(), e.user_message(&s.failed_to_copy)));
            }
        }
        Ok(token)
    }

    /// Set a new root password. The current session is dropped, so the next
    /// command has to sign in with the new password.
    pub async fn reset_password(&self, password: &str) -> Result<(), ConsoleError> {
        let s = &self.console.strings;
        if let Err(errors) = validate_root_password(password, s) {
            self.console.notify(Notice::failure(
                s.invalid_password_title.as_str(),
                s.root_password_too_short.as_str(),
            ));
            return Err(errors.into());
        }
        let report = Report {
            success: Some(Notice::success(
                s.root_password_reset.as_str(),
                s.use_new_password.as_str(),
            )),
            failure_title: s.reset_failed.clone(),
            fallback: s.something_went_wrong.clone(),
            invalidate: Vec::new(),
        };
        self.console
            .mutate(
                &self.password_reset,
                report,
                self.console.api.reset_root_password(password),
            )
            .await?;
        self.console.session().clear();
        tracing::info!("root password reset, session cleared");
        Ok(())
    }
}

fn write_token(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, format!("{}\n", token))
}
