use std::fmt;

use thiserror::Error;

/// A single field-scoped validation failure.
///
/// `path` uses the dotted form of the form field (`acl.ip_whitelist`,
/// `acl.rate_limit.quota`, `client_secret`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: &'static str,
    pub message: String,
}

/// Every field error produced by one pass over a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, path: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            path,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First error reported against `path`, if any.
    pub fn field(&self, path: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.path == path)
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unauthorized")]
    Unauthorized { message: Option<String> },

    #[error("server returned {status}")]
    Api { status: u16, message: Option<String> },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("a request is already in flight")]
    Busy,

    #[error("confirmation does not match")]
    ConfirmationMismatch,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ConsoleError {
    /// Text to show the operator for a failed attempt.
    ///
    /// Prefers the message the server put in its error body, then the
    /// transport/local error text, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ConsoleError::Api {
                message: Some(m), ..
            }
            | ConsoleError::Unauthorized { message: Some(m) } => m.clone(),
            ConsoleError::Api { status, .. } => format!("Request failed with status code {}", status),
            ConsoleError::Unauthorized { message: None } => {
                "Request failed with status code 401".to_string()
            }
            ConsoleError::Network(e) => e.to_string(),
            ConsoleError::Io(e) => e.to_string(),
            ConsoleError::Validation(e) => e.to_string(),
            ConsoleError::Internal(e) => e.to_string(),
            ConsoleError::Busy | ConsoleError::ConfirmationMismatch => {
                fallback.to_string()
            }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ConsoleError::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins() {
        let err = ConsoleError::Api {
            status: 400,
            message: Some("account 7 does not exist".into()),
        };
        assert_eq!(err.user_message("creation failed"), "account 7 does not exist");
    }

    #[test]
    fn test_status_text_when_body_has_no_message() {
        let err = ConsoleError::Api {
            status: 502,
            message: None,
        };
        assert_eq!(
            err.user_message("creation failed"),
            "Request failed with status code 502"
        );
    }

    #[test]
    fn test_fallback_for_local_refusals() {
        assert_eq!(ConsoleError::Busy.user_message("try later"), "try later");
        assert_eq!(
            ConsoleError::ConfirmationMismatch.user_message("delete failed"),
            "delete failed"
        );
    }

    #[test]
    fn test_validation_errors_display_and_lookup() {
        let mut errs = ValidationErrors::new();
        errs.push("accounts", "At least one account is required.");
        errs.push("acl.ip_whitelist", "Invalid IP addresses found.");
        assert_eq!(errs.len(), 2);
        assert_eq!(
            errs.field("acl.ip_whitelist").map(|e| e.message.as_str()),
            Some("Invalid IP addresses found.")
        );
        assert!(errs.field("description").is_none());
        assert!(errs.to_string().contains("accounts: At least one account is required."));
    }
}
