//! Operator-facing text.
//!
//! Every validation rule and console flow takes its wording from a
//! [`Strings`] table instead of hard-coding it, so a translated table can be
//! dropped in via `BICHON_STRINGS=/path/to/strings.json`. Missing keys fall
//! back to English.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Strings {
    // access tokens
    pub token_title: String,
    pub created: String,
    pub updated: String,
    pub token_saved_desc: String,
    pub creation_failed: String,
    pub update_failed: String,
    pub token_save_fallback: String,
    pub token_deleted: String,
    pub token_deleted_desc: String,
    pub token_delete_failed: String,
    pub delete_fallback: String,
    pub at_least_one_account: String,
    pub description_too_long: String,
    pub invalid_ip_addresses: String,
    pub quota_positive: String,
    pub interval_positive: String,

    // oauth2
    pub oauth2_saved_title: String,
    pub oauth2_saved_desc: String,
    pub oauth2_save_failed_title: String,
    pub client_id_required: String,
    pub client_secret_required: String,
    pub field_required: String,
    pub invalid_url: String,
    pub key_cannot_be_empty: String,
    pub value_cannot_be_empty: String,
    pub oauth2_client_updated: String,
    pub oauth2_toggled_desc: String,
    pub enabled: String,
    pub disabled: String,
    pub status_update_fallback: String,
    pub oauth2_deleted: String,
    pub oauth2_deleted_desc: String,
    pub oauth2_delete_failed: String,
    pub oauth2_delete_fallback: String,
    pub select_an_account: String,
    pub authorize_failed: String,
    pub authorize_fallback: String,
    pub auth_failed: String,
    pub auth_success: String,
    pub auth_success_desc: String,
    pub auth_no_status: String,
    pub unknown_error: String,

    // mailbox / search
    pub mailbox_delete_success: String,
    pub mailbox_delete_success_desc: String,
    pub mailbox_delete_error: String,
    pub search_delete_success: String,
    pub search_delete_success_desc: String,
    pub search_delete_error: String,
    pub nothing_selected: String,

    // sign-in / root
    pub please_enter_password: String,
    pub password_min_length: String,
    pub login_failed: String,
    pub invalid_password: String,
    pub something_went_wrong: String,
    pub root_token_reset: String,
    pub login_info_updated: String,
    pub failed_to_copy: String,
    pub invalid_password_title: String,
    pub root_password_too_short: String,
    pub root_password_reset: String,
    pub use_new_password: String,
    pub reset_failed: String,
}

impl Default for Strings {
    fn default() -> Self {
        Self {
            token_title: "Access Token".into(),
            created: "Created".into(),
            updated: "Updated".into(),
            token_saved_desc: "Your access token has been successfully {action}.".into(),
            creation_failed: "Creation failed".into(),
            update_failed: "Update failed".into(),
            token_save_fallback: "{action}, please try again later".into(),
            token_deleted: "Access token deleted".into(),
            token_deleted_desc: "Your access token has been successfully deleted.".into(),
            token_delete_failed: "Access token delete failed".into(),
            delete_fallback: "Delete failed, please try again later".into(),
            at_least_one_account: "At least one account is required.".into(),
            description_too_long: "Description must not exceed 255 characters.".into(),
            invalid_ip_addresses: "Invalid IP addresses found.".into(),
            quota_positive: "Quota must be a positive integer.".into(),
            interval_positive: "Interval must be a positive integer.".into(),

            oauth2_saved_title: "OAuth2 {action}".into(),
            oauth2_saved_desc: "Your OAuth2 application has been successfully {action}.".into(),
            oauth2_save_failed_title: "OAuth2 {action}".into(),
            client_id_required: "Client ID cannot be empty".into(),
            client_secret_required: "Client secret is required".into(),
            field_required: "{field} cannot be empty".into(),
            invalid_url: "Invalid {field} format".into(),
            key_cannot_be_empty: "Key cannot be empty".into(),
            value_cannot_be_empty: "Value cannot be empty".into(),
            oauth2_client_updated: "OAuth2 client updated".into(),
            oauth2_toggled_desc: "OAuth2 client has been successfully {action}.".into(),
            enabled: "Enabled".into(),
            disabled: "Disabled".into(),
            status_update_fallback: "Status update failed, please try again later".into(),
            oauth2_deleted: "OAuth2 application deleted".into(),
            oauth2_deleted_desc: "Your OAuth2 application has been successfully deleted.".into(),
            oauth2_delete_failed: "OAuth2 delete failed".into(),
            oauth2_delete_fallback: "Delete failed, please try again later".into(),
            select_an_account: "Select an account".into(),
            authorize_failed: "Get authorize URL failed".into(),
            authorize_fallback: "get authorize url failed, please try again later".into(),
            auth_failed: "Authorization failed".into(),
            auth_success: "Authorization successful".into(),
            auth_success_desc: "The account has been authorized and can now be synchronized.".into(),
            auth_no_status: "No authorization status was returned.".into(),
            unknown_error: "Unknown error".into(),

            mailbox_delete_success: "Messages deleted".into(),
            mailbox_delete_success_desc: "The selected messages have been deleted.".into(),
            mailbox_delete_error: "Delete failed".into(),
            search_delete_success: "Messages deleted".into(),
            search_delete_success_desc: "{count} message(s) have been deleted.".into(),
            search_delete_error: "Delete failed".into(),
            nothing_selected: "No messages selected.".into(),

            please_enter_password: "Please enter your password".into(),
            password_min_length: "Password must be at least {min} characters long".into(),
            login_failed: "Login failed".into(),
            invalid_password: "Invalid password".into(),
            something_went_wrong: "Something went wrong".into(),
            root_token_reset: "The root token has been reset".into(),
            login_info_updated: "Your login information has been updated.".into(),
            failed_to_copy: "Failed to copy text".into(),
            invalid_password_title: "Invalid password".into(),
            root_password_too_short: "Root password must be at least 6 characters.".into(),
            root_password_reset: "The root password has been reset".into(),
            use_new_password: "Use the new password for your next login.".into(),
            reset_failed: "Reset failed".into(),
        }
    }
}

impl Strings {
    /// Load a (possibly partial) JSON string table.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read strings file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid strings file {}", path.display()))
    }
}

/// Substitute `{name}` placeholders in `template`.
pub fn fill(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fill_placeholders() {
        assert_eq!(
            fill("Your access token has been successfully {action}.", &[("action", "created")]),
            "Your access token has been successfully created."
        );
        assert_eq!(fill("{count} of {count}", &[("count", "3")]), "3 of 3");
        assert_eq!(fill("no placeholders", &[("x", "y")]), "no placeholders");
    }

    #[test]
    fn test_partial_table_falls_back_to_english() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"invalid_ip_addresses": "IP-Adressen ungültig."}}"#).unwrap();

        let strings = Strings::load(file.path()).unwrap();
        assert_eq!(strings.invalid_ip_addresses, "IP-Adressen ungültig.");
        assert_eq!(strings.quota_positive, "Quota must be a positive integer.");
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Strings::load(file.path()).is_err());
    }
}
