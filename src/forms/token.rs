use std::collections::HashSet;

use crate::errors::ValidationErrors;
use crate::i18n::Strings;
use crate::models::token::{AccessToken, AccessTokenPayload};

use super::access_control::{self, AccessControlInput};
use super::description_too_long;

pub const ACCOUNTS_PATH: &str = "accounts";
pub const DESCRIPTION_PATH: &str = "description";

/// Everything the token dialog collects before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenFormInput {
    pub accounts: Vec<u64>,
    pub description: Option<String>,
    pub acl: Option<AccessControlInput>,
}

impl TokenFormInput {
    /// Pre-fill for editing an existing token.
    pub fn from_token(token: &AccessToken) -> Self {
        Self {
            accounts: token.account_ids(),
            description: token.description.clone(),
            acl: token.acl.as_ref().map(AccessControlInput::from),
        }
    }
}

/// Validation rules for the token form, with wording from `strings`.
pub struct TokenSchema<'a> {
    strings: &'a Strings,
}

impl<'a> TokenSchema<'a> {
    pub fn new(strings: &'a Strings) -> Self {
        Self { strings }
    }

    /// Validate `input` and build the create/update body.
    ///
    /// The allow-list is normalized exactly once and that result goes
    /// straight into the payload.
    pub fn parse(&self, input: &TokenFormInput) -> Result<AccessTokenPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if input.accounts.is_empty() {
            errors.push(ACCOUNTS_PATH, self.strings.at_least_one_account.as_str());
        }
        let mut seen = HashSet::new();
        let accounts: Vec<u64> = input
            .accounts
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        if let Some(desc) = &input.description {
            if description_too_long(desc) {
                errors.push(DESCRIPTION_PATH, self.strings.description_too_long.as_str());
            }
        }
        // An empty string is sent as-is so an edit can clear the description.
        let description = input.description.clone();

        let acl = access_control::compose(input.acl.as_ref(), self.strings, &mut errors);

        errors.into_result(AccessTokenPayload {
            accounts,
            description,
            acl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::rate_limit::RateLimitInput;
    use crate::models::token::{AccessControl, AccountRef};
    use serde_json::json;

    fn parse(input: &TokenFormInput) -> Result<AccessTokenPayload, ValidationErrors> {
        let strings = Strings::default();
        TokenSchema::new(&strings).parse(input)
    }

    #[test]
    fn test_requires_an_account() {
        let errors = parse(&TokenFormInput::default()).unwrap_err();
        assert_eq!(
            errors.field(ACCOUNTS_PATH).unwrap().message,
            "At least one account is required."
        );
    }

    #[test]
    fn test_description_limit_counts_utf16_units() {
        let mut input = TokenFormInput {
            accounts: vec![1],
            description: Some("é".repeat(255)),
            acl: None,
        };
        assert!(parse(&input).is_ok());

        input.description = Some("x".repeat(256));
        let errors = parse(&input).unwrap_err();
        assert!(errors.field(DESCRIPTION_PATH).is_some());

        // 200 characters, 400 UTF-16 units
        input.description = Some("\u{1F4E7}".repeat(200));
        let errors = parse(&input).unwrap_err();
        assert!(errors.field(DESCRIPTION_PATH).is_some());
    }

    #[test]
    fn test_cleared_description_is_sent_empty() {
        let token = AccessToken {
            token: "tk".into(),
            accounts: vec![AccountRef {
                id: 5,
                email: "ops@example.com".into(),
            }],
            description: Some("old".into()),
            acl: None,
            created_at: 0,
            updated_at: 0,
            last_access_at: 0,
        };
        let mut input = TokenFormInput::from_token(&token);
        input.description = Some(String::new());
        let payload = parse(&input).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "accounts": [5], "description": "" })
        );
    }

    #[test]
    fn test_duplicate_ips_reach_payload_once() {
        let payload = parse(&TokenFormInput {
            accounts: vec![1],
            description: None,
            acl: Some(AccessControlInput {
                ip_whitelist: Some("1.1.1.1\n1.1.1.1\n2.2.2.2".into()),
                rate_limit: None,
            }),
        })
        .unwrap();
        let ips = payload.acl.unwrap().ip_whitelist.unwrap();
        assert_eq!(ips.len(), 2);
        assert!(ips.contains(&"1.1.1.1".to_string()));
        assert!(ips.contains(&"2.2.2.2".to_string()));
    }

    #[test]
    fn test_empty_rate_limit_yields_no_acl_key() {
        let payload = parse(&TokenFormInput {
            accounts: vec![1],
            description: None,
            acl: Some(AccessControlInput {
                ip_whitelist: None,
                rate_limit: Some(RateLimitInput::default()),
            }),
        })
        .unwrap();
        assert!(payload.acl.is_none());
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({ "accounts": [1] }));
    }

    #[test]
    fn test_unchanged_edit_reproduces_acl() {
        let token = AccessToken {
            token: "tk".into(),
            accounts: vec![AccountRef {
                id: 5,
                email: "ops@example.com".into(),
            }],
            description: Some("ci".into()),
            acl: Some(AccessControl {
                ip_whitelist: Some(vec!["1.1.1.1".into()]),
                rate_limit: None,
            }),
            created_at: 0,
            updated_at: 0,
            last_access_at: 0,
        };
        let payload = parse(&TokenFormInput::from_token(&token)).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "accounts": [5],
                "description": "ci",
                "acl": { "ip_whitelist": ["1.1.1.1"] }
            })
        );
    }

    #[test]
    fn test_accounts_are_deduplicated() {
        let payload = parse(&TokenFormInput {
            accounts: vec![3, 1, 3],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(payload.accounts, vec![3, 1]);
    }
}
