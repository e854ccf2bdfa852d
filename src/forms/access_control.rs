use crate::errors::ValidationErrors;
use crate::i18n::Strings;
use crate::models::token::AccessControl;

use super::ip_list;
use super::rate_limit::{self, RateLimitInput};

pub const IP_WHITELIST_PATH: &str = "acl.ip_whitelist";

/// The ACL part of the token form: a free-text allow-list and the
/// rate-limit sub-form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessControlInput {
    pub ip_whitelist: Option<String>,
    pub rate_limit: Option<RateLimitInput>,
}

impl From<&AccessControl> for AccessControlInput {
    fn from(acl: &AccessControl) -> Self {
        Self {
            ip_whitelist: acl.ip_whitelist.as_ref().map(|ips| ips.join("\n")),
            rate_limit: acl.rate_limit.as_ref().map(RateLimitInput::from),
        }
    }
}

/// Normalize the allow-list, validate it, drop an empty rate limit, and
/// collapse to `None` when neither part survives.
pub fn compose(
    input: Option<&AccessControlInput>,
    strings: &Strings,
    errors: &mut ValidationErrors,
) -> Option<AccessControl> {
    let input = input?;

    let ip_whitelist = match input.ip_whitelist.as_deref() {
        Some(raw) => match ip_list::normalize(raw) {
            Ok(list) => list.into_whitelist(),
            Err(invalid) => {
                tracing::debug!(invalid = ?invalid.0, "rejected ip whitelist entries");
                errors.push(IP_WHITELIST_PATH, strings.invalid_ip_addresses.as_str());
                None
            }
        },
        None => None,
    };

    let rate_limit = rate_limit::compose(input.rate_limit.as_ref(), strings, errors);

    if ip_whitelist.is_none() && rate_limit.is_none() {
        return None;
    }
    Some(AccessControl {
        ip_whitelist,
        rate_limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::token::RateLimit;

    fn run(input: AccessControlInput) -> Result<Option<AccessControl>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let acl = compose(Some(&input), &Strings::default(), &mut errors);
        errors.into_result(acl)
    }

    #[test]
    fn test_all_empty_collapses_to_absent() {
        let acl = run(AccessControlInput {
            ip_whitelist: None,
            rate_limit: Some(RateLimitInput::default()),
        })
        .unwrap();
        assert!(acl.is_none());
    }

    #[test]
    fn test_whitespace_only_whitelist_collapses() {
        let acl = run(AccessControlInput {
            ip_whitelist: Some("  \n\n ".into()),
            rate_limit: None,
        })
        .unwrap();
        assert!(acl.is_none());
    }

    #[test]
    fn test_rate_limit_only() {
        let acl = run(AccessControlInput {
            ip_whitelist: Some(String::new()),
            rate_limit: Some(RateLimitInput {
                quota: Some(100),
                interval: None,
            }),
        })
        .unwrap()
        .unwrap();
        assert!(acl.ip_whitelist.is_none());
        assert_eq!(
            acl.rate_limit,
            Some(RateLimit {
                quota: Some(100),
                interval: None
            })
        );
    }

    #[test]
    fn test_invalid_ip_surfaces_on_whitelist_path() {
        let errors = run(AccessControlInput {
            ip_whitelist: Some("1.1.1.1\n::1".into()),
            rate_limit: None,
        })
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.field(IP_WHITELIST_PATH).unwrap().message,
            "Invalid IP addresses found."
        );
    }

    #[test]
    fn test_errors_from_both_parts_are_collected() {
        let errors = run(AccessControlInput {
            ip_whitelist: Some("nope".into()),
            rate_limit: Some(RateLimitInput {
                quota: Some(-1),
                interval: Some(60),
            }),
        })
        .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_round_trip_from_existing_acl() {
        let existing = AccessControl {
            ip_whitelist: Some(vec!["1.1.1.1".into(), "2.2.2.2".into()]),
            rate_limit: Some(RateLimit {
                quota: Some(10),
                interval: Some(60),
            }),
        };
        let again = run(AccessControlInput::from(&existing)).unwrap();
        assert_eq!(again, Some(existing));
    }
}
