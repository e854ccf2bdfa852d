use crate::errors::ValidationErrors;
use crate::i18n::Strings;
use crate::models::token::RateLimit;

pub const QUOTA_PATH: &str = "acl.rate_limit.quota";
pub const INTERVAL_PATH: &str = "acl.rate_limit.interval";

/// Raw quota/interval fields as typed by the operator. Signed so that
/// zero and negative input can be reported rather than rejected by the
/// parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInput {
    pub quota: Option<i64>,
    pub interval: Option<i64>,
}

impl From<&RateLimit> for RateLimitInput {
    fn from(limit: &RateLimit) -> Self {
        Self {
            quota: limit.quota.and_then(|q| i64::try_from(q).ok()),
            interval: limit.interval.and_then(|i| i64::try_from(i).ok()),
        }
    }
}

/// Validate both fields and collapse `{None, None}` to `None`.
///
/// Errors are appended to `errors`; the return value is only meaningful when
/// nothing was appended.
pub fn compose(
    input: Option<&RateLimitInput>,
    strings: &Strings,
    errors: &mut ValidationErrors,
) -> Option<RateLimit> {
    let input = input?;
    let quota = positive(input.quota, QUOTA_PATH, &strings.quota_positive, errors);
    let interval = positive(input.interval, INTERVAL_PATH, &strings.interval_positive, errors);

    if quota.is_none() && interval.is_none() {
        return None;
    }
    Some(RateLimit { quota, interval })
}

fn positive(
    value: Option<i64>,
    path: &'static str,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<u64> {
    match value {
        Some(v) if v > 0 => Some(v as u64),
        Some(_) => {
            errors.push(path, message);
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: RateLimitInput) -> (Option<RateLimit>, ValidationErrors) {
        let mut errors = ValidationErrors::new();
        let out = compose(Some(&input), &Strings::default(), &mut errors);
        (out, errors)
    }

    #[test]
    fn test_both_unset_collapses() {
        let (out, errors) = run(RateLimitInput::default());
        assert!(out.is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_single_field_kept() {
        let (out, errors) = run(RateLimitInput {
            quota: Some(100),
            interval: None,
        });
        assert!(errors.is_empty());
        assert_eq!(
            out,
            Some(RateLimit {
                quota: Some(100),
                interval: None
            })
        );
    }

    #[test]
    fn test_zero_and_negative_are_field_scoped() {
        let (_, errors) = run(RateLimitInput {
            quota: Some(0),
            interval: Some(-30),
        });
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.field(QUOTA_PATH).unwrap().message,
            "Quota must be a positive integer."
        );
        assert_eq!(
            errors.field(INTERVAL_PATH).unwrap().message,
            "Interval must be a positive integer."
        );
    }

    #[test]
    fn test_absent_sub_form() {
        let mut errors = ValidationErrors::new();
        assert!(compose(None, &Strings::default(), &mut errors).is_none());
        assert!(errors.is_empty());
    }
}
