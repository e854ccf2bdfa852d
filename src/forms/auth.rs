use crate::errors::ValidationErrors;
use crate::i18n::{fill, Strings};

/// The console only ever signs in as root.
pub const ROOT_USERNAME: &str = "root";

pub const LOGIN_PASSWORD_MIN: usize = 4;
pub const ROOT_PASSWORD_MIN: usize = 6;

pub fn validate_login_password(password: &str, strings: &Strings) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if password.is_empty() {
        errors.push("password", strings.please_enter_password.as_str());
    } else if password.chars().count() < LOGIN_PASSWORD_MIN {
        let min = LOGIN_PASSWORD_MIN.to_string();
        errors.push("password", fill(&strings.password_min_length, &[("min", min.as_str())]));
    }
    errors.into_result(())
}

pub fn validate_root_password(password: &str, strings: &Strings) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if password.chars().count() < ROOT_PASSWORD_MIN {
        errors.push("password", strings.root_password_too_short.as_str());
    }
    errors.into_result(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_password_rules() {
        let strings = Strings::default();
        let empty = validate_login_password("", &strings).unwrap_err();
        assert_eq!(empty.field("password").unwrap().message, "Please enter your password");

        let short = validate_login_password("abc", &strings).unwrap_err();
        assert_eq!(
            short.field("password").unwrap().message,
            "Password must be at least 4 characters long"
        );

        assert!(validate_login_password("abcd", &strings).is_ok());
    }

    #[test]
    fn test_root_password_needs_six() {
        let strings = Strings::default();
        assert!(validate_root_password("", &strings).is_err());
        assert!(validate_root_password("12345", &strings).is_err());
        assert!(validate_root_password("123456", &strings).is_ok());
    }
}
