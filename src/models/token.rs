// Access-token wire types, as returned by and sent to the archive server.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Account reference embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: u64,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub accounts: Vec<AccountRef>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub acl: Option<AccessControl>,
    /// Unix milliseconds.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub last_access_at: i64,
}

impl AccessToken {
    pub fn account_ids(&self) -> Vec<u64> {
        self.accounts.iter().map(|a| a.id).collect()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.created_at)
    }

    pub fn last_access(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.last_access_at)
    }
}

fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    if ms <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(ms).single()
}

/// Optional IP allow-list plus rate limit attached to a token.
///
/// Never sent with both parts empty: the form layer collapses that case to
/// "no ACL" before a payload is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_whitelist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Max requests per interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<u64>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
}

/// Body of the create and update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenPayload {
    pub accounts: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acl: Option<AccessControl>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_deserializes_with_missing_optionals() {
        let token: AccessToken = serde_json::from_value(json!({
            "token": "tk_1",
            "accounts": [{ "id": 3, "email": "a@example.com" }],
        }))
        .unwrap();

        assert_eq!(token.account_ids(), vec![3]);
        assert!(token.acl.is_none());
        assert!(token.description.is_none());
        assert!(token.created().is_none());
    }

    #[test]
    fn test_empty_acl_parts_are_not_serialized() {
        let acl = AccessControl {
            ip_whitelist: None,
            rate_limit: Some(RateLimit {
                quota: Some(100),
                interval: None,
            }),
        };
        assert_eq!(
            serde_json::to_value(&acl).unwrap(),
            json!({ "rate_limit": { "quota": 100 } })
        );
    }

    #[test]
    fn test_payload_omits_absent_fields() {
        let payload = AccessTokenPayload {
            accounts: vec![1, 2],
            description: None,
            acl: None,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "accounts": [1, 2] })
        );
    }

    #[test]
    fn test_timestamps_convert_from_millis() {
        let token = AccessToken {
            token: "t".into(),
            accounts: vec![],
            description: None,
            acl: None,
            created_at: 1_700_000_000_000,
            updated_at: 0,
            last_access_at: -5,
        };
        assert_eq!(token.created().unwrap().timestamp(), 1_700_000_000);
        assert!(token.last_access().is_none());
    }
}
