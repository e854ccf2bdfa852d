use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Batch delete keyed by account id.
///
/// Serializes as `{"<account_id>": [message ids...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeleteMessagesRequest(BTreeMap<u64, BTreeSet<u64>>);

impl DeleteMessagesRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(account_id: u64, ids: impl IntoIterator<Item = u64>) -> Self {
        let mut req = Self::new();
        req.add(account_id, ids);
        req
    }

    /// Accounts contributing no ids are left out of the body.
    pub fn add(&mut self, account_id: u64, ids: impl IntoIterator<Item = u64>) {
        let ids: BTreeSet<u64> = ids.into_iter().collect();
        if ids.is_empty() {
            return;
        }
        self.0.entry(account_id).or_default().extend(ids);
    }

    /// Total number of messages across all accounts.
    pub fn message_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.message_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_as_record_of_arrays() {
        let mut req = DeleteMessagesRequest::single(7, [30, 10, 20, 10]);
        req.add(9, [1]);

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "7": [10, 20, 30], "9": [1] })
        );
        assert_eq!(req.message_count(), 4);
    }

    #[test]
    fn test_account_without_ids_is_empty() {
        let req = DeleteMessagesRequest::single(7, []);
        assert!(req.is_empty());
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({}));
    }

    #[test]
    fn test_account_without_ids_is_left_out() {
        let mut req = DeleteMessagesRequest::new();
        req.add(7, []);
        req.add(9, [1]);
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({ "9": [1] }));
    }
}
