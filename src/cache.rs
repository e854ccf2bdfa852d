use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifiers of the cached resource lists. Mutations invalidate these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AccessTokens,
    OAuth2List,
    MinimalAccounts,
    Proxies,
    MailboxMessages,
    /// One entry per search query; invalidated by prefix.
    SearchMessages(String),
    AllTags,
}

impl QueryKey {
    pub const SEARCH_PREFIX: &'static str = "search-messages";

    pub fn as_key(&self) -> String {
        match self {
            QueryKey::AccessTokens => "access-tokens".to_string(),
            QueryKey::OAuth2List => "oauth2-list".to_string(),
            QueryKey::MinimalAccounts => "minimal-account-list".to_string(),
            QueryKey::Proxies => "proxy-list".to_string(),
            QueryKey::MailboxMessages => "mailbox-list-messages".to_string(),
            QueryKey::SearchMessages(q) => format!("{}:{}", Self::SEARCH_PREFIX, q),
            QueryKey::AllTags => "all-tags".to_string(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

/// What a successful mutation clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Exact(QueryKey),
    /// Every key starting with the prefix.
    Prefix(&'static str),
}

/// Entry stored in the DashMap with an expiry timestamp.
#[derive(Clone)]
pub(crate) struct CacheEntry {
    value: String,
    pub(crate) expires_at: Instant,
}

/// In-process query cache keyed by resource list.
///
/// Values are stored as JSON so any serde type can be cached. Entries
/// honour their TTL on read and are evicted lazily; [`QueryCache::evict_expired`]
/// sweeps the rest. There is no transactional link between a server-side
/// change and invalidation here; callers invalidate after the mutation
/// succeeds and the next read refetches.
#[derive(Clone)]
pub struct QueryCache {
    pub(crate) local: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            local: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let key = key.as_key();
        if let Some(entry) = self.local.get(&key) {
            if Instant::now() < entry.expires_at {
                return serde_json::from_str(&entry.value).ok();
            }
            // expired: drop the ref before removing
            drop(entry);
            self.local.remove(&key);
        }
        None
    }

    pub fn set<T: Serialize>(&self, key: &QueryKey, value: &T) -> anyhow::Result<()> {
        let json = serde_json::to_string(value)?;
        self.local.insert(
            key.as_key(),
            CacheEntry {
                value: json,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    pub fn invalidate(&self, invalidation: &Invalidation) {
        match invalidation {
            Invalidation::Exact(key) => {
                self.local.remove(&key.as_key());
            }
            Invalidation::Prefix(prefix) => {
                self.local.retain(|k, _| !k.starts_with(prefix));
            }
        }
        tracing::debug!(?invalidation, "query cache invalidated");
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.local
            .get(&key.as_key())
            .map(|e| Instant::now() < e.expires_at)
            .unwrap_or(false)
    }

    /// Remove all expired entries.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.local.len();
        self.local.retain(|_, entry| entry.expires_at > now);
        before - self.local.len()
    }

    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_invalidate() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.set(&QueryKey::AccessTokens, &vec!["a", "b"]).unwrap();

        let got: Option<Vec<String>> = cache.get(&QueryKey::AccessTokens);
        assert_eq!(got, Some(vec!["a".to_string(), "b".to_string()]));

        cache.invalidate(&Invalidation::Exact(QueryKey::AccessTokens));
        assert!(!cache.contains(&QueryKey::AccessTokens));
    }

    #[test]
    fn test_prefix_invalidation_leaves_other_keys() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.set(&QueryKey::SearchMessages("from:alice".into()), &1).unwrap();
        cache.set(&QueryKey::SearchMessages("subject:invoice".into()), &2).unwrap();
        cache.set(&QueryKey::AllTags, &3).unwrap();

        cache.invalidate(&Invalidation::Prefix(QueryKey::SEARCH_PREFIX));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&QueryKey::AllTags));
    }

    #[test]
    fn test_expired_entries_are_not_returned() {
        let cache = QueryCache::new(Duration::from_millis(0));
        cache.set(&QueryKey::Proxies, &vec![1, 2]).unwrap();
        let got: Option<Vec<u32>> = cache.get(&QueryKey::Proxies);
        assert!(got.is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_evict_expired_counts_removed() {
        let cache = QueryCache::new(Duration::from_millis(0));
        cache.set(&QueryKey::Proxies, &1).unwrap();
        cache.set(&QueryKey::OAuth2List, &2).unwrap();
        assert_eq!(cache.evict_expired(), 2);
        assert!(cache.is_empty());
    }
}
