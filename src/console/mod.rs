//! Console flows: the dialogs of the admin console as library types.
//!
//! A flow validates its input, runs the request through its own
//! [`Mutation`], then reports the outcome through the [`Notifier`] and
//! invalidates the query-cache keys the change affects.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::api::ApiClient;
use crate::cache::{Invalidation, QueryCache, QueryKey};
use crate::errors::ConsoleError;
use crate::i18n::Strings;
use crate::models::account::{MinimalAccount, Proxy};
use crate::models::oauth2::OAuth2Entity;
use crate::models::token::AccessToken;
use crate::mutation::Mutation;
use crate::notification::{Notice, Notifier};
use crate::session::Session;

pub mod mailbox;
pub mod oauth2;
pub mod root;
pub mod tokens;

/// Shared context handed to every flow.
pub struct Console {
    pub api: ApiClient,
    pub cache: QueryCache,
    pub strings: Strings,
    notifier: Arc<dyn Notifier>,
}

/// How a mutation's outcome is reported.
pub(crate) struct Report {
    pub success: Option<Notice>,
    pub failure_title: String,
    pub fallback: String,
    pub invalidate: Vec<Invalidation>,
}

impl Console {
    pub fn new(api: ApiClient, cache: QueryCache, strings: Strings, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            cache,
            strings,
            notifier,
        }
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    pub async fn access_tokens(&self) -> Result<Vec<AccessToken>, ConsoleError> {
        self.cached(QueryKey::AccessTokens, self.api.list_access_tokens()).await
    }

    pub async fn oauth2_list(&self) -> Result<Vec<OAuth2Entity>, ConsoleError> {
        self.cached(QueryKey::OAuth2List, self.api.list_oauth2()).await
    }

    pub async fn minimal_accounts(&self) -> Result<Vec<MinimalAccount>, ConsoleError> {
        self.cached(QueryKey::MinimalAccounts, self.api.list_minimal_accounts()).await
    }

    pub async fn proxies(&self) -> Result<Vec<Proxy>, ConsoleError> {
        self.cached(QueryKey::Proxies, self.api.list_proxies()).await
    }

    pub async fn find_access_token(&self, token: &str) -> Result<Option<AccessToken>, ConsoleError> {
        Ok(self
            .access_tokens()
            .await?
            .into_iter()
            .find(|t| t.token == token))
    }

    pub async fn find_oauth2(&self, id: u64) -> Result<Option<OAuth2Entity>, ConsoleError> {
        Ok(self.oauth2_list().await?.into_iter().find(|e| e.id == id))
    }

    async fn cached<T, F>(&self, key: QueryKey, fetch: F) -> Result<T, ConsoleError>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, ConsoleError>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            tracing::debug!(key = %key, "query cache hit");
            return Ok(hit);
        }
        let value = fetch.await?;
        if let Err(e) = self.cache.set(&key, &value) {
            tracing::warn!(key = %key, error = %e, "failed to cache query result");
        }
        Ok(value)
    }

    /// Run `fut` under `mutation` and report the outcome.
    ///
    /// A refused run ([`ConsoleError::Busy`]) is returned silently: the
    /// submit control is considered disabled while a request is pending.
    pub(crate) async fn mutate<T, F>(&self, mutation: &Mutation, report: Report, fut: F) -> Result<T, ConsoleError>
    where
        F: Future<Output = Result<T, ConsoleError>>,
    {
        match mutation.run(fut).await {
            Ok(value) => {
                for invalidation in &report.invalidate {
                    self.cache.invalidate(invalidation);
                }
                if let Some(notice) = report.success {
                    self.notify(notice);
                }
                Ok(value)
            }
            Err(ConsoleError::Busy) => Err(ConsoleError::Busy),
            Err(e) => {
                tracing::error!(error = %e, "{}", report.failure_title);
                self.notify(Notice::failure(
                    report.failure_title,
                    e.user_message(&report.fallback),
                ));
                Err(e)
            }
        }
    }
}
