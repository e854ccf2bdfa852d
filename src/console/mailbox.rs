use std::collections::BTreeSet;

use crate::cache::{Invalidation, QueryKey};
use crate::errors::{ConsoleError, ValidationErrors};
use crate::i18n::fill;
use crate::models::mailbox::DeleteMessagesRequest;
use crate::mutation::Mutation;
use crate::notification::Notice;

use super::{Console, Report};

const SELECTION_PATH: &str = "selection";

/// Delete dialog of the mailbox view: one account, a set of its messages.
pub struct MailboxDeleteDialog<'a> {
    console: &'a Console,
    account_id: Option<u64>,
    selected: BTreeSet<u64>,
    mutation: Mutation,
}

impl<'a> MailboxDeleteDialog<'a> {
    pub fn new(console: &'a Console, account_id: Option<u64>) -> Self {
        Self {
            console,
            account_id,
            selected: BTreeSet::new(),
            mutation: Mutation::new(),
        }
    }

    pub fn select(&mut self, ids: impl IntoIterator<Item = u64>) {
        self.selected.extend(ids);
    }

    pub fn selected(&self) -> &BTreeSet<u64> {
        &self.selected
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    /// Delete the selection. On success the selection is cleared.
    pub async fn confirm(&mut self) -> Result<usize, ConsoleError> {
        let s = &self.console.strings;
        let account_id = match self.account_id {
            Some(id) if !self.selected.is_empty() => id,
            _ => {
                let mut errors = ValidationErrors::new();
                errors.push(SELECTION_PATH, s.nothing_selected.as_str());
                return Err(errors.into());
            }
        };

        let request = DeleteMessagesRequest::single(account_id, self.selected.iter().copied());
        let report = Report {
            success: Some(Notice::success(
                s.mailbox_delete_success.as_str(),
                s.mailbox_delete_success_desc.as_str(),
            )),
            failure_title: s.mailbox_delete_error.clone(),
            fallback: s.delete_fallback.clone(),
            invalidate: vec![Invalidation::Exact(QueryKey::MailboxMessages)],
        };
        self.console
            .mutate(&self.mutation, report, self.console.api.delete_messages(&request))
            .await?;

        let count = request.message_count();
        tracing::info!(account_id, count, "messages deleted");
        self.selected.clear();
        Ok(count)
    }
}

/// Delete dialog of the search view: messages across several accounts.
pub struct SearchDeleteDialog<'a> {
    console: &'a Console,
    selection: DeleteMessagesRequest,
    mutation: Mutation,
}

impl<'a> SearchDeleteDialog<'a> {
    pub fn new(console: &'a Console) -> Self {
        Self {
            console,
            selection: DeleteMessagesRequest::new(),
            mutation: Mutation::new(),
        }
    }

    pub fn select(&mut self, account_id: u64, ids: impl IntoIterator<Item = u64>) {
        self.selection.add(account_id, ids);
    }

    pub fn selection(&self) -> &DeleteMessagesRequest {
        &self.selection
    }

    pub fn is_pending(&self) -> bool {
        self.mutation.is_pending()
    }

    pub async fn confirm(&mut self) -> Result<usize, ConsoleError> {
        let s = &self.console.strings;
        if self.selection.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.push(SELECTION_PATH, s.nothing_selected.as_str());
            return Err(errors.into());
        }

        let count = self.selection.message_count();
        let report = Report {
            success: Some(Notice::success(
                s.search_delete_success.as_str(),
                fill(&s.search_delete_success_desc, &[("count", count.to_string().as_str())]),
            )),
            failure_title: s.search_delete_error.clone(),
            fallback: s.delete_fallback.clone(),
            invalidate: vec![
                Invalidation::Prefix(QueryKey::SEARCH_PREFIX),
                Invalidation::Exact(QueryKey::AllTags),
            ],
        };
        self.console
            .mutate(
                &self.mutation,
                report,
                self.console.api.delete_messages(&self.selection),
            )
            .await?;

        tracing::info!(count, "search results deleted");
        self.selection = DeleteMessagesRequest::new();
        Ok(count)
    }
}
