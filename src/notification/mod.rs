//! Transient operator notifications (success confirmations and failure
//! reports) emitted by the console flows.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub variant: Variant,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: Variant::Default,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: Variant::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the terminal: confirmations on stdout, failures on
/// stderr. Also logged.
///
/// Clones share the count of failures already printed, so the caller can
/// tell whether an error it is about to report was shown.
#[derive(Debug, Clone, Default)]
pub struct TerminalNotifier {
    failures: Arc<AtomicUsize>,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures_shown(&self) -> usize {
        self.failures.load(Ordering::Acquire)
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        match notice.variant {
            Variant::Default => {
                tracing::info!(title = %notice.title, "{}", notice.description);
                println!("{}: {}", notice.title, notice.description);
            }
            Variant::Destructive => {
                tracing::warn!(title = %notice.title, "{}", notice.description);
                eprintln!("{}: {}", notice.title, notice.description);
                self.failures.fetch_add(1, Ordering::AcqRel);
            }
        }
    }
}

/// Keeps every notice in memory. Used by tests and by embedders that render
/// notices themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().ok().and_then(|n| n.last().cloned())
    }

    pub fn clear(&self) {
        if let Ok(mut n) = self.notices.lock() {
            n.clear();
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut n) = self.notices.lock() {
            n.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Notice::success("Access Token Created", "done"));
        notifier.notify(Notice::failure("Delete failed", "boom"));

        let all = notifier.notices();
        assert_eq!(all.len(), 2);
        assert!(!all[0].is_failure());
        assert!(notifier.last().unwrap().is_failure());

        notifier.clear();
        assert!(notifier.last().is_none());
    }

    #[test]
    fn test_terminal_notifier_counts_failures_across_clones() {
        let notifier = TerminalNotifier::new();
        let shared = notifier.clone();
        shared.notify(Notice::success("Access Token Created", "done"));
        assert_eq!(notifier.failures_shown(), 0);
        shared.notify(Notice::failure("Delete failed", "boom"));
        assert_eq!(notifier.failures_shown(), 1);
    }

    #[test]
    fn test_notice_serializes_variant_lowercase() {
        let json = serde_json::to_value(Notice::failure("t", "d")).unwrap();
        assert_eq!(json["variant"], "destructive");
    }
}
