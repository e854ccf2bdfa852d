use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::ConsoleError;

/// In-flight tracking for one submit control.
///
/// While a run is pending, further runs are refused with
/// [`ConsoleError::Busy`] instead of being queued; the pending request is
/// never cancelled. Each run is a single attempt.
#[derive(Debug, Default)]
pub struct Mutation {
    pending: AtomicBool,
}

struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub async fn run<T, F>(&self, fut: F) -> Result<T, ConsoleError>
    where
        F: Future<Output = Result<T, ConsoleError>>,
    {
        if self.pending.swap(true, Ordering::AcqRel) {
            return Err(ConsoleError::Busy);
        }
        let _guard = PendingGuard(&self.pending);
        fut.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[test]
    fn test_pending_resets_after_failure() {
        let mutation = Mutation::new();
        let res: Result<(), _> = tokio_test::block_on(mutation.run(async {
            Err(ConsoleError::Api {
                status: 500,
                message: None,
            })
        }));
        assert!(res.is_err());
        assert!(!mutation.is_pending());
    }

    #[tokio::test]
    async fn test_second_submit_refused_while_pending() {
        let mutation = Arc::new(Mutation::new());
        let (release, wait) = oneshot::channel::<()>();

        let first = {
            let mutation = mutation.clone();
            tokio::spawn(async move {
                mutation
                    .run(async move {
                        let _ = wait.await;
                        Ok::<_, ConsoleError>(1)
                    })
                    .await
            })
        };

        // let the first run take the slot
        while !mutation.is_pending() {
            tokio::task::yield_now().await;
        }

        let second = mutation.run(async { Ok::<_, ConsoleError>(2) }).await;
        assert!(matches!(second, Err(ConsoleError::Busy)));

        release.send(()).unwrap();
        assert_eq!(first.await.unwrap().unwrap(), 1);
        assert!(!mutation.is_pending());
    }
}
