//! One-shot cancellation handle.
//!
//! A `CancelHandle` is signalled at most once with a reason. Clones share the
//! same state, so the caller keeps one clone and passes another into the
//! request. The transport checks the handle before dispatch and races it
//! against the in-flight exchange afterwards.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CancelHandle {
    reason: Arc<watch::Sender<Option<String>>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (reason, _) = watch::channel(None);
        Self {
            reason: Arc::new(reason),
        }
    }

    /// Signal cancellation. Returns `false` if the handle was already
    /// signalled, in which case the original reason is kept.
    pub fn signal(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        self.reason.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(reason);
            true
        })
    }

    pub fn is_signalled(&self) -> bool {
        self.reason.borrow().is_some()
    }

    pub fn reason(&self) -> Option<String> {
        self.reason.borrow().clone()
    }

    /// Resolve with the reason once the handle is signalled.
    pub async fn cancelled(&self) -> String {
        let mut rx = self.reason.subscribe();
        let reason = rx.wait_for(Option::is_some).await.map(|reason| reason.clone());
        match reason {
            Ok(reason) => reason.unwrap_or_default(),
            // The sender lives as long as `self`, so this never resolves.
            Err(_) => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn fresh_handle_is_not_signalled() {
        let handle = CancelHandle::new();
        assert!(!handle.is_signalled());
        assert_eq!(handle.reason(), None);
    }

    #[test]
    fn second_signal_is_ignored() {
        let handle = CancelHandle::new();
        assert!(handle.signal("first"));
        assert!(!handle.signal("second"));
        assert_eq!(handle.reason().as_deref(), Some("first"));
    }

    #[test]
    fn clones_share_state() {
        let handle = CancelHandle::new();
        let other = handle.clone();
        other.signal("stop");
        assert!(handle.is_signalled());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_signalled() {
        let handle = CancelHandle::new();
        handle.signal("done");
        assert_eq!(handle.cancelled().await, "done");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wakes_on_later_signal() {
        let handle = CancelHandle::new();
        let signaller = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            signaller.signal("later");
        });
        assert_eq!(handle.cancelled().await, "later");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_can_be_awaited_on_a_spawned_task() {
        let handle = CancelHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.signal("from another task");
        assert_eq!(task.await.unwrap(), "from another task");
    }
}
