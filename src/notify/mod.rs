//! Ephemeral user-facing messages. Only one is visible at a time; a newer
//! message replaces the current one and restarts the dismiss timer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::errors::{PocForgeError, Surface};

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
}

/// Last-write-wins notification slot.
#[derive(Clone)]
pub struct Notifier {
    tx: Arc<watch::Sender<Option<Notification>>>,
    generation: Arc<AtomicU64>,
    dismiss_after: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER)
    }
}

impl Notifier {
    pub fn new(dismiss_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            dismiss_after,
        }
    }

    /// Replace whatever is showing. The timer of a superseded message can
    /// no longer clear the slot.
    pub fn publish(&self, level: Level, message: impl Into<String>) -> u64 {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let notification = Notification {
            id,
            level,
            message: message.into(),
        };
        debug!(id, ?level, message = %notification.message, "Notification");
        self.tx.send_replace(Some(notification));

        let tx = self.tx.clone();
        let generation = self.generation.clone();
        let after = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if generation.load(Ordering::SeqCst) == id {
                tx.send_if_modified(|slot| match slot {
                    Some(current) if current.id == id => {
                        *slot = None;
                        true
                    }
                    _ => false,
                });
            }
        });
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.publish(Level::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.publish(Level::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.publish(Level::Error, message)
    }

    /// Surface an error per its classification. Silent errors publish nothing.
    pub fn report_error(&self, error: &PocForgeError) -> Option<u64> {
        match error.classify().surface {
            Surface::Warning => Some(self.warning(error.user_message())),
            Surface::Error => Some(self.error(error.user_message())),
            Surface::Silent => None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Notification> {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss() {
        let notifier = Notifier::default();
        notifier.success("POC saved");
        assert_eq!(notifier.current().unwrap().level, Level::Success);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(notifier.current().is_some());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_write_wins_restarts_timer() {
        let notifier = Notifier::default();
        notifier.warning("first");
        tokio::time::sleep(Duration::from_millis(2000)).await;
        notifier.error("second");

        // First timer fires here but must not clear the newer message.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let shown = notifier.current().unwrap();
        assert_eq!(shown.message, "second");
        assert_eq!(shown.level, Level::Error);

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_error_by_classification() {
        let notifier = Notifier::default();
        assert!(notifier.report_error(&PocForgeError::Protocol("bad frame".into())).is_none());
        assert!(notifier.current().is_none());

        notifier.report_error(&PocForgeError::Validation("Target URL is required".into()));
        let shown = notifier.current().unwrap();
        assert_eq!(shown.level, Level::Warning);
        assert_eq!(shown.message, "Target URL is required");

        notifier.report_error(&PocForgeError::transport(Some(500), "HTTP 500: boom"));
        let shown = notifier.current().unwrap();
        assert_eq!(shown.level, Level::Error);
        assert_eq!(shown.message, "Network error: HTTP 500: boom");

        notifier.report_error(&PocForgeError::Application("模型调用失败".into()));
        assert_eq!(notifier.current().unwrap().message, "模型调用失败");
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscriber_sees_changes() {
        let notifier = Notifier::new(Duration::from_millis(100));
        let mut rx = notifier.subscribe();
        notifier.success("done");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().message, "done");
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
