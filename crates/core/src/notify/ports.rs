//! Port interface for presenting notifications to the user
//!
//! Presentation (toasts, banners, logs) is owned by the UI shell. Core code
//! fires a notification and moves on; it never waits for it to be shown.

use std::sync::Arc;

use entigate_domain::NotificationKind;
use parking_lot::Mutex;

/// A notification as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Presentation style.
    pub kind: NotificationKind,
    /// Headline text.
    pub summary: String,
    /// Optional secondary text.
    pub detail: Option<String>,
}

/// Fire-and-forget sink for user notifications
pub trait Notifier: Send + Sync {
    /// Present a notification without waiting for it to be shown.
    fn notify(&self, kind: NotificationKind, summary: &str, detail: Option<&str>);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, kind: NotificationKind, summary: &str, detail: Option<&str>) {
        (**self).notify(kind, summary, detail);
    }
}

/// Notifier that keeps every notification in memory.
///
/// Useful for headless front-ends that poll for messages, and in tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    /// Empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything notified so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    /// Remove and return all pending notifications.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, kind: NotificationKind, summary: &str, detail: Option<&str>) {
        self.sent.lock().push(Notification {
            kind,
            summary: summary.to_string(),
            detail: detail.map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_records_in_order() {
        let notifier = Arc::new(MemoryNotifier::new());
        let sink: Arc<dyn Notifier> = notifier.clone();

        sink.notify(NotificationKind::Success, "saved", None);
        sink.notify(NotificationKind::Error, "failed", Some("why"));

        let sent = notifier.drain();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].detail.as_deref(), Some("why"));
        assert!(notifier.notifications().is_empty());
    }
}
