//! Notifier that writes user notifications to the log

use entigate_core::Notifier;
use entigate_domain::NotificationKind;
use tracing::{error, info, warn};

/// [`Notifier`] for processes without a UI: each notification becomes one
/// structured log event at a level matching its kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, summary: &str, detail: Option<&str>) {
        let detail = detail.unwrap_or_default();
        match kind {
            NotificationKind::Error => error!(summary, detail, "user_notification"),
            NotificationKind::Warn => warn!(summary, detail, "user_notification"),
            NotificationKind::Success | NotificationKind::Info => {
                info!(kind = %kind, summary, detail, "user_notification");
            }
        }
    }
}
