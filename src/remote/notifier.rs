use log::log;

use crate::data::Notification;

/// Fire-and-forget destination for user notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log at a level matching their severity
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: Notification) {
        log!(
            notification.severity.log_level(),
            "[{}] {}",
            notification.severity,
            notification.display_text()
        );
    }
}
