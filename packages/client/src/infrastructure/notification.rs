//! Notification sink implementations.

use crate::session::notification::NotificationSink;

/// Sink that surfaces notifications through the tracing pipeline; used by
/// the CLI where no system notification service is assumed.
#[derive(Debug, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, title: &str, body: &str) {
        tracing::info!(target: "notification", "{title}: {body}");
    }
}
