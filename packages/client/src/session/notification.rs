//! Local-notification capability.
//!
//! Fired when a direct message arrives while its conversation is not the
//! active context. Injected so non-interactive targets can plug in a
//! no-op (依存性の逆転: セッション層がポートを定義し、実装は外側が注入する).

/// Fire-and-forget local notification sink. No return contract.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Sink that drops every notification.
#[derive(Debug, Default)]
pub struct NoopNotificationSink;

impl NotificationSink for NoopNotificationSink {
    fn notify(&self, _title: &str, _body: &str) {}
}
