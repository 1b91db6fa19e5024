use async_trait::async_trait;
use ppecheck_core::AppResult;
use ppecheck_domain::NotificationMessage;

/// Result of a notification attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationDelivery {
    /// The message was accepted by the channel.
    Delivered,
    /// The channel is not configured; nothing was sent.
    Skipped {
        /// Why the message was not sent.
        reason: String,
    },
}

/// Port for compliance alert delivery.
#[async_trait]
pub trait ComplianceNotifier: Send + Sync {
    /// Sends one alert message.
    async fn notify(&self, message: &NotificationMessage) -> AppResult<NotificationDelivery>;
}
