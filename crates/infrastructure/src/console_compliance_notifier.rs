//! Console notifier for development. Logs alerts to tracing output.

use async_trait::async_trait;
use ppecheck_application::{ComplianceNotifier, NotificationDelivery};
use ppecheck_core::AppResult;
use ppecheck_domain::NotificationMessage;
use tracing::info;

/// Development notifier that logs alerts to the console.
#[derive(Clone)]
pub struct ConsoleComplianceNotifier;

impl ConsoleComplianceNotifier {
    /// Creates a new console notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleComplianceNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComplianceNotifier for ConsoleComplianceNotifier {
    async fn notify(&self, message: &NotificationMessage) -> AppResult<NotificationDelivery> {
        info!(
            subject = message.subject(),
            passed = message.is_passed(),
            "--- COMPLIANCE ALERT (console) ---\n{}\n--- END ALERT ---",
            message.to_text()
        );

        Ok(NotificationDelivery::Delivered)
    }
}
