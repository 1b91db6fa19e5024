use async_trait::async_trait;
use ppecheck_application::{ComplianceNotifier, NotificationDelivery};
use ppecheck_core::{AppError, AppResult};
use ppecheck_domain::NotificationMessage;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::warn;
use url::Url;

#[derive(Debug, Serialize)]
struct WebhookPayload {
    text: String,
}

/// Chat incoming-webhook notifier.
///
/// A notifier without a URL is valid and skips every delivery.
#[derive(Clone)]
pub struct WebhookComplianceNotifier {
    http_client: reqwest::Client,
    webhook_url: Option<Url>,
}

impl WebhookComplianceNotifier {
    /// Creates a notifier posting to the given webhook.
    #[must_use]
    pub fn new(http_client: reqwest::Client, webhook_url: Option<Url>) -> Self {
        Self {
            http_client,
            webhook_url,
        }
    }
}

#[async_trait]
impl ComplianceNotifier for WebhookComplianceNotifier {
    async fn notify(&self, message: &NotificationMessage) -> AppResult<NotificationDelivery> {
        let Some(webhook_url) = self.webhook_url.as_ref() else {
            warn!("webhook url is not configured, skipping compliance notification");
            return Ok(NotificationDelivery::Skipped {
                reason: "webhook url is not configured".to_owned(),
            });
        };

        let response = self
            .http_client
            .post(webhook_url.clone())
            .json(&WebhookPayload {
                text: message.to_text(),
            })
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to call notification webhook: {error}"))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Unavailable(format!(
                "notification webhook returned status {}: {body}",
                status.as_u16()
            )));
        }

        Ok(NotificationDelivery::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use ppecheck_application::{ComplianceNotifier, NotificationDelivery};
    use ppecheck_core::AppError;
    use ppecheck_domain::{ComplianceVerdicts, NgSummary, NotificationMessage};
    use serde_json::json;
    use url::Url;

    use super::WebhookComplianceNotifier;

    fn notifier(url: &str) -> WebhookComplianceNotifier {
        let Ok(url) = Url::parse(url) else {
            panic!("webhook url should parse");
        };
        WebhookComplianceNotifier::new(reqwest::Client::new(), Some(url))
    }

    fn failing_message() -> NotificationMessage {
        NotificationMessage::for_summary(&NgSummary::from_verdicts(
            &ComplianceVerdicts::all_uncertain(),
        ))
    }

    #[tokio::test]
    async fn posts_subject_and_body_as_text() {
        let mut server = mockito::Server::new_async().await;
        let message = failing_message();
        let mock = server
            .mock("POST", "/services/T000/B000/XXXX")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "text": message.to_text() })))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let result = notifier(&format!("{}/services/T000/B000/XXXX", server.url()))
            .notify(&message)
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Ok(NotificationDelivery::Delivered)));
    }

    #[tokio::test]
    async fn non_ok_status_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(403)
            .with_body("invalid_token")
            .create_async()
            .await;

        let result = notifier(&format!("{}/hook", server.url()))
            .notify(&failing_message())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Unavailable(message)) if message.contains("invalid_token")
        ));
    }

    #[tokio::test]
    async fn missing_url_skips_delivery() {
        let notifier = WebhookComplianceNotifier::new(reqwest::Client::new(), None);

        let result = notifier.notify(&failing_message()).await;

        assert!(matches!(
            result,
            Ok(NotificationDelivery::Skipped { .. })
        ));
    }
}
