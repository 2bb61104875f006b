use async_trait::async_trait;
use auditwatch_application::AlertNotifier;
use auditwatch_core::{AppError, AppResult};
use serde::Serialize;
use tracing::info;

/// Posts each alert as a single Slack-compatible incoming-webhook message.
#[derive(Clone)]
pub struct WebhookAlertNotifier {
    http_client: reqwest::Client,
    webhook_url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

impl WebhookAlertNotifier {
    /// Creates a notifier posting to `webhook_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, webhook_url: impl Into<String>) -> Self {
        Self {
            http_client,
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl AlertNotifier for WebhookAlertNotifier {
    async fn notify(&self, message: &str) -> AppResult<()> {
        info!(message = message, "[webhook post]");

        let response = self
            .http_client
            .post(self.webhook_url.as_str())
            .json(&WebhookPayload { text: message })
            .send()
            .await
            .map_err(|error| {
                AppError::Notification(format!("webhook transport error: {error}"))
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        Err(AppError::Notification(format!(
            "webhook returned status {}: {body}",
            status.as_u16()
        )))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use auditwatch_application::AlertNotifier;
    use auditwatch_core::AppError;

    use super::WebhookAlertNotifier;

    #[tokio::test]
    async fn posts_message_as_text_payload_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/T000/B000"))
            .and(body_json(json!({"text": "alice: *repo.destroy* on *acme/site*"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookAlertNotifier::new(
            reqwest::Client::new(),
            format!("{}/services/T000/B000", server.uri()),
        );

        let result = notifier
            .notify("alice: *repo.destroy* on *acme/site*")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rejected_post_is_a_notification_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("invalid_payload"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookAlertNotifier::new(reqwest::Client::new(), server.uri());

        let result = notifier.notify("hello").await;

        assert!(matches!(
            result,
            Err(AppError::Notification(message)) if message.contains("500") && message.contains("invalid_payload")
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_notification_error() {
        let notifier = WebhookAlertNotifier::new(reqwest::Client::new(), "http://127.0.0.1:9/hook");

        let result = notifier.notify("hello").await;

        assert!(matches!(result, Err(AppError::Notification(_))));
    }
}
