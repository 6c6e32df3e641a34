use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum::{AsRefStr, Display, EnumString};
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;

pub mod outbox;

/// Named channels on the realtime notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
pub enum NotificationChannel {
    NewOrderEvent,
    NewDeliveryRouteEvent,
    NewStockRequestEvent,
    NewMaterialRequestEvent,
}

/// A workflow transition destined for the notification sink.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEvent {
    pub channel: NotificationChannel,
    pub aggregate_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(channel: NotificationChannel, aggregate_id: Uuid) -> Self {
        Self {
            channel,
            aggregate_id: Some(aggregate_id),
            occurred_at: Utc::now(),
        }
    }

    pub fn payload(&self) -> NotificationPayload {
        NotificationPayload {
            timestamp: self.occurred_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Body pushed to a channel: only the transition time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub timestamp: String,
}

/// Best-effort delivery target for outbox rows.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(
        &self,
        channel: &str,
        payload: &NotificationPayload,
    ) -> Result<(), ServiceError>;
}

/// Sink that only records the notification in the log.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(
        &self,
        channel: &str,
        payload: &NotificationPayload,
    ) -> Result<(), ServiceError> {
        info!(channel, timestamp = %payload.timestamp, "notification emitted");
        Ok(())
    }
}

/// Pushes each notification to `<base_url>/<channel>.json`.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    base_url: String,
}

impl WebhookSink {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::ExternalServiceError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn channel_url(&self, channel: &str) -> String {
        format!("{}/{}.json", self.base_url, channel)
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(
        &self,
        channel: &str,
        payload: &NotificationPayload,
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.channel_url(channel))
            .json(payload)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "sink answered {} for {}",
                response.status(),
                channel
            )));
        }
        Ok(())
    }
}

/// Builds the sink selected by `notification_sink`.
pub fn build_sink(config: &AppConfig) -> Result<Arc<dyn NotificationSink>, ServiceError> {
    if config.uses_webhook_sink() {
        let url = config
            .notification_webhook_url
            .clone()
            .ok_or_else(|| {
                ServiceError::ValidationError("notification_webhook_url is not set".into())
            })?;
        info!(%url, "notifications go to webhook sink");
        Ok(Arc::new(WebhookSink::new(url)?))
    } else {
        Ok(Arc::new(LogSink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn channel_names_round_trip() {
        assert_eq!(NotificationChannel::NewOrderEvent.as_ref(), "NewOrderEvent");
        assert_eq!(
            NotificationChannel::from_str("NewStockRequestEvent").unwrap(),
            NotificationChannel::NewStockRequestEvent
        );
    }

    #[test]
    fn payload_carries_only_timestamp() {
        let event = DomainEvent::new(NotificationChannel::NewOrderEvent, Uuid::new_v4());
        let json = serde_json::to_value(event.payload()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn webhook_sink_posts_to_channel_path() {
        let server = MockServer::start().await;
        let payload = NotificationPayload {
            timestamp: "2024-05-01T10:00:00.000Z".into(),
        };
        Mock::given(method("POST"))
            .and(path("/NewOrderEvent.json"))
            .and(body_json(&payload))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(format!("{}/", server.uri())).unwrap();
        sink.deliver("NewOrderEvent", &payload).await.unwrap();
    }

    #[tokio::test]
    async fn webhook_sink_reports_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri()).unwrap();
        let err = sink
            .deliver(
                "NewDeliveryRouteEvent",
                &NotificationPayload {
                    timestamp: "t".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ExternalServiceError(_)));
    }
}
