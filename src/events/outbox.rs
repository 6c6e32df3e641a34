use chrono::{DateTime, Duration as ChronoDuration, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{DomainEvent, NotificationPayload, NotificationSink};
use crate::config::AppConfig;
use crate::entities::outbox_event::{self, Entity as OutboxEvent};
use crate::entities::status::OutboxStatus;
use crate::errors::ServiceError;

const BASE_BACKOFF_SECS: i64 = 2;
const MAX_BACKOFF_SECS: i64 = 300;

/// Tuning for the dispatcher loop.
#[derive(Debug, Clone)]
pub struct OutboxSettings {
    pub poll_interval: Duration,
    pub batch_size: u64,
    pub max_attempts: i32,
}

impl Default for OutboxSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1_000),
            batch_size: 50,
            max_attempts: 8,
        }
    }
}

impl From<&AppConfig> for OutboxSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(cfg.outbox_poll_interval_ms),
            batch_size: cfg.outbox_batch_size,
            max_attempts: cfg.outbox_max_attempts,
        }
    }
}

/// Enqueue a domain event into the outbox table. Call with the transaction of the write it describes.
pub async fn enqueue(
    conn: &impl ConnectionTrait,
    event: &DomainEvent,
) -> Result<Uuid, ServiceError> {
    let id = Uuid::new_v4();
    let payload = serde_json::to_string(&event.payload())?;
    let now = Utc::now();

    outbox_event::ActiveModel {
        id: Set(id),
        channel: Set(event.channel.to_string()),
        aggregate_id: Set(event.aggregate_id),
        payload: Set(payload),
        status: Set(OutboxStatus::Pending),
        attempts: Set(0),
        available_at: Set(now),
        last_error: Set(None),
        created_at: Set(now),
        processed_at: Set(None),
    }
    .insert(conn)
    .await?;

    debug!(outbox_id = %id, channel = %event.channel, "enqueued outbox event");
    Ok(id)
}

/// Delay before the next attempt once `attempts` deliveries have failed.
pub fn backoff_delay(attempts: i32) -> ChronoDuration {
    let exp = attempts.clamp(0, 16) as u32;
    let secs = BASE_BACKOFF_SECS.saturating_pow(exp).min(MAX_BACKOFF_SECS);
    ChronoDuration::seconds(secs)
}

/// What one drain pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainStats {
    pub delivered: u32,
    pub retried: u32,
    pub failed: u32,
}

/// Delivers due pending rows once. Sink failures are recorded on the row, never returned.
pub async fn drain_once(
    db: &DatabaseConnection,
    sink: &dyn NotificationSink,
    settings: &OutboxSettings,
) -> Result<DrainStats, ServiceError> {
    let now = Utc::now();
    let rows = OutboxEvent::find()
        .filter(outbox_event::Column::Status.eq(OutboxStatus::Pending))
        .filter(outbox_event::Column::AvailableAt.lte(now))
        .order_by_asc(outbox_event::Column::CreatedAt)
        .limit(settings.batch_size)
        .all(db)
        .await?;

    let mut stats = DrainStats::default();
    for row in rows {
        let id = row.id;
        let channel = row.channel.clone();
        let attempts = row.attempts + 1;

        let outcome = match serde_json::from_str::<NotificationPayload>(&row.payload) {
            Ok(payload) => sink.deliver(&channel, &payload).await,
            Err(e) => Err(ServiceError::from(e)),
        };

        let mut active: outbox_event::ActiveModel = row.into();
        active.attempts = Set(attempts);

        match outcome {
            Ok(()) => {
                active.status = Set(OutboxStatus::Delivered);
                active.processed_at = Set(Some(Utc::now()));
                active.last_error = Set(None);
                stats.delivered += 1;
                counter!("flavorwave_outbox.delivered", 1);
            }
            Err(e) if attempts >= settings.max_attempts => {
                error!(outbox_id = %id, %channel, attempts, error = %e, "notification dropped after max attempts");
                active.status = Set(OutboxStatus::Failed);
                active.processed_at = Set(Some(Utc::now()));
                active.last_error = Set(Some(e.to_string()));
                stats.failed += 1;
                counter!("flavorwave_outbox.failed", 1);
            }
            Err(e) => {
                let retry_at: DateTime<Utc> = Utc::now() + backoff_delay(attempts);
                warn!(outbox_id = %id, %channel, attempts, error = %e, %retry_at, "notification delivery failed; will retry");
                active.available_at = Set(retry_at);
                active.last_error = Set(Some(e.to_string()));
                stats.retried += 1;
                counter!("flavorwave_outbox.retried", 1);
            }
        }

        if let Err(e) = active.update(db).await {
            warn!(outbox_id = %id, error = %e, "failed updating outbox row");
        }
    }

    Ok(stats)
}

/// Handle to the background dispatcher.
pub struct OutboxWorker {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl OutboxWorker {
    /// Signals the loop to stop and waits for the current pass to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!("outbox worker ended abnormally: {}", e);
        }
    }
}

/// Background worker to poll and dispatch outbox events to the sink.
pub fn start_worker(
    db: Arc<DatabaseConnection>,
    sink: Arc<dyn NotificationSink>,
    settings: OutboxSettings,
) -> OutboxWorker {
    let (shutdown, mut stop) = watch::channel(false);

    let handle = tokio::spawn(async move {
        info!(
            poll_ms = settings.poll_interval.as_millis() as u64,
            batch = settings.batch_size,
            "outbox worker started"
        );
        loop {
            match drain_once(&db, sink.as_ref(), &settings).await {
                Ok(stats) if stats != DrainStats::default() => {
                    debug!(?stats, "outbox pass complete")
                }
                Ok(_) => {}
                Err(e) => error!("outbox worker error: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(settings.poll_interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        info!("outbox worker stopped");
    });

    OutboxWorker { handle, shutdown }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(3, 8)]
    #[case(8, 256)]
    #[case(9, MAX_BACKOFF_SECS)]
    #[case(40, MAX_BACKOFF_SECS)]
    fn backoff_grows_exponentially_then_caps(#[case] attempts: i32, #[case] secs: i64) {
        assert_eq!(backoff_delay(attempts), ChronoDuration::seconds(secs));
    }

    #[test]
    fn settings_follow_config() {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );
        cfg.outbox_batch_size = 7;
        cfg.outbox_max_attempts = 3;
        let settings = OutboxSettings::from(&cfg);
        assert_eq!(settings.batch_size, 7);
        assert_eq!(settings.max_attempts, 3);
    }
}
