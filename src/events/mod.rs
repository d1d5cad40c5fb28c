//! Post-commit notifications
//!
//! Fire-and-forget publishing of committed ledger entries onto a queue.
//! Delivery is at-most-once: a failed publish is logged and dropped, never
//! retried, and never fails the call that produced the entry.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;
use std::sync::Arc;

use crate::store::LedgerEntry;

/// Topic for committed ledger entries.
pub const LEDGER_ENTRY_TOPIC: &str = "ledger.entry.recorded";

/// Queue errors
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Outbound message channel.
///
/// `delay_secs` schedules the message for later consumption; zero means
/// immediately visible.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn send(&self, topic: &str, message: &str, delay_secs: u64) -> Result<(), QueueError>;
}

/// Redis-backed queue.
///
/// Immediate messages are pushed onto a list per topic; delayed messages go
/// to a scheduled sorted set keyed by visibility time, drained by consumers.
#[derive(Clone)]
pub struct RedisQueue {
    manager: ConnectionManager,
}

impl RedisQueue {
    pub async fn connect(url: &str) -> Result<Self, QueueError> {
        tracing::info!("Connecting to Redis");
        let client = Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        tracing::info!("Redis connection established");

        Ok(Self { manager })
    }
}

#[async_trait]
impl MessageQueue for RedisQueue {
    async fn send(&self, topic: &str, message: &str, delay_secs: u64) -> Result<(), QueueError> {
        let mut conn = self.manager.clone();

        if delay_secs == 0 {
            let _: () = redis::cmd("RPUSH")
                .arg(format!("queue:{}", topic))
                .arg(message)
                .query_async(&mut conn)
                .await?;
        } else {
            let visible_at = chrono::Utc::now().timestamp() + delay_secs as i64;
            let _: () = redis::cmd("ZADD")
                .arg(format!("queue:{}:scheduled", topic))
                .arg(visible_at)
                .arg(message)
                .query_async(&mut conn)
                .await?;
        }

        Ok(())
    }
}

/// In-memory queue double for tests.
pub struct MockQueue {
    pub sent: std::sync::Mutex<Vec<(String, String, u64)>>,
    pub fail: bool,
}

impl Default for MockQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQueue {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl MessageQueue for MockQueue {
    async fn send(&self, topic: &str, message: &str, delay_secs: u64) -> Result<(), QueueError> {
        if self.fail {
            return Err(QueueError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "mock queue failure",
            ))));
        }

        self.sent
            .lock()
            .expect("mock queue mutex poisoned")
            .push((topic.to_string(), message.to_string(), delay_secs));
        Ok(())
    }
}

/// Publishes entry notifications after commit.
#[derive(Clone)]
pub struct EventDispatcher {
    queue: Arc<dyn MessageQueue>,
}

impl EventDispatcher {
    pub fn new(queue: Arc<dyn MessageQueue>) -> Self {
        Self { queue }
    }

    /// Publish a message. Best-effort: any error is logged and swallowed,
    /// never surfaced to the caller.
    pub async fn publish(&self, topic: &str, payload: &serde_json::Value, delay_secs: u64) {
        if let Err(e) = self.queue.send(topic, &payload.to_string(), delay_secs).await {
            tracing::error!(error = %e, topic, "Failed to publish notification");
        }
    }

    /// Publish the summary of a committed entry.
    pub async fn entry_recorded(&self, entry: &LedgerEntry) {
        let payload = serde_json::json!({
            "ledger_entry_id": entry.id,
            "tenant_id": entry.tenant_id,
            "amount": entry.amount,
            "type": entry.entry_type,
            "status": entry.status,
        });

        self.publish(LEDGER_ENTRY_TOPIC, &payload, 0).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryStatus, MovementKind};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_entry() -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            from_account_id: Some(Uuid::new_v4()),
            to_account_id: None,
            amount: dec!(100.00),
            entry_type: MovementKind::Withdrawal,
            status: EntryStatus::Completed,
            created_by: "tester".to_string(),
            created_at: chrono::Utc::now(),
            updated_by: None,
            updated_at: chrono::Utc::now(),
            deleted_by: None,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_entry_recorded_payload() {
        let queue = Arc::new(MockQueue::new());
        let dispatcher = EventDispatcher::new(queue.clone());
        let entry = sample_entry();

        dispatcher.entry_recorded(&entry).await;

        let sent = queue.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (topic, message, delay) = &sent[0];
        assert_eq!(topic, LEDGER_ENTRY_TOPIC);
        assert_eq!(*delay, 0);

        let payload: serde_json::Value = serde_json::from_str(message).unwrap();
        assert_eq!(payload["ledger_entry_id"], entry.id.to_string());
        assert_eq!(payload["type"], "WITHDRAWAL");
        assert_eq!(payload["status"], "COMPLETED");
    }

    #[tokio::test]
    async fn test_publish_carries_delay() {
        let queue = Arc::new(MockQueue::new());
        let dispatcher = EventDispatcher::new(queue.clone());

        dispatcher
            .publish("reconciliation.due", &serde_json::json!({"run": 1}), 300)
            .await;

        let sent = queue.sent.lock().unwrap();
        assert_eq!(sent[0].0, "reconciliation.due");
        assert_eq!(sent[0].2, 300);
    }

    #[tokio::test]
    async fn test_publish_failure_is_swallowed() {
        let dispatcher = EventDispatcher::new(Arc::new(MockQueue::failing()));

        // Must not panic or propagate the queue error
        dispatcher.entry_recorded(&sample_entry()).await;
    }
}
