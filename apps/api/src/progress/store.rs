//! Snapshot stores — where a learner's week list lives between restarts.
//!
//! Pluggable: `AppState` carries an `Arc<dyn SnapshotStore>`. Redis in
//! deployment, an in-process map when no Redis is configured and in tests.
//! A slot always holds the whole week list as one JSON array.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::roadmap::WeekRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Snapshot is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads a slot. `Ok(None)` when nothing was ever saved there.
    async fn load(&self, slot: &str) -> Result<Option<Vec<WeekRecord>>, StoreError>;

    /// Overwrites a slot with the full week list.
    async fn save(&self, slot: &str, weeks: &[WeekRecord]) -> Result<(), StoreError>;

    /// Short backend name, for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// RedisSnapshotStore
// ────────────────────────────────────────────────────────────────────────────

/// One Redis string key per slot.
#[derive(Clone)]
pub struct RedisSnapshotStore {
    conn: ConnectionManager,
}

impl RedisSnapshotStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn load(&self, slot: &str) -> Result<Option<Vec<WeekRecord>>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(slot).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save(&self, slot: &str, weeks: &[WeekRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(weeks)?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(slot, json).await?;
        debug!("Saved {} weeks to redis slot {slot}", weeks.len());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemorySnapshotStore
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store. Keeps serialized JSON so reads go through the same
/// decoding path as Redis.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes raw text into a slot, bypassing serialization.
    #[cfg(test)]
    pub async fn put_raw(&self, slot: &str, raw: impl Into<String>) {
        self.slots.lock().await.insert(slot.to_string(), raw.into());
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, slot: &str) -> Result<Option<Vec<WeekRecord>>, StoreError> {
        let slots = self.slots.lock().await;
        slots
            .get(slot)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn save(&self, slot: &str, weeks: &[WeekRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(weeks)?;
        self.slots.lock().await.insert(slot.to_string(), json);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
