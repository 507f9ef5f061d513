//! Store collaborator ports.
//!
//! The engine owns no persistence logic; it talks to a keyed record store
//! and an append-only event journal through these traits. Both must
//! support safe concurrent use from multiple in-flight runs - the engine
//! holds no cross-run lock.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{CalculationRecord, JournalEvent};

/// Failure reported by a store backend.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Keyed store of calculation records.
#[async_trait]
pub trait CalculationStore: Send + Sync {
    /// Persist a freshly created record (status `in_progress`).
    async fn insert(&self, record: &CalculationRecord) -> Result<(), StoreError>;

    /// Transition a record to `completed` and store its final totals.
    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: OffsetDateTime,
        linear_result: f64,
        exponential_result: f64,
        total_steps: i32,
    ) -> Result<(), StoreError>;

    /// Transition a record to `error`.
    async fn mark_error(&self, id: Uuid, completed_at: OffsetDateTime) -> Result<(), StoreError>;

    /// Most recent records, newest first.
    async fn list_recent(&self, limit: u64) -> Result<Vec<CalculationRecord>, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Append-only journal of calculation events.
#[async_trait]
pub trait EventJournal: Send + Sync {
    async fn append(&self, event: JournalEvent) -> Result<(), StoreError>;

    /// All events for one calculation, timestamp ascending.
    async fn for_calculation(&self, calculation_id: Uuid) -> Result<Vec<JournalEvent>, StoreError>;

    /// Most recent events across all calculations, newest first.
    async fn recent(&self, limit: u64) -> Result<Vec<JournalEvent>, StoreError>;
}
