//! In-memory fakes and helpers for isolated testing.
//!
//! WARNING: exposed only for the crate's own tests; not a stable API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::api::rest::AppState;
use crate::config::GrowthCalcConfig;
use crate::domain::ports::{CalculationStore, EventJournal, StoreError};
use crate::domain::{CalculationRecord, CalculationStatus, JournalEvent, Service, ServiceConfig};

/// In-memory calculation record store with per-operation failure toggles.
#[derive(Default)]
pub struct InMemoryCalculationStore {
    records: Mutex<Vec<CalculationRecord>>,
    fail_inserts: AtomicBool,
    fail_completions: AtomicBool,
}

impl InMemoryCalculationStore {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_completions(&self, fail: bool) {
        self.fail_completions.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn records(&self) -> Vec<CalculationRecord> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn find(&self, id: Uuid) -> Option<CalculationRecord> {
        self.records.lock().iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl CalculationStore for InMemoryCalculationStore {
    async fn insert(&self, record: &CalculationRecord) -> Result<(), StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::new("calculation store unreachable"));
        }
        self.records.lock().push(record.clone());
        Ok(())
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        completed_at: OffsetDateTime,
        linear_result: f64,
        exponential_result: f64,
        total_steps: i32,
    ) -> Result<(), StoreError> {
        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(StoreError::new("calculation store unreachable"));
        }
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::new(format!("no calculation with id {id}")))?;
        record.status = CalculationStatus::Completed;
        record.completed_at = Some(completed_at);
        record.linear_result = Some(linear_result);
        record.exponential_result = Some(exponential_result);
        record.total_steps = Some(total_steps);
        Ok(())
    }

    async fn mark_error(&self, id: Uuid, completed_at: OffsetDateTime) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::new(format!("no calculation with id {id}")))?;
        record.status = CalculationStatus::Error;
        record.completed_at = Some(completed_at);
        Ok(())
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<CalculationRecord>, StoreError> {
        let mut records = self.records.lock().clone();
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::new("calculation store unreachable"));
        }
        Ok(())
    }
}

/// In-memory append-only journal with an append failure toggle.
#[derive(Default)]
pub struct InMemoryEventJournal {
    events: Mutex<Vec<JournalEvent>>,
    fail_appends: AtomicBool,
}

impl InMemoryEventJournal {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn events(&self) -> Vec<JournalEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventJournal for InMemoryEventJournal {
    async fn append(&self, event: JournalEvent) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::new("event journal unreachable"));
        }
        self.events.lock().push(event);
        Ok(())
    }

    async fn for_calculation(&self, calculation_id: Uuid) -> Result<Vec<JournalEvent>, StoreError> {
        let mut events: Vec<_> = self
            .events
            .lock()
            .iter()
            .filter(|e| e.calculation_id == calculation_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.at.cmp(&b.at));
        Ok(events)
    }

    async fn recent(&self, limit: u64) -> Result<Vec<JournalEvent>, StoreError> {
        let mut events = self.events.lock().clone();
        events.sort_by(|a, b| b.at.cmp(&a.at));
        events.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(events)
    }
}

/// Module config with no inter-step delay, for fast deterministic tests.
#[must_use]
pub fn zero_interval_config() -> GrowthCalcConfig {
    GrowthCalcConfig {
        step_interval_ms: 0,
        ..GrowthCalcConfig::default()
    }
}

/// Engine wired to the given fakes with no inter-step delay.
#[must_use]
pub fn build_service(
    store: Arc<InMemoryCalculationStore>,
    journal: Arc<InMemoryEventJournal>,
) -> Service {
    Service::new(
        store,
        journal,
        ServiceConfig::from(&zero_interval_config()),
    )
}

/// REST state wired to the given fakes with no inter-step delay.
#[must_use]
pub fn build_state(
    store: Arc<InMemoryCalculationStore>,
    journal: Arc<InMemoryEventJournal>,
) -> AppState {
    AppState::new(store, journal, zero_interval_config())
}
