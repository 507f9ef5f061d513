//! Calculation engine.
//!
//! Orchestrates validation -> record creation -> step generation -> timed
//! emission -> journaling -> finalization. Two modes share one pipeline:
//!
//! - [`Service::run_streamed`] suspends for `step_interval` between steps
//!   and pushes every update into an `mpsc` channel. The suspension is a
//!   cooperative yield (`tokio::time::sleep`), so concurrent runs keep
//!   progressing. A failed send means the consumer disconnected: the run
//!   stops at once and writes no further journal entries.
//! - [`Service::run_collected`] drains the same pipeline back-to-back and
//!   returns the aggregate result.
//!
//! Journal writes happen after the corresponding emission and are
//! best-effort: a failed append is logged and the run continues. Record
//! creation and the final status transition are fatal; a record is never
//! left permanently `in_progress` by a run the engine itself finishes.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::DomainError;
use super::events::{RunSummary, StreamUpdate};
use super::growth;
use super::model::{
    CalculationRecord, CalculationRequest, CalculationStatus, EventType, FinishedCalculation,
    GrowthStep, JournalEvent,
};
use super::ports::{CalculationStore, EventJournal};
use crate::config::GrowthCalcConfig;
use crate::util::float_token;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Minimum spacing between streamed step emissions.
    pub step_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_secs(1),
        }
    }
}

impl From<&GrowthCalcConfig> for ServiceConfig {
    fn from(config: &GrowthCalcConfig) -> Self {
        Self {
            step_interval: config.step_interval(),
        }
    }
}

/// Identifier and inputs of a run whose record has been persisted.
///
/// Threaded explicitly through the control flow so error paths know
/// whether a record exists to journal against.
struct ActiveRun {
    id: Uuid,
    base: f64,
    exponent: i32,
    started_at: OffsetDateTime,
}

/// Calculation engine. Store collaborators are injected at construction.
pub struct Service {
    store: Arc<dyn CalculationStore>,
    journal: Arc<dyn EventJournal>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        store: Arc<dyn CalculationStore>,
        journal: Arc<dyn EventJournal>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            journal,
            config,
        }
    }

    /// Validate a request. Rejected requests never produce a record or
    /// journal entries.
    ///
    /// # Errors
    ///
    /// `InvalidBase` if `base <= 0` (or is not a number), `InvalidExponent`
    /// if `exponent` is outside `[1, 100]`.
    pub fn validate(request: &CalculationRequest) -> Result<(), DomainError> {
        if request.base <= 0.0 || request.base.is_nan() {
            return Err(DomainError::invalid_base(request.base));
        }
        if !(1..=100).contains(&request.exponent) {
            return Err(DomainError::invalid_exponent(request.exponent));
        }
        Ok(())
    }

    /// Run the full pipeline, emitting every update into `tx`.
    ///
    /// Terminal updates are `Completed` or `Failed`; validation failures
    /// emit a single `Failed` without creating a record.
    pub async fn run_streamed(&self, request: CalculationRequest, tx: mpsc::Sender<StreamUpdate>) {
        if let Err(e) = Self::validate(&request) {
            tracing::debug!(error = %e, "rejecting streamed calculation request");
            let _ = tx
                .send(StreamUpdate::Failed {
                    message: e.to_string(),
                })
                .await;
            return;
        }

        let run = match self.begin(&request).await {
            Ok(run) => run,
            Err(e) => {
                tracing::error!(error = %e, "failed to create calculation record");
                let _ = tx
                    .send(StreamUpdate::Failed {
                        message: e.to_string(),
                    })
                    .await;
                return;
            }
        };

        let started = tx
            .send(StreamUpdate::Started {
                calculation_id: run.id,
                base: run.base,
                exponent: run.exponent,
            })
            .await;
        if started.is_err() {
            tracing::debug!(calculation_id = %run.id, "consumer disconnected before start event");
            return;
        }

        for i in 1..=run.exponent {
            if i > 1 {
                tokio::time::sleep(self.config.step_interval).await;
            }

            let step = growth::step(run.base, i);
            if tx.send(StreamUpdate::Step(step.clone())).await.is_err() {
                tracing::debug!(
                    calculation_id = %run.id,
                    step = i,
                    "consumer disconnected, abandoning run"
                );
                return;
            }
            self.journal_step(&run, &step).await;
        }

        match self.finish(&run).await {
            Ok(summary) => {
                let _ = tx.send(StreamUpdate::Completed(summary)).await;
            }
            Err(e) => {
                tracing::error!(calculation_id = %run.id, error = %e, "calculation run failed");
                self.fail(run.id, &e.to_string()).await;
                let _ = tx
                    .send(StreamUpdate::Failed {
                        message: e.to_string(),
                    })
                    .await;
            }
        }
    }

    /// Drive the pipeline to completion without the inter-step delay and
    /// return the aggregate result.
    ///
    /// # Errors
    ///
    /// Validation errors (`InvalidBase`, `InvalidExponent`) are returned
    /// before any persistence. A failure after the record exists marks it
    /// `error`, journals `calculation_error`, and surfaces as `Storage`.
    pub async fn run_collected(
        &self,
        request: CalculationRequest,
    ) -> Result<FinishedCalculation, DomainError> {
        Self::validate(&request)?;

        let run = self.begin(&request).await?;

        let mut steps = Vec::new();
        for i in 1..=run.exponent {
            let step = growth::step(run.base, i);
            self.journal_step(&run, &step).await;
            steps.push(step);
        }

        match self.finish(&run).await {
            Ok(summary) => Ok(FinishedCalculation {
                id: run.id,
                base: run.base,
                exponent: run.exponent,
                linear_result: summary.linear_result,
                exponential_result: summary.exponential_result,
                steps,
                started_at: run.started_at,
                completed_at: summary.completed_at,
            }),
            Err(e) => {
                tracing::error!(calculation_id = %run.id, error = %e, "calculation run failed");
                self.fail(run.id, &e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Persist the initial record and journal `calculation_started`.
    /// Record creation is fatal; the journal write is best-effort.
    async fn begin(&self, request: &CalculationRequest) -> Result<ActiveRun, DomainError> {
        let record = CalculationRecord {
            id: Uuid::now_v7(),
            base: request.base,
            exponent: request.exponent,
            status: CalculationStatus::InProgress,
            started_at: OffsetDateTime::now_utc(),
            completed_at: None,
            linear_result: None,
            exponential_result: None,
            total_steps: None,
        };

        self.store
            .insert(&record)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        tracing::info!(
            calculation_id = %record.id,
            base = record.base,
            exponent = record.exponent,
            "calculation started"
        );

        self.journal_best_effort(JournalEvent::new(
            record.id,
            EventType::CalculationStarted,
            format!(
                "Starting calculation: base={}, exponent={}",
                record.base, record.exponent
            ),
            Some(json!({
                "base": record.base,
                "exponent": record.exponent,
            })),
        ))
        .await;

        Ok(ActiveRun {
            id: record.id,
            base: record.base,
            exponent: record.exponent,
            started_at: record.started_at,
        })
    }

    /// Journal both events for one emitted step, best-effort.
    async fn journal_step(&self, run: &ActiveRun, step: &GrowthStep) {
        self.journal_best_effort(JournalEvent::new(
            run.id,
            EventType::LinearStep,
            format!(
                "Step {}: {} = {}",
                step.step, step.linear_op, step.linear_value
            ),
            Some(json!({
                "step": step.step,
                "result": float_token::to_json(step.linear_value),
                "type": "linear",
            })),
        ))
        .await;

        self.journal_best_effort(JournalEvent::new(
            run.id,
            EventType::ExponentialStep,
            format!(
                "Step {}: {} = {}",
                step.step, step.exponential_op, step.exponential_value
            ),
            Some(json!({
                "step": step.step,
                "result": float_token::to_json(step.exponential_value),
                "type": "exponential",
            })),
        ))
        .await;
    }

    /// Recompute the final totals, move the record to `completed`, and
    /// journal `calculation_completed`. The status write is fatal.
    async fn finish(&self, run: &ActiveRun) -> Result<RunSummary, DomainError> {
        let (linear_result, exponential_result) = growth::final_totals(run.base, run.exponent);
        let completed_at = OffsetDateTime::now_utc();

        self.store
            .mark_completed(
                run.id,
                completed_at,
                linear_result,
                exponential_result,
                run.exponent,
            )
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        self.journal_best_effort(JournalEvent::new(
            run.id,
            EventType::CalculationCompleted,
            "Calculation completed successfully",
            None,
        ))
        .await;

        tracing::info!(calculation_id = %run.id, "calculation completed");

        Ok(RunSummary {
            calculation_id: run.id,
            linear_result,
            exponential_result,
            total_steps: run.exponent,
            started_at: run.started_at,
            completed_at,
        })
    }

    /// Best-effort transition to `error` plus a `calculation_error`
    /// journal entry. Only called when a record exists.
    async fn fail(&self, id: Uuid, message: &str) {
        if let Err(e) = self.store.mark_error(id, OffsetDateTime::now_utc()).await {
            tracing::warn!(calculation_id = %id, error = %e, "failed to mark calculation as error");
        }

        self.journal_best_effort(JournalEvent::new(
            id,
            EventType::CalculationError,
            format!("Error: {message}"),
            Some(json!({ "error": message })),
        ))
        .await;
    }

    /// Append to the journal, swallowing failures. The journal is a
    /// side-channel: a lost entry never disturbs the live stream.
    async fn journal_best_effort(&self, event: JournalEvent) {
        let calculation_id = event.calculation_id;
        let event_type = event.event_type;
        if let Err(e) = self.journal.append(event).await {
            tracing::warn!(
                calculation_id = %calculation_id,
                event_type = %event_type,
                error = %e,
                "failed to journal event, continuing"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CalculationRequest, DomainError, Service};

    fn req(base: f64, exponent: i32) -> CalculationRequest {
        CalculationRequest { base, exponent }
    }

    #[test]
    fn rejects_non_positive_base() {
        for base in [0.0, -1.0, f64::NAN] {
            let err = Service::validate(&req(base, 5));
            assert!(matches!(err, Err(DomainError::InvalidBase { .. })));
        }
    }

    #[test]
    fn rejects_out_of_range_exponent() {
        for exponent in [0, -1, 101] {
            let err = Service::validate(&req(2.0, exponent));
            assert!(matches!(err, Err(DomainError::InvalidExponent { .. })));
        }
    }

    #[test]
    fn accepts_boundary_exponents() {
        assert!(Service::validate(&req(0.5, 1)).is_ok());
        assert!(Service::validate(&req(0.5, 100)).is_ok());
    }
}
