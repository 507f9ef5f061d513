//! Domain models for calculations and the event journal.

use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;
use uuid::Uuid;

/// Validated input for one calculation run.
///
/// Invariant (enforced by the engine before any persistence):
/// `base > 0` and `1 <= exponent <= 100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationRequest {
    pub base: f64,
    pub exponent: i32,
}

/// Lifecycle status of a calculation record.
///
/// A record transitions from `InProgress` into exactly one terminal state
/// (`Completed` or `Error`) and never leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationStatus {
    InProgress,
    Completed,
    Error,
}

impl CalculationStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown calculation status: {other}")),
        }
    }
}

/// Authoritative state of one calculation. Exclusively owned and mutated
/// by the calculation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRecord {
    pub id: Uuid,
    pub base: f64,
    pub exponent: i32,
    pub status: CalculationStatus,
    pub started_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
    pub linear_result: Option<f64>,
    pub exponential_result: Option<f64>,
    pub total_steps: Option<i32>,
}

/// One computed step. Immutable once produced, ordered by `step`.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthStep {
    pub step: i32,
    /// Human-readable operation, e.g. `2 × 3`.
    pub linear_op: String,
    pub linear_value: f64,
    /// Human-readable operation, e.g. `2^3`.
    pub exponential_op: String,
    pub exponential_value: f64,
    pub at: OffsetDateTime,
}

/// Journal event kinds. The journal is an append-only audit side channel,
/// never authoritative for current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    CalculationStarted,
    LinearStep,
    ExponentialStep,
    CalculationCompleted,
    CalculationError,
}

impl EventType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CalculationStarted => "calculation_started",
            Self::LinearStep => "linear_step",
            Self::ExponentialStep => "exponential_step",
            Self::CalculationCompleted => "calculation_completed",
            Self::CalculationError => "calculation_error",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calculation_started" => Ok(Self::CalculationStarted),
            "linear_step" => Ok(Self::LinearStep),
            "exponential_step" => Ok(Self::ExponentialStep),
            "calculation_completed" => Ok(Self::CalculationCompleted),
            "calculation_error" => Ok(Self::CalculationError),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

/// One append-only journal entry, keyed by calculation id.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEvent {
    pub id: Uuid,
    pub calculation_id: Uuid,
    pub event_type: EventType,
    pub message: String,
    pub at: OffsetDateTime,
    pub payload: Option<serde_json::Value>,
}

impl JournalEvent {
    #[must_use]
    pub fn new(
        calculation_id: Uuid,
        event_type: EventType,
        message: impl Into<String>,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            calculation_id,
            event_type,
            message: message.into(),
            at: OffsetDateTime::now_utc(),
            payload,
        }
    }
}

/// Aggregate result of a drained (non-streamed) run.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedCalculation {
    pub id: Uuid,
    pub base: f64,
    pub exponent: i32,
    pub linear_result: f64,
    pub exponential_result: f64,
    pub steps: Vec<GrowthStep>,
    pub started_at: OffsetDateTime,
    pub completed_at: OffsetDateTime,
}
