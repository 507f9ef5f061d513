//! Engine output events consumed by the stream transport.

use time::OffsetDateTime;
use uuid::Uuid;

use super::model::GrowthStep;

/// Final totals and timestamps of a successfully finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub calculation_id: Uuid,
    pub linear_result: f64,
    pub exponential_result: f64,
    pub total_steps: i32,
    pub started_at: OffsetDateTime,
    pub completed_at: OffsetDateTime,
}

/// One engine-to-consumer update. Within a run, `Step` updates arrive
/// strictly ordered by step index; `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Started {
        calculation_id: Uuid,
        base: f64,
        exponent: i32,
    },
    Step(GrowthStep),
    Completed(RunSummary),
    Failed {
        message: String,
    },
}
