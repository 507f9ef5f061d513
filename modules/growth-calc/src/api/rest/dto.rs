//! REST DTOs with serde/utoipa.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    CalculationRecord, CalculationRequest, FinishedCalculation, GrowthStep, JournalEvent,
    StreamUpdate,
};
use crate::util::float_token;

/// Request body for both calculation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalculationRequestDto {
    pub base: f64,
    pub exponent: i32,
}

impl From<CalculationRequestDto> for CalculationRequest {
    fn from(req: CalculationRequestDto) -> Self {
        Self {
            base: req.base,
            exponent: req.exponent,
        }
    }
}

/// One step log entry in the aggregate response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepLogDto {
    pub step: i32,
    pub operation: String,
    #[serde(with = "float_token")]
    #[schema(value_type = f64)]
    pub result: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Aggregate response of the synchronous endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalculationResponseDto {
    pub calculation_id: Uuid,
    pub base: f64,
    pub exponent: i32,
    #[serde(with = "float_token")]
    #[schema(value_type = f64)]
    pub linear_result: f64,
    #[serde(with = "float_token")]
    #[schema(value_type = f64)]
    pub exponential_result: f64,
    pub linear_logs: Vec<StepLogDto>,
    pub exponential_logs: Vec<StepLogDto>,
    pub total_steps: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

impl From<FinishedCalculation> for CalculationResponseDto {
    fn from(done: FinishedCalculation) -> Self {
        let linear_logs = done
            .steps
            .iter()
            .map(|s| StepLogDto {
                step: s.step,
                operation: s.linear_op.clone(),
                result: s.linear_value,
                timestamp: s.at,
            })
            .collect();
        let exponential_logs = done
            .steps
            .iter()
            .map(|s| StepLogDto {
                step: s.step,
                operation: s.exponential_op.clone(),
                result: s.exponential_value,
                timestamp: s.at,
            })
            .collect();

        Self {
            calculation_id: done.id,
            base: done.base,
            exponent: done.exponent,
            linear_result: done.linear_result,
            exponential_result: done.exponential_result,
            linear_logs,
            exponential_logs,
            total_steps: done.exponent,
            started_at: done.started_at,
            completed_at: done.completed_at,
        }
    }
}

/// One side of a streamed step: operation label plus its result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepOperationDto {
    pub operation: String,
    #[serde(with = "float_token")]
    #[schema(value_type = f64)]
    pub result: f64,
}

/// Transport-level stream event, one per SSE message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
#[schema(title = "StreamEvent", description = "Server-sent calculation event")]
pub enum StreamEventDto {
    Start {
        calculation_id: Uuid,
        base: f64,
        exponent: i32,
    },
    Step {
        step: i32,
        linear: StepOperationDto,
        exponential: StepOperationDto,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
    },
    Complete {
        calculation_id: Uuid,
        #[serde(with = "float_token")]
        #[schema(value_type = f64)]
        linear_result: f64,
        #[serde(with = "float_token")]
        #[schema(value_type = f64)]
        exponential_result: f64,
        total_steps: i32,
        #[serde(with = "time::serde::rfc3339")]
        started_at: OffsetDateTime,
        #[serde(with = "time::serde::rfc3339")]
        completed_at: OffsetDateTime,
    },
    Error {
        message: String,
    },
}

impl From<StreamUpdate> for StreamEventDto {
    fn from(update: StreamUpdate) -> Self {
        match update {
            StreamUpdate::Started {
                calculation_id,
                base,
                exponent,
            } => Self::Start {
                calculation_id,
                base,
                exponent,
            },
            StreamUpdate::Step(step) => Self::from_step(&step),
            StreamUpdate::Completed(summary) => Self::Complete {
                calculation_id: summary.calculation_id,
                linear_result: summary.linear_result,
                exponential_result: summary.exponential_result,
                total_steps: summary.total_steps,
                started_at: summary.started_at,
                completed_at: summary.completed_at,
            },
            StreamUpdate::Failed { message } => Self::Error { message },
        }
    }
}

impl StreamEventDto {
    fn from_step(step: &GrowthStep) -> Self {
        Self::Step {
            step: step.step,
            linear: StepOperationDto {
                operation: step.linear_op.clone(),
                result: step.linear_value,
            },
            exponential: StepOperationDto {
                operation: step.exponential_op.clone(),
                result: step.exponential_value,
            },
            timestamp: step.at,
        }
    }
}

/// Stored calculation record as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalculationRecordDto {
    pub id: Uuid,
    pub base: f64,
    pub exponent: i32,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linear_result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exponential_result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<i32>,
}

impl From<CalculationRecord> for CalculationRecordDto {
    fn from(record: CalculationRecord) -> Self {
        Self {
            id: record.id,
            base: record.base,
            exponent: record.exponent,
            status: record.status.as_str().to_owned(),
            started_at: record.started_at,
            completed_at: record.completed_at,
            linear_result: record.linear_result,
            exponential_result: record.exponential_result,
            total_steps: record.total_steps,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalculationListDto {
    pub calculations: Vec<CalculationRecordDto>,
}

/// Journal event as returned by the event endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JournalEventDto {
    pub event_id: Uuid,
    pub calculation_id: Uuid,
    pub event_type: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl From<JournalEvent> for JournalEventDto {
    fn from(event: JournalEvent) -> Self {
        Self {
            event_id: event.id,
            calculation_id: event.calculation_id,
            event_type: event.event_type.as_str().to_owned(),
            message: event.message,
            timestamp: event.at,
            data: event.payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventListDto {
    pub events: Vec<JournalEventDto>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    pub status: String,
    pub service: String,
    pub database: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Query parameters for the listing endpoints.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::{CalculationRequest, StreamEventDto, StreamUpdate};
    use crate::domain::growth;

    #[test]
    fn stream_events_are_tagged_with_snake_case_type() {
        let update = StreamUpdate::Failed {
            message: "boom".to_owned(),
        };
        let json = serde_json::to_value(StreamEventDto::from(update)).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn step_event_carries_both_operations() {
        let step = growth::step(2.0, 3);
        let json = serde_json::to_value(StreamEventDto::from(StreamUpdate::Step(step))).unwrap();

        assert_eq!(json["type"], "step");
        assert_eq!(json["step"], 3);
        assert_eq!(json["linear"]["operation"], "2 × 3");
        assert_eq!(json["linear"]["result"], 6.0);
        assert_eq!(json["exponential"]["operation"], "2^3");
        assert_eq!(json["exponential"]["result"], 8.0);
    }

    #[test]
    fn infinite_results_serialize_as_tokens() {
        let step = growth::step(1e10, 100);
        let json = serde_json::to_value(StreamEventDto::from(StreamUpdate::Step(step))).unwrap();
        assert_eq!(json["exponential"]["result"], "Infinity");
    }

    #[test]
    fn request_dto_maps_to_domain_request() {
        let req: CalculationRequest = super::CalculationRequestDto {
            base: 2.5,
            exponent: 7,
        }
        .into();
        assert_eq!(req.base, 2.5);
        assert_eq!(req.exponent, 7);
    }
}
