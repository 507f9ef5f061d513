//! REST handlers.
//!
//! The streaming handler is the transport edge of the pipeline: it spawns
//! the engine onto its own task and bridges the engine channel into an
//! SSE body. Dropping the response (client disconnect) drops the channel
//! receiver, which aborts the run on its next send.

use std::convert::Infallible;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, Uri};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use super::dto::{
    CalculationListDto, CalculationRecordDto, CalculationRequestDto, CalculationResponseDto,
    EventListDto, HealthDto, JournalEventDto, ListQuery, StreamEventDto,
};
use super::error::Problem;
use super::routes::AppState;

/// Perform the calculation with real-time streaming: one SSE message per
/// engine event, with the configured spacing between steps.
#[utoipa::path(
    post,
    path = "/api/calculate/stream",
    request_body = CalculationRequestDto,
    responses(
        (status = 200, description = "Event stream", body = StreamEventDto,
         content_type = "text/event-stream"),
    ),
    tag = "calculations"
)]
pub(super) async fn calculate_stream(
    State(state): State<AppState>,
    Json(body): Json<CalculationRequestDto>,
) -> Response {
    let (tx, rx) = mpsc::channel(state.config.stream_buffer);
    let service = state.service.clone();
    tokio::spawn(async move { service.run_streamed(body.into(), tx).await });

    let stream = ReceiverStream::new(rx).map(|update| encode_event(&StreamEventDto::from(update)));

    let mut response = Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-transform"),
    );
    response
}

fn encode_event(dto: &StreamEventDto) -> Result<Event, Infallible> {
    match Event::default().json_data(dto) {
        Ok(event) => Ok(event),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode stream event");
            Ok(Event::default().data(r#"{"type":"error","message":"event encoding failed"}"#))
        }
    }
}

/// Perform the calculation instantly and return the aggregate result.
#[utoipa::path(
    post,
    path = "/api/calculate",
    request_body = CalculationRequestDto,
    responses(
        (status = 200, description = "Completed calculation", body = CalculationResponseDto),
        (status = 400, description = "Invalid request", body = Problem),
        (status = 500, description = "Internal failure", body = Problem),
    ),
    tag = "calculations"
)]
pub(super) async fn calculate(
    State(state): State<AppState>,
    uri: Uri,
    Json(body): Json<CalculationRequestDto>,
) -> Result<Json<CalculationResponseDto>, Problem> {
    let done = state
        .service
        .run_collected(body.into())
        .await
        .map_err(|e| Problem::from(e).with_instance(uri.path()))?;

    Ok(Json(done.into()))
}

/// List recent calculation records, newest first.
#[utoipa::path(
    get,
    path = "/api/calculations",
    params(ListQuery),
    responses(
        (status = 200, description = "Recent calculations", body = CalculationListDto),
        (status = 500, description = "Internal failure", body = Problem),
    ),
    tag = "calculations"
)]
pub(super) async fn list_calculations(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<ListQuery>,
) -> Result<Json<CalculationListDto>, Problem> {
    let limit = query
        .limit
        .unwrap_or(state.config.recent_calculations_limit);

    let calculations = state
        .store
        .list_recent(limit)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to list calculations");
            Problem::internal_error("Failed to list calculations").with_instance(uri.path())
        })?
        .into_iter()
        .map(CalculationRecordDto::from)
        .collect();

    Ok(Json(CalculationListDto { calculations }))
}

/// All journal events for one calculation, timestamp ascending.
#[utoipa::path(
    get,
    path = "/api/events/{calculation_id}",
    params(("calculation_id" = Uuid, Path, description = "Calculation identifier")),
    responses(
        (status = 200, description = "Events for the calculation", body = EventListDto),
        (status = 500, description = "Internal failure", body = Problem),
    ),
    tag = "events"
)]
pub(super) async fn get_calculation_events(
    State(state): State<AppState>,
    uri: Uri,
    Path(calculation_id): Path<Uuid>,
) -> Result<Json<EventListDto>, Problem> {
    let events: Vec<JournalEventDto> = state
        .journal
        .for_calculation(calculation_id)
        .await
        .map_err(|e| {
            tracing::error!(calculation_id = %calculation_id, error = %e, "failed to load events");
            Problem::internal_error("Failed to load events").with_instance(uri.path())
        })?
        .into_iter()
        .map(JournalEventDto::from)
        .collect();

    let count = events.len();
    Ok(Json(EventListDto { events, count }))
}

/// Recent journal events across all calculations, newest first.
#[utoipa::path(
    get,
    path = "/api/events",
    params(ListQuery),
    responses(
        (status = 200, description = "Recent events", body = EventListDto),
        (status = 500, description = "Internal failure", body = Problem),
    ),
    tag = "events"
)]
pub(super) async fn list_events(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<ListQuery>,
) -> Result<Json<EventListDto>, Problem> {
    let limit = query.limit.unwrap_or(state.config.recent_events_limit);

    let events: Vec<JournalEventDto> = state
        .journal
        .recent(limit)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to load recent events");
            Problem::internal_error("Failed to load events").with_instance(uri.path())
        })?
        .into_iter()
        .map(JournalEventDto::from)
        .collect();

    let count = events.len();
    Ok(Json(EventListDto { events, count }))
}

/// Service health, including a store connectivity probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthDto)),
    tag = "system"
)]
pub(super) async fn health(State(state): State<AppState>) -> Json<HealthDto> {
    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            "disconnected"
        }
    };

    Json(HealthDto {
        status: "healthy".to_owned(),
        service: "growth-gateway".to_owned(),
        database: database.to_owned(),
        timestamp: OffsetDateTime::now_utc(),
    })
}
