//! Route registration, shared state, and the OpenAPI document.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::{dto, error, handlers};
use crate::config::GrowthCalcConfig;
use crate::domain::ports::{CalculationStore, EventJournal};
use crate::domain::{Service, ServiceConfig};

/// Shared state for all REST handlers.
///
/// The engine goes through `service`; the retrieval endpoints are pure
/// read-throughs against the store ports.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
    pub store: Arc<dyn CalculationStore>,
    pub journal: Arc<dyn EventJournal>,
    pub config: Arc<GrowthCalcConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn CalculationStore>,
        journal: Arc<dyn EventJournal>,
        config: GrowthCalcConfig,
    ) -> Self {
        let service = Arc::new(Service::new(
            store.clone(),
            journal.clone(),
            ServiceConfig::from(&config),
        ));
        Self {
            service,
            store,
            journal,
            config: Arc::new(config),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Growth Gateway API",
        description = "Linear and exponential growth calculations with \
                       real-time streaming and a persistent event journal"
    ),
    paths(
        handlers::calculate_stream,
        handlers::calculate,
        handlers::list_calculations,
        handlers::get_calculation_events,
        handlers::list_events,
        handlers::health,
    ),
    components(schemas(
        dto::CalculationRequestDto,
        dto::CalculationResponseDto,
        dto::StepLogDto,
        dto::StreamEventDto,
        dto::StepOperationDto,
        dto::CalculationRecordDto,
        dto::CalculationListDto,
        dto::JournalEventDto,
        dto::EventListDto,
        dto::HealthDto,
        error::Problem,
    ))
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the module router. CORS is permissive, matching the intended
/// browser-facing use of the stream endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/calculate/stream", post(handlers::calculate_stream))
        .route("/api/calculate", post(handlers::calculate))
        .route("/api/calculations", get(handlers::list_calculations))
        .route(
            "/api/events/{calculation_id}",
            get(handlers::get_calculation_events),
        )
        .route("/api/events", get(handlers::list_events))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_document_covers_all_routes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();

        for path in [
            "/api/calculate/stream",
            "/api/calculate",
            "/api/calculations",
            "/api/events/{calculation_id}",
            "/api/events",
            "/health",
        ] {
            assert!(
                json["paths"].get(path).is_some(),
                "missing OpenAPI path: {path}"
            );
        }
    }

    #[test]
    fn stream_endpoint_documents_event_stream_content() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        let content = json
            .pointer("/paths/~1api~1calculate~1stream/post/responses/200/content")
            .unwrap();
        assert!(content.get("text/event-stream").is_some());
    }
}
