use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tower_http::trace::TraceLayer;

use crate::server::api::{
    error_response, ApiError, RegisterRequest, RegisteredTrack, ServiceInfo,
};
use crate::server::AppState;
use crate::track::TrackSummary;

/// Full HTTP surface. The API is served under `/api` and, for older clients,
/// under `/igcinfo/api`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(service_info))
        .route("/igc", get(list_tracks).post(register_track))
        .route("/igc/:id", get(track_summary))
        .route("/igc/:id/:field", get(track_field));

    Router::new()
        .nest("/api", api.clone())
        .nest("/igcinfo/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(state.meta.info_at(Utc::now()))
}

async fn list_tracks(State(state): State<AppState>) -> Response {
    let ids = state.registry.list_ids();
    if ids.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(ids).into_response()
}

async fn register_track(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<RegisteredTrack>, ApiError> {
    let request: RegisterRequest = serde_json::from_str(&body)
        .map_err(|err| ApiError::BadRequest(format!("Invalid request body: {err}")))?;
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("url must not be empty".to_string()));
    }

    let track = state.parser.parse(url).await?;
    let id = state.registry.register(track)?;
    Ok(Json(RegisteredTrack { id }))
}

async fn track_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrackSummary>, ApiError> {
    Ok(Json(state.registry.summary(&id)?))
}

/// Plain-text endpoint: both the value and any error are `text/plain`.
async fn track_field(
    State(state): State<AppState>,
    Path((id, field)): Path<(String, String)>,
) -> Response {
    match state.registry.get_field(&id, &field) {
        Ok(value) => value.into_response(),
        Err(err) => {
            tracing::debug!(track_id = %id, %field, error = %err, "field lookup failed");
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
    }
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}
