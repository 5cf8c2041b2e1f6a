use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::ServiceState;

/// Answers as long as the volume lock can be taken, so a mount hung inside
/// goofys shows up here as a hung request.
#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    let volumes = state.driver().list().await.len();
    let msg = serde_json::json!({ "status": "ok", "volumes": volumes });
    (StatusCode::OK, Json(msg)).into_response()
}
