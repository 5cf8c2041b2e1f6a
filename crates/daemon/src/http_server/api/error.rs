use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use common::volume::VolumeError;

use super::PLUGIN_CONTENT_TYPE;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Volume(#[from] VolumeError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Volume(
                VolumeError::NotFound(_)
                | VolumeError::NotMounted { .. }
                | VolumeError::InvalidOption { .. }
                | VolumeError::InvalidName(_),
            )
            | ApiError::InvalidRequest(_) => {
                tracing::warn!(error = %self, "plugin request rejected");
            }
            _ => tracing::error!(error = %self, "plugin request failed"),
        }

        let body = serde_json::json!({ "Err": self.to_string() });
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, PLUGIN_CONTENT_TYPE)],
            body.to_string(),
        )
            .into_response()
    }
}
