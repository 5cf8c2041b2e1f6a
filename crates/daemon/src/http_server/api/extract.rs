use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use super::ApiError;

/// JSON request body, whatever `Content-Type` Docker sent. An empty body
/// reads as `{}`.
#[derive(Debug)]
pub struct PluginRequest<T>(pub T);

impl<T, S> FromRequest<S> for PluginRequest<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &body
        };

        serde_json::from_slice(body)
            .map(PluginRequest)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }
}
