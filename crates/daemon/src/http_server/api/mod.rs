//! Docker volume plugin protocol, v1.
//!
//! Every endpoint is a `POST` taking and returning JSON. Failures are HTTP 500
//! with the message in `Err`; Docker ignores the status code and only looks at
//! that field.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde::Serialize;

mod activate;
mod error;
mod extract;
pub mod volume_driver;

pub use error::ApiError;
pub use extract::PluginRequest;

use crate::ServiceState;

pub const PLUGIN_CONTENT_TYPE: &str = "application/vnd.docker.plugins.v1.2+json";

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/Plugin.Activate", post(activate::handler))
        .merge(volume_driver::router(state.clone()))
        .with_state(state)
}

/// JSON body tagged with the plugin content type.
#[derive(Debug)]
pub struct PluginResponse<T>(pub T);

impl<T: Serialize> IntoResponse for PluginResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, PLUGIN_CONTENT_TYPE)],
                body,
            )
                .into_response(),
            Err(e) => ApiError::from(e).into_response(),
        }
    }
}

/// The `{"Err": ""}` body of endpoints with nothing else to say.
#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
pub struct EmptyResponse {
    #[serde(rename = "Err")]
    pub err: String,
}
