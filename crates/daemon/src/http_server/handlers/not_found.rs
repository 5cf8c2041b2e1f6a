use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::http_server::api::PLUGIN_CONTENT_TYPE;

/// Docker reads `Err` out of any JSON body, so JSON callers get the plugin
/// error shape; everyone else gets plain text.
pub async fn not_found_handler(uri: Uri, headers: HeaderMap) -> Response {
    let accept = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok());

    tracing::debug!(path = %uri.path(), "no route");

    match accept {
        Some(accept_str) if accept_str.contains("json") => {
            let err_msg = serde_json::json!({ "Err": format!("unknown endpoint {}", uri.path()) });
            (
                StatusCode::NOT_FOUND,
                [(axum::http::header::CONTENT_TYPE, PLUGIN_CONTENT_TYPE)],
                err_msg.to_string(),
            )
                .into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            [(axum::http::header::CONTENT_TYPE, "text/plain")],
            "not found",
        )
            .into_response(),
    }
}
