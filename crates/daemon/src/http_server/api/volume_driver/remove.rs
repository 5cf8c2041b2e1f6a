use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{EmptyResponse, PluginRequest, PluginResponse};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    #[serde(rename = "Name")]
    pub name: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    PluginRequest(req): PluginRequest<RemoveRequest>,
) -> PluginResponse<EmptyResponse> {
    state.driver().remove(&req.name).await;
    PluginResponse(EmptyResponse::default())
}
