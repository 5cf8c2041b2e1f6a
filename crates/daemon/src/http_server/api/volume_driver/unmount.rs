use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{ApiError, EmptyResponse, PluginRequest, PluginResponse};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmountRequest {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    PluginRequest(req): PluginRequest<UnmountRequest>,
) -> Result<PluginResponse<EmptyResponse>, ApiError> {
    state
        .driver()
        .unmount(&req.name, req.id.as_deref())
        .await?;
    Ok(PluginResponse(EmptyResponse::default()))
}
