use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{PluginRequest, PluginResponse};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequest {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PathResponse {
    pub mountpoint: String,
    pub err: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    PluginRequest(req): PluginRequest<PathRequest>,
) -> PluginResponse<PathResponse> {
    PluginResponse(PathResponse {
        mountpoint: state.driver().path(&req.name).display().to_string(),
        err: String::new(),
    })
}
