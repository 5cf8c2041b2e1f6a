use std::collections::HashMap;

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{EmptyResponse, PluginRequest, PluginResponse};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(rename = "Name")]
    pub name: String,
    /// `docker volume create -o key=value` pairs; Docker sends `null` when
    /// there are none.
    #[serde(rename = "Opts", default)]
    pub opts: Option<HashMap<String, String>>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    PluginRequest(req): PluginRequest<CreateRequest>,
) -> PluginResponse<EmptyResponse> {
    state
        .driver()
        .create(&req.name, req.opts.unwrap_or_default())
        .await;
    PluginResponse(EmptyResponse::default())
}
