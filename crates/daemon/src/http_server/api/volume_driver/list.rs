use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::VolumeBody;
use crate::http_server::api::PluginResponse;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListResponse {
    pub volumes: Vec<VolumeBody>,
    pub err: String,
}

pub async fn handler(State(state): State<ServiceState>) -> PluginResponse<ListResponse> {
    let volumes = state
        .driver()
        .list()
        .await
        .into_iter()
        .map(VolumeBody::from)
        .collect();

    PluginResponse(ListResponse {
        volumes,
        err: String::new(),
    })
}
