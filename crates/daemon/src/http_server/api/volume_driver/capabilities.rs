use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::http_server::api::PluginResponse;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapabilitiesResponse {
    pub capabilities: CapabilitiesBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapabilitiesBody {
    pub scope: String,
}

pub async fn handler(State(state): State<ServiceState>) -> PluginResponse<CapabilitiesResponse> {
    let capabilities = state.driver().capabilities();
    PluginResponse(CapabilitiesResponse {
        capabilities: CapabilitiesBody {
            scope: capabilities.scope.as_str().to_string(),
        },
    })
}
