use serde::{Deserialize, Serialize};

use super::PluginResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateResponse {
    #[serde(rename = "Implements")]
    pub implements: Vec<String>,
}

#[tracing::instrument]
pub async fn handler() -> PluginResponse<ActivateResponse> {
    tracing::info!("plugin activated");
    PluginResponse(ActivateResponse {
        implements: vec!["VolumeDriver".to_string()],
    })
}
