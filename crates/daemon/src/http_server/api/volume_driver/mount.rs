use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{ApiError, PluginRequest, PluginResponse};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountRequest {
    #[serde(rename = "Name")]
    pub name: String,
    /// Unique per mount request; Docker repeats it on the matching unmount.
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountResponse {
    pub mountpoint: String,
    pub err: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    PluginRequest(req): PluginRequest<MountRequest>,
) -> Result<PluginResponse<MountResponse>, ApiError> {
    let mountpoint = state
        .driver()
        .mount(&req.name, req.id.as_deref())
        .await?;

    Ok(PluginResponse(MountResponse {
        mountpoint: mountpoint.display().to_string(),
        err: String::new(),
    }))
}
