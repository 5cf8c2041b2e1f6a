use axum::extract::State;
use serde::{Deserialize, Serialize};

use common::volume::VolumeInfo;

use crate::http_server::api::{ApiError, PluginRequest, PluginResponse};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetResponse {
    pub volume: VolumeBody,
    pub err: String,
}

/// A volume as Docker sees it. `Status` is free-form and shown by
/// `docker volume inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeBody {
    pub name: String,
    pub mountpoint: String,
    pub created_at: String,
    pub status: StatusBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub bucket: String,
    pub mounts: usize,
}

impl From<VolumeInfo> for VolumeBody {
    fn from(info: VolumeInfo) -> Self {
        Self {
            name: info.name,
            mountpoint: info.mountpoint.display().to_string(),
            created_at: info.created_at.to_rfc3339(),
            status: StatusBody {
                bucket: info.status.bucket.to_string(),
                mounts: info.status.mounts,
            },
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    PluginRequest(req): PluginRequest<GetRequest>,
) -> Result<PluginResponse<GetResponse>, ApiError> {
    let info = state.driver().get(&req.name).await?;
    Ok(PluginResponse(GetResponse {
        volume: info.into(),
        err: String::new(),
    }))
}
