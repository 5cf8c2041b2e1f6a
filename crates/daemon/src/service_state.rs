use std::sync::Arc;

use common::primitive::{GoofysPrimitive, MountPrimitive};
use common::volume::VolumeDriver;

use crate::ServiceConfig;

/// Shared handle passed to every request handler.
#[derive(Clone)]
pub struct State {
    driver: Arc<VolumeDriver>,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        tokio::fs::create_dir_all(&config.root)
            .await
            .map_err(|source| StateSetupError::Root {
                path: config.root.display().to_string(),
                source,
            })?;

        let primitive: Arc<dyn MountPrimitive> =
            Arc::new(GoofysPrimitive::new(config.goofys_bin.clone()));
        tracing::info!(
            root = %config.root.display(),
            goofys = %config.goofys_bin.display(),
            "volume driver ready"
        );

        Ok(Self::from_driver(VolumeDriver::new(
            config.root.clone(),
            config.mount_defaults.clone(),
            primitive,
        )))
    }

    pub fn from_driver(driver: VolumeDriver) -> Self {
        Self {
            driver: Arc::new(driver),
        }
    }

    pub fn driver(&self) -> &VolumeDriver {
        &self.driver
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State").field("driver", &self.driver).finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to create volume root {path}: {source}")]
    Root {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
