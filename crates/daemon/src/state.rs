//! The optional TOML config file.
//!
//! Every field is optional; anything left out falls back to the command line
//! or the built-in default (see [`crate::ServiceConfig::resolve`]).
//!
//! ```toml
//! root = "/var/lib/docker-volumes/s3vol"
//! socket = "/run/docker/plugins/s3vol.sock"
//! log_level = "debug"
//!
//! [mount]
//! endpoint = "http://minio:9000"
//! region = "us-east-1"
//! dir_mode = 0o750
//! cache_root = "/var/cache/s3vol"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "s3vol.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Directory all mountpoints are created under
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Unix socket the plugin API listens on
    #[serde(default)]
    pub socket: Option<PathBuf>,
    /// Path to (or name of) the goofys binary
    #[serde(default)]
    pub goofys_bin: Option<PathBuf>,
    /// Directory for log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
    /// Defaults applied to every mount, overridable per volume
    #[serde(default)]
    pub mount: MountSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountSection {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub acl: Option<String>,
    /// Write as a TOML octal literal, e.g. `0o755`
    #[serde(default)]
    pub dir_mode: Option<u32>,
    #[serde(default)]
    pub file_mode: Option<u32>,
    #[serde(default)]
    pub stat_cache_ttl_secs: Option<u64>,
    #[serde(default)]
    pub type_cache_ttl_secs: Option<u64>,
    /// Parent of the per-bucket cache directories used with `use-cache`
    #[serde(default)]
    pub cache_root: Option<PathBuf>,
    #[serde(default)]
    pub cache_free: Option<String>,
    #[serde(default)]
    pub fuse_options: Option<Vec<String>>,
}

impl AppConfig {
    /// Load the config file at `path`, or an empty config when no path is
    /// given. A path that is given must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, StateError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Err(StateError::MissingFile(path.to_path_buf()));
        }

        let config_toml = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
