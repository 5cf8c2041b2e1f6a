use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use common::volume::{Credentials, MountDefaults};

use crate::state::{AppConfig, MountSection};

pub const DEFAULT_ROOT: &str = "/var/lib/docker-volumes/s3vol";
pub const DEFAULT_SOCKET: &str = "/run/docker/plugins/s3vol.sock";
pub const DEFAULT_LOG_LEVEL: tracing::Level = tracing::Level::INFO;

const MAX_MODE: u32 = 0o7777;

#[derive(Debug, Clone)]
pub struct Config {
    // volume configuration
    /// directory every bucket mountpoint is created under
    pub root: PathBuf,
    /// defaults merged under each volume's options at mount time
    pub mount_defaults: MountDefaults,
    /// goofys binary, looked up on PATH unless absolute
    pub goofys_bin: PathBuf,

    // plugin api configuration
    /// unix socket docker connects to
    pub socket: PathBuf,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

/// Values given on the command line or through the environment. These win
/// over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub socket: Option<PathBuf>,
    pub goofys_bin: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<tracing::Level>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Config {
    /// Merge `overrides` over `file` over the built-in defaults.
    pub fn resolve(overrides: Overrides, file: AppConfig) -> Result<Self, ConfigError> {
        let log_level = match (overrides.log_level, file.log_level) {
            (Some(level), _) => level,
            (None, Some(raw)) => tracing::Level::from_str(&raw)
                .map_err(|_| ConfigError::InvalidLogLevel(raw.clone()))?,
            (None, None) => DEFAULT_LOG_LEVEL,
        };

        let mount_defaults = mount_defaults(&overrides, file.mount)?;

        Ok(Self {
            root: overrides
                .root
                .or(file.root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
            mount_defaults,
            goofys_bin: overrides
                .goofys_bin
                .or(file.goofys_bin)
                .unwrap_or_else(|| PathBuf::from(common::primitive::DEFAULT_GOOFYS_BINARY)),
            socket: overrides
                .socket
                .or(file.socket)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET)),
            log_level,
            log_dir: overrides.log_dir.or(file.log_dir),
        })
    }
}

fn mount_defaults(overrides: &Overrides, file: MountSection) -> Result<MountDefaults, ConfigError> {
    let mut defaults = MountDefaults::default();

    defaults.endpoint = overrides.endpoint.clone().or(file.endpoint);
    defaults.region = file.region;

    let access_key = overrides.access_key.clone().or(file.access_key);
    let secret_key = overrides.secret_key.clone().or(file.secret_key);
    defaults.credentials = match (access_key, secret_key) {
        (Some(access_key), Some(secret_key)) => Some(Credentials::new(access_key, secret_key)),
        (None, None) => None,
        _ => return Err(ConfigError::IncompleteCredentials),
    };

    if let Some(acl) = file.acl {
        defaults.acl = acl;
    }
    if let Some(mode) = file.dir_mode {
        defaults.dir_mode = check_mode("dir_mode", mode)?;
    }
    if let Some(mode) = file.file_mode {
        defaults.file_mode = check_mode("file_mode", mode)?;
    }
    if let Some(secs) = file.stat_cache_ttl_secs {
        defaults.stat_cache_ttl = Duration::from_secs(secs);
    }
    if let Some(secs) = file.type_cache_ttl_secs {
        defaults.type_cache_ttl = Duration::from_secs(secs);
    }
    if let Some(cache_root) = file.cache_root {
        defaults.cache_root = cache_root;
    }
    if let Some(cache_free) = file.cache_free {
        defaults.cache_free = cache_free;
    }
    if let Some(fuse_options) = file.fuse_options {
        defaults.fuse_options = fuse_options;
    }

    Ok(defaults)
}

fn check_mode(field: &'static str, mode: u32) -> Result<u32, ConfigError> {
    if mode > MAX_MODE {
        return Err(ConfigError::InvalidMode { field, mode });
    }
    Ok(mode)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("access key and secret key must be set together")]
    IncompleteCredentials,

    #[error("invalid {field}: {mode:o} is not a permission mode")]
    InvalidMode { field: &'static str, mode: u32 },

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
}
