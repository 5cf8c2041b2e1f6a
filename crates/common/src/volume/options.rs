//! Translation of a volume's string options into a [`MountConfig`].
//!
//! Options are merged over process-wide [`MountDefaults`]. Numeric and octal
//! fields are validated strictly and abort the translation with
//! [`VolumeError::InvalidOption`]; boolean toggles are lenient and a value
//! that does not parse is ignored with a warning.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::error::VolumeError;
use super::mountpoint::BucketId;
use super::registry::VolumeOptions;

pub const DEFAULT_ACL: &str = "private";
pub const DEFAULT_DIR_MODE: u32 = 0o755;
pub const DEFAULT_FILE_MODE: u32 = 0o644;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_CACHE_FREE: &str = "50%";

const MAX_MODE: u32 = 0o7777;

pub mod keys {
    pub const BUCKET: &str = "bucket";
    pub const PREFIX: &str = "prefix";
    pub const ENDPOINT: &str = "endpoint";
    pub const ACCESS_KEY: &str = "access_key";
    pub const SECRET_KEY: &str = "secret_key";
    pub const REGION: &str = "region";
    pub const STORAGE_CLASS: &str = "storage-class";
    pub const ACL: &str = "acl";
    pub const UID: &str = "uid";
    pub const GID: &str = "gid";
    pub const DIR_MODE: &str = "dir-mode";
    pub const FILE_MODE: &str = "file-mode";
    pub const DEBUG_S3: &str = "debugs3";
    pub const CHEAP: &str = "cheap";
    pub const USE_CACHE: &str = "use-cache";

    pub const ALL: &[&str] = &[
        BUCKET,
        PREFIX,
        ENDPOINT,
        ACCESS_KEY,
        SECRET_KEY,
        REGION,
        STORAGE_CLASS,
        ACL,
        UID,
        GID,
        DIR_MODE,
        FILE_MODE,
        DEBUG_S3,
        CHEAP,
        USE_CACHE,
    ];
}

/// Access key pair for the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Process-wide values used wherever a volume does not override them.
#[derive(Debug, Clone)]
pub struct MountDefaults {
    pub endpoint: Option<String>,
    pub credentials: Option<Credentials>,
    pub region: Option<String>,
    pub acl: String,
    pub dir_mode: u32,
    pub file_mode: u32,
    pub stat_cache_ttl: Duration,
    pub type_cache_ttl: Duration,
    /// Parent directory of per-bucket disk caches.
    pub cache_root: PathBuf,
    /// Free-space threshold handed to the disk cache.
    pub cache_free: String,
    /// FUSE `-o` options applied to every mount.
    pub fuse_options: Vec<String>,
}

impl Default for MountDefaults {
    fn default() -> Self {
        Self {
            endpoint: None,
            credentials: None,
            region: None,
            acl: DEFAULT_ACL.to_string(),
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
            stat_cache_ttl: DEFAULT_CACHE_TTL,
            type_cache_ttl: DEFAULT_CACHE_TTL,
            cache_root: PathBuf::from("/tmp"),
            cache_free: DEFAULT_CACHE_FREE.to_string(),
            fuse_options: vec!["allow_other".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub directory: PathBuf,
    pub free: String,
}

/// Everything the mount primitive needs to attach one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountConfig {
    pub bucket: String,
    pub prefix: Option<String>,
    pub endpoint: Option<String>,
    pub credentials: Option<Credentials>,
    pub region: Option<String>,
    pub storage_class: Option<String>,
    pub acl: String,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub dir_mode: u32,
    pub file_mode: u32,
    pub debug_s3: bool,
    pub cheap: bool,
    pub cache: Option<CacheConfig>,
    pub stat_cache_ttl: Duration,
    pub type_cache_ttl: Duration,
    pub fuse_options: Vec<String>,
}

impl MountConfig {
    /// Remote source in `bucket[:prefix]` form.
    pub fn source(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", self.bucket, prefix),
            None => self.bucket.clone(),
        }
    }
}

/// Build the mount configuration for `bucket` from `options` and `defaults`.
pub fn translate(
    bucket: &BucketId,
    options: &VolumeOptions,
    defaults: &MountDefaults,
) -> Result<MountConfig, VolumeError> {
    for key in options.keys() {
        if !keys::ALL.contains(&key.as_str()) {
            tracing::warn!(bucket = %bucket, option = %key, "ignoring unknown volume option");
        }
    }

    let credentials = match (
        non_empty(options, keys::ACCESS_KEY),
        non_empty(options, keys::SECRET_KEY),
    ) {
        (Some(access_key), Some(secret_key)) => Some(Credentials::new(access_key, secret_key)),
        (None, None) => defaults.credentials.clone(),
        (Some(_), None) => {
            return Err(VolumeError::invalid_option(
                keys::SECRET_KEY,
                "must be set together with access_key",
            ))
        }
        (None, Some(_)) => {
            return Err(VolumeError::invalid_option(
                keys::ACCESS_KEY,
                "must be set together with secret_key",
            ))
        }
    };

    let use_cache = parse_bool(options, keys::USE_CACHE).unwrap_or(false);
    let cache = use_cache.then(|| CacheConfig {
        directory: defaults.cache_root.join(bucket.as_str()),
        free: defaults.cache_free.clone(),
    });

    let cheap = parse_bool(options, keys::CHEAP).unwrap_or(false);
    if cheap {
        tracing::info!(bucket = %bucket, "cheap mode enabled");
    }

    Ok(MountConfig {
        bucket: non_empty(options, keys::BUCKET)
            .unwrap_or(bucket.as_str())
            .to_string(),
        prefix: non_empty(options, keys::PREFIX).map(str::to_string),
        endpoint: non_empty(options, keys::ENDPOINT)
            .map(str::to_string)
            .or_else(|| defaults.endpoint.clone()),
        credentials,
        region: non_empty(options, keys::REGION)
            .map(str::to_string)
            .or_else(|| defaults.region.clone()),
        storage_class: non_empty(options, keys::STORAGE_CLASS).map(str::to_string),
        acl: non_empty(options, keys::ACL)
            .unwrap_or(defaults.acl.as_str())
            .to_string(),
        uid: parse_id(options, keys::UID)?,
        gid: parse_id(options, keys::GID)?,
        dir_mode: parse_mode(options, keys::DIR_MODE)?.unwrap_or(defaults.dir_mode),
        file_mode: parse_mode(options, keys::FILE_MODE)?.unwrap_or(defaults.file_mode),
        debug_s3: parse_bool(options, keys::DEBUG_S3).unwrap_or(false),
        cheap,
        cache,
        stat_cache_ttl: defaults.stat_cache_ttl,
        type_cache_ttl: defaults.type_cache_ttl,
        fuse_options: defaults.fuse_options.clone(),
    })
}

fn non_empty<'a>(options: &'a VolumeOptions, key: &str) -> Option<&'a str> {
    options
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn parse_id(options: &VolumeOptions, key: &str) -> Result<Option<u32>, VolumeError> {
    let Some(raw) = options.get(key) else {
        return Ok(None);
    };
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VolumeError::invalid_option(key, "must be a uint32"));
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| VolumeError::invalid_option(key, "must be a uint32"))
}

fn parse_mode(options: &VolumeOptions, key: &str) -> Result<Option<u32>, VolumeError> {
    let Some(raw) = options.get(key) else {
        return Ok(None);
    };
    let invalid = || VolumeError::invalid_option(key, "must be given in octal format");
    if raw.is_empty() || !raw.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(invalid());
    }
    let mode = u32::from_str_radix(raw, 8).map_err(|_| invalid())?;
    if mode > MAX_MODE {
        return Err(invalid());
    }
    Ok(Some(mode))
}

/// Boolean in any spelling accepted by Go's `strconv.ParseBool`, which is
/// what existing volume definitions were written against.
fn parse_bool(options: &VolumeOptions, key: &str) -> Option<bool> {
    let raw = options.get(key)?;
    match raw.as_str() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        other => {
            tracing::warn!(option = key, value = other, "ignoring malformed boolean option");
            None
        }
    }
}
