use std::path::PathBuf;

use super::mountpoint::BucketId;
use crate::primitive::PrimitiveError;

/// Errors returned by the volume lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    #[error("unable to find volume {0}")]
    NotFound(String),

    #[error("unable to find volume mounted on {}", .mountpoint.display())]
    NotMounted {
        bucket: BucketId,
        mountpoint: PathBuf,
    },

    #[error("{} already exists and is not a directory", .0.display())]
    Conflict(PathBuf),

    #[error("invalid option {field}: {reason}")]
    InvalidOption { field: String, reason: String },

    #[error("invalid volume name {0:?}: empty bucket identity")]
    InvalidName(String),

    /// The attach/detach primitive failed; its message is kept as-is.
    #[error(transparent)]
    MountPrimitive(#[from] PrimitiveError),

    /// A disconnected mount was found and could not be force-detached.
    /// Needs operator intervention.
    #[error("failed to unmount stale mount at {}: {source}", .mountpoint.display())]
    CrashRecovery {
        mountpoint: PathBuf,
        #[source]
        source: PrimitiveError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("lifecycle task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl VolumeError {
    pub(crate) fn invalid_option(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = VolumeError::NotFound("vol-a".into());
        assert_eq!(err.to_string(), "unable to find volume vol-a");

        let err = VolumeError::Conflict(PathBuf::from("/mnt/b1"));
        assert_eq!(
            err.to_string(),
            "/mnt/b1 already exists and is not a directory"
        );

        let err = VolumeError::invalid_option("dir-mode", "must be given in octal format");
        assert_eq!(
            err.to_string(),
            "invalid option dir-mode: must be given in octal format"
        );
    }

    #[test]
    fn primitive_message_passes_through() {
        let err: VolumeError = PrimitiveError::Message("bucket does not exist".into()).into();
        assert_eq!(err.to_string(), "bucket does not exist");
    }
}
