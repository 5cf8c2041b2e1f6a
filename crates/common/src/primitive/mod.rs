//! The network-filesystem mount primitive.
//!
//! [`MountPrimitive`] is the seam between the reference-counting state machine
//! and whatever actually performs FUSE mounts. [`GoofysPrimitive`] is the
//! production implementation; tests use [`crate::testkit::MockPrimitive`].

use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::volume::MountConfig;

mod goofys;

pub use goofys::{default_detach_commands, DetachCommand, GoofysPrimitive, DEFAULT_GOOFYS_BINARY};

/// What currently sits at a mountpoint path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountpointState {
    /// Nothing at the path.
    Absent,
    /// A directory, either empty or a live mount.
    Directory,
    /// A file, symlink or anything else that cannot be mounted over.
    NotDirectory,
    /// A FUSE mount whose serving process died while the kernel mount
    /// remained (`ENOTCONN`).
    Disconnected,
}

#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{0}")]
    Message(String),
}

#[async_trait]
pub trait MountPrimitive: Send + Sync + 'static {
    /// Inspect `mountpoint` without following symlinks.
    ///
    /// Errors other than "not found" and "not connected" are returned as-is.
    async fn inspect(&self, mountpoint: &Path) -> io::Result<MountpointState> {
        inspect_mountpoint(mountpoint).await
    }

    /// Mount `config` at `mountpoint`. Returns once the mount is usable.
    async fn attach(&self, mountpoint: &Path, config: &MountConfig) -> Result<(), PrimitiveError>;

    /// Unmount `mountpoint`, even when the serving side is gone.
    async fn force_detach(&self, mountpoint: &Path) -> Result<(), PrimitiveError>;
}

pub async fn inspect_mountpoint(mountpoint: &Path) -> io::Result<MountpointState> {
    match tokio::fs::symlink_metadata(mountpoint).await {
        Ok(metadata) if metadata.is_dir() => Ok(MountpointState::Directory),
        Ok(_) => Ok(MountpointState::NotDirectory),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(MountpointState::Absent),
        Err(e) if e.raw_os_error() == Some(libc::ENOTCONN) => Ok(MountpointState::Disconnected),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inspect_reports_absent_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing");
        assert_eq!(
            inspect_mountpoint(&missing).await.unwrap(),
            MountpointState::Absent
        );

        assert_eq!(
            inspect_mountpoint(dir.path()).await.unwrap(),
            MountpointState::Directory
        );

        let file = dir.path().join("file");
        std::fs::write(&file, b"not a mountpoint").unwrap();
        assert_eq!(
            inspect_mountpoint(&file).await.unwrap(),
            MountpointState::NotDirectory
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn inspect_does_not_follow_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path(), &link).unwrap();

        assert_eq!(
            inspect_mountpoint(&link).await.unwrap(),
            MountpointState::NotDirectory
        );
    }
}
