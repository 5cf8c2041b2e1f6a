//! Physical attach/detach of a bucket, including recovery from a crashed
//! mount left behind by a previous run.

use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::VolumeError;
use super::mountpoint::{BucketId, MountpointResolver};
use super::options::MountConfig;
use crate::primitive::{MountPrimitive, MountpointState};

const MOUNTPOINT_DIR_MODE: u32 = 0o755;

pub struct MountOrchestrator {
    resolver: MountpointResolver,
    primitive: Arc<dyn MountPrimitive>,
}

impl MountOrchestrator {
    pub fn new(resolver: MountpointResolver, primitive: Arc<dyn MountPrimitive>) -> Self {
        Self {
            resolver,
            primitive,
        }
    }

    /// Attach `bucket` at its mountpoint.
    ///
    /// A missing mountpoint is created. A disconnected mount is force-detached
    /// first; if that fails the attach is abandoned with
    /// [`VolumeError::CrashRecovery`]. Anything that is not a directory is a
    /// [`VolumeError::Conflict`].
    pub async fn attach(
        &self,
        bucket: &BucketId,
        config: &MountConfig,
    ) -> Result<PathBuf, VolumeError> {
        let mountpoint = self.resolver.bucket_mountpoint(bucket);

        match self.primitive.inspect(&mountpoint).await? {
            MountpointState::Absent => create_mountpoint(&mountpoint).await?,
            MountpointState::Directory => {}
            MountpointState::NotDirectory => return Err(VolumeError::Conflict(mountpoint)),
            MountpointState::Disconnected => {
                tracing::warn!(
                    bucket = %bucket,
                    mountpoint = %mountpoint.display(),
                    "found disconnected mount, detaching before remount"
                );
                self.primitive
                    .force_detach(&mountpoint)
                    .await
                    .map_err(|source| VolumeError::CrashRecovery {
                        mountpoint: mountpoint.clone(),
                        source,
                    })?;
            }
        }

        tracing::info!(
            bucket = %bucket,
            source = %config.source(),
            mountpoint = %mountpoint.display(),
            "attaching bucket"
        );
        self.primitive.attach(&mountpoint, config).await?;
        tracing::info!(bucket = %bucket, mountpoint = %mountpoint.display(), "bucket attached");

        Ok(mountpoint)
    }

    /// Detach `bucket` and remove its mountpoint directory.
    ///
    /// Never fails: a failed unmount is logged and left for the crash
    /// recovery path of the next attach.
    pub async fn detach(&self, bucket: &BucketId) {
        let mountpoint = self.resolver.bucket_mountpoint(bucket);

        match self.primitive.force_detach(&mountpoint).await {
            Ok(()) => {
                tracing::info!(bucket = %bucket, mountpoint = %mountpoint.display(), "bucket detached")
            }
            Err(e) => tracing::error!(
                bucket = %bucket,
                mountpoint = %mountpoint.display(),
                error = %e,
                "failed to unmount"
            ),
        }

        if let Err(e) = tokio::fs::remove_dir(&mountpoint).await {
            tracing::debug!(
                mountpoint = %mountpoint.display(),
                error = %e,
                "mountpoint directory not removed"
            );
        }
    }
}

async fn create_mountpoint(path: &Path) -> Result<(), VolumeError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(MOUNTPOINT_DIR_MODE)
            .create(&path)
    })
    .await
    .map_err(|e| VolumeError::Io(std::io::Error::other(e)))??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveError;
    use crate::testkit::MockPrimitive;
    use crate::volume::{translate, MountDefaults, VolumeOptions};

    fn setup(primitive: &Arc<MockPrimitive>) -> (tempfile::TempDir, MountOrchestrator) {
        let root = tempfile::tempdir().unwrap();
        let orchestrator = MountOrchestrator::new(
            MountpointResolver::new(root.path()),
            primitive.clone() as Arc<dyn MountPrimitive>,
        );
        (root, orchestrator)
    }

    fn config_for(bucket: &BucketId) -> MountConfig {
        translate(bucket, &VolumeOptions::new(), &MountDefaults::default()).unwrap()
    }

    #[tokio::test]
    async fn attach_creates_missing_mountpoint() {
        let primitive = Arc::new(MockPrimitive::new());
        let (root, orchestrator) = setup(&primitive);
        let bucket = BucketId::from_volume_name("b1");

        let mountpoint = orchestrator
            .attach(&bucket, &config_for(&bucket))
            .await
            .unwrap();

        assert_eq!(mountpoint, root.path().join("b1"));
        assert!(mountpoint.is_dir());
        assert_eq!(primitive.attach_calls(), vec![mountpoint]);
        assert!(primitive.detach_calls().is_empty());
    }

    #[tokio::test]
    async fn attach_refuses_non_directory() {
        let primitive = Arc::new(MockPrimitive::new());
        let (root, orchestrator) = setup(&primitive);
        let bucket = BucketId::from_volume_name("b1");
        std::fs::write(root.path().join("b1"), b"file").unwrap();

        let err = orchestrator
            .attach(&bucket, &config_for(&bucket))
            .await
            .unwrap_err();

        assert!(matches!(err, VolumeError::Conflict(ref p) if p == &root.path().join("b1")));
        assert!(primitive.attach_calls().is_empty());
    }

    #[tokio::test]
    async fn attach_recovers_disconnected_mount() {
        let primitive = Arc::new(MockPrimitive::new());
        let (root, orchestrator) = setup(&primitive);
        let bucket = BucketId::from_volume_name("b1");
        let mountpoint = root.path().join("b1");
        primitive.set_state(&mountpoint, MountpointState::Disconnected);

        orchestrator
            .attach(&bucket, &config_for(&bucket))
            .await
            .unwrap();

        assert_eq!(primitive.detach_calls(), vec![mountpoint.clone()]);
        assert_eq!(primitive.attach_calls(), vec![mountpoint]);
    }

    #[tokio::test]
    async fn failed_recovery_skips_attach() {
        let primitive = Arc::new(MockPrimitive::new());
        let (root, orchestrator) = setup(&primitive);
        let bucket = BucketId::from_volume_name("b1");
        let mountpoint = root.path().join("b1");
        primitive.set_state(&mountpoint, MountpointState::Disconnected);
        primitive.fail_detach("device or resource busy");

        let err = orchestrator
            .attach(&bucket, &config_for(&bucket))
            .await
            .unwrap_err();

        assert!(matches!(err, VolumeError::CrashRecovery { .. }));
        assert!(primitive.attach_calls().is_empty());
    }

    #[tokio::test]
    async fn inspection_errors_surface_unchanged() {
        let primitive = Arc::new(MockPrimitive::new());
        let (root, orchestrator) = setup(&primitive);
        let bucket = BucketId::from_volume_name("b1");
        primitive.fail_inspect(
            &root.path().join("b1"),
            std::io::ErrorKind::PermissionDenied,
        );

        let err = orchestrator
            .attach(&bucket, &config_for(&bucket))
            .await
            .unwrap_err();

        assert!(
            matches!(err, VolumeError::Io(ref e) if e.kind() == std::io::ErrorKind::PermissionDenied)
        );
        assert!(primitive.attach_calls().is_empty());
    }

    #[tokio::test]
    async fn attach_failure_is_passed_through() {
        let primitive = Arc::new(MockPrimitive::new());
        let (_root, orchestrator) = setup(&primitive);
        let bucket = BucketId::from_volume_name("b1");
        primitive.fail_attach("NoSuchBucket");

        let err = orchestrator
            .attach(&bucket, &config_for(&bucket))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VolumeError::MountPrimitive(PrimitiveError::Message(ref m)) if m == "NoSuchBucket"
        ));
    }

    #[tokio::test]
    async fn detach_removes_mountpoint_even_when_unmount_fails() {
        let primitive = Arc::new(MockPrimitive::new());
        let (root, orchestrator) = setup(&primitive);
        let bucket = BucketId::from_volume_name("b1");
        let mountpoint = root.path().join("b1");
        std::fs::create_dir(&mountpoint).unwrap();
        primitive.fail_detach("not mounted");

        orchestrator.detach(&bucket).await;

        assert_eq!(primitive.detach_calls(), vec![mountpoint.clone()]);
        assert!(!mountpoint.exists());
    }
}
