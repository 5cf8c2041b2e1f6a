//! The volume lifecycle facade.
//!
//! [`VolumeDriver`] is the only way to reach the registry and the reference
//! counts. Every lifecycle operation holds one exclusive lock for its whole
//! duration, including the attach/detach call, so at most one physical mount
//! change is ever in flight and "check the count, then act on it" cannot
//! race.
//!
//! Per bucket the driver moves between two states:
//!
//! ```text
//!   Unmounted --mount (attach ok)--> Mounted(1)
//!   Mounted(n) --mount--> Mounted(n+1)
//!   Mounted(n+1) --unmount--> Mounted(n)
//!   Mounted(1) --unmount (detach, best effort)--> Unmounted
//!   Unmounted --unmount--> error: NotMounted
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::Instrument;

use super::error::VolumeError;
use super::mountpoint::{BucketId, MountpointResolver};
use super::options::{translate, MountDefaults};
use super::orchestrator::MountOrchestrator;
use super::refs::{Acquire, MountRefs, NotMounted, Release};
use super::registry::{VolumeEntry, VolumeOptions, VolumeRegistry};
use crate::primitive::MountPrimitive;

/// Visibility of the volumes this driver creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Local => "local",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub scope: Scope,
}

/// Runtime state of the bucket behind a volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeStatus {
    pub bucket: BucketId,
    /// Outstanding mounts of the bucket, across every volume sharing it.
    pub mounts: usize,
}

/// A registered volume as reported by [`VolumeDriver::get`] and
/// [`VolumeDriver::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub name: String,
    pub mountpoint: PathBuf,
    pub created_at: DateTime<Utc>,
    pub status: VolumeStatus,
}

#[derive(Debug, Default)]
struct DriverState {
    registry: VolumeRegistry,
    refs: MountRefs,
}

/// Cheap to clone; clones share one registry and one set of counts.
#[derive(Clone)]
pub struct VolumeDriver {
    inner: Arc<DriverInner>,
}

struct DriverInner {
    resolver: MountpointResolver,
    defaults: MountDefaults,
    orchestrator: MountOrchestrator,
    state: Mutex<DriverState>,
}

impl VolumeDriver {
    pub fn new(
        root: impl Into<PathBuf>,
        defaults: MountDefaults,
        primitive: Arc<dyn MountPrimitive>,
    ) -> Self {
        let resolver = MountpointResolver::new(root);
        Self {
            inner: Arc::new(DriverInner {
                orchestrator: MountOrchestrator::new(resolver.clone(), primitive),
                resolver,
                defaults,
                state: Mutex::new(DriverState::default()),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        self.inner.resolver.root()
    }

    /// Register `name`, replacing any previous options.
    pub async fn create(&self, name: &str, options: VolumeOptions) {
        tracing::info!(volume = name, "creating volume");
        let mut state = self.inner.state.lock().await;
        state.registry.create(name, options);
    }

    pub async fn get(&self, name: &str) -> Result<VolumeInfo, VolumeError> {
        tracing::debug!(volume = name, "getting volume");
        let state = self.inner.state.lock().await;
        state
            .registry
            .get(name)
            .map(|entry| self.inner.info(name, entry, &state.refs))
            .ok_or_else(|| VolumeError::NotFound(name.to_string()))
    }

    /// Every registered volume, in no particular order.
    pub async fn list(&self) -> Vec<VolumeInfo> {
        let state = self.inner.state.lock().await;
        tracing::debug!(volumes = state.registry.len(), "listing volumes");
        state
            .registry
            .iter()
            .map(|(name, entry)| self.inner.info(name, entry, &state.refs))
            .collect()
    }

    /// Forget `name`. Removing an unknown name is not an error.
    ///
    /// Outstanding mounts are left alone; only an idle reference entry for
    /// the volume's bucket is dropped.
    pub async fn remove(&self, name: &str) {
        tracing::info!(volume = name, "removing volume");
        let bucket = BucketId::from_volume_name(name);
        let mut state = self.inner.state.lock().await;
        state.refs.prune_idle(&bucket);
        if state.registry.remove(name).is_none() {
            tracing::debug!(volume = name, "volume was not registered");
        }
    }

    /// Where `name` is (or would be) visible. Not checked for existence.
    pub fn path(&self, name: &str) -> PathBuf {
        let path = self.inner.resolver.resolve(name);
        tracing::debug!(volume = name, path = %path.display(), "resolved volume path");
        path
    }

    /// Mount `name`, attaching its bucket if no other volume holds it.
    ///
    /// Options are translated before any state changes, so an invalid
    /// option never leaves a reference or a mountpoint behind. The work runs
    /// on its own task: dropping the returned future does not stop an attach
    /// half way, and the count always matches what was mounted.
    pub async fn mount(&self, name: &str, caller: Option<&str>) -> Result<PathBuf, VolumeError> {
        let inner = self.inner.clone();
        let name = name.to_string();
        let caller = caller.map(str::to_string);
        tokio::spawn(
            async move { inner.mount(&name, caller.as_deref()).await }.in_current_span(),
        )
        .await?
    }

    /// Release one mount of `name`, detaching its bucket on the last one.
    ///
    /// Runs to completion on its own task, like [`VolumeDriver::mount`].
    pub async fn unmount(&self, name: &str, caller: Option<&str>) -> Result<(), VolumeError> {
        let inner = self.inner.clone();
        let name = name.to_string();
        let caller = caller.map(str::to_string);
        tokio::spawn(
            async move { inner.unmount(&name, caller.as_deref()).await }.in_current_span(),
        )
        .await?
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            scope: Scope::Local,
        }
    }

    /// Outstanding mounts of the bucket `name` belongs to.
    pub async fn mount_count(&self, name: &str) -> usize {
        let bucket = BucketId::from_volume_name(name);
        self.inner.state.lock().await.refs.count(&bucket)
    }
}

impl DriverInner {
    #[tracing::instrument(skip(self))]
    async fn mount(&self, name: &str, caller: Option<&str>) -> Result<PathBuf, VolumeError> {
        let bucket = BucketId::from_volume_name(name);
        if bucket.as_str().is_empty() {
            return Err(VolumeError::InvalidName(name.to_string()));
        }
        let volume_path = self.resolver.resolve(name);

        let mut state = self.state.lock().await;

        let options = match state.registry.get(name) {
            Some(entry) => entry.options.clone(),
            None => {
                tracing::warn!(volume = name, "mounting unregistered volume with default options");
                VolumeOptions::new()
            }
        };
        let config = translate(&bucket, &options, &self.defaults)?;

        match state.refs.acquire(&bucket) {
            Acquire::Warm(count) => {
                tracing::info!(volume = name, bucket = %bucket, count, "reusing mounted bucket");
            }
            Acquire::Cold => {
                self.orchestrator.attach(&bucket, &config).await?;
                state.refs.mark_attached(&bucket);
                tracing::info!(volume = name, bucket = %bucket, count = 1, "mounted volume");
            }
        }

        Ok(volume_path)
    }

    #[tracing::instrument(skip(self))]
    async fn unmount(&self, name: &str, caller: Option<&str>) -> Result<(), VolumeError> {
        let bucket = BucketId::from_volume_name(name);
        let mut state = self.state.lock().await;

        match state.refs.release(&bucket) {
            Ok(Release::Remaining(count)) => {
                tracing::info!(volume = name, bucket = %bucket, count, "bucket still in use");
            }
            Ok(Release::Last) => {
                self.orchestrator.detach(&bucket).await;
                tracing::info!(volume = name, bucket = %bucket, "unmounted volume");
            }
            Err(NotMounted(bucket)) => {
                let mountpoint = self.resolver.bucket_mountpoint(&bucket);
                return Err(VolumeError::NotMounted { bucket, mountpoint });
            }
        }

        Ok(())
    }

    fn info(&self, name: &str, entry: &VolumeEntry, refs: &MountRefs) -> VolumeInfo {
        let bucket = BucketId::from_volume_name(name);
        VolumeInfo {
            name: name.to_string(),
            mountpoint: self.resolver.resolve(name),
            created_at: entry.created_at,
            status: VolumeStatus {
                mounts: refs.count(&bucket),
                bucket,
            },
        }
    }
}

impl std::fmt::Debug for VolumeDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeDriver")
            .field("root", &self.inner.resolver.root())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testkit::MockPrimitive;

    fn driver() -> (tempfile::TempDir, Arc<MockPrimitive>, VolumeDriver) {
        let root = tempfile::tempdir().unwrap();
        let primitive = Arc::new(MockPrimitive::new());
        let driver = VolumeDriver::new(
            root.path(),
            MountDefaults::default(),
            primitive.clone() as Arc<dyn MountPrimitive>,
        );
        (root, primitive, driver)
    }

    #[tokio::test]
    async fn get_unknown_volume_is_not_found() {
        let (_root, _primitive, driver) = driver();
        let err = driver.get("ghost").await.unwrap_err();
        assert!(matches!(err, VolumeError::NotFound(ref n) if n == "ghost"));
    }

    #[tokio::test]
    async fn get_reports_mountpoint_and_count() {
        let (root, _primitive, driver) = driver();
        driver.create("b1/sub", VolumeOptions::new()).await;

        let info = driver.get("b1/sub").await.unwrap();
        assert_eq!(info.mountpoint, root.path().join("b1").join("sub"));
        assert_eq!(info.status.bucket.as_str(), "b1");
        assert_eq!(info.status.mounts, 0);

        driver.mount("b1/sub", Some("c1")).await.unwrap();
        assert_eq!(driver.get("b1/sub").await.unwrap().status.mounts, 1);
    }

    #[tokio::test]
    async fn path_is_computed_without_registration() {
        let (root, _primitive, driver) = driver();
        assert_eq!(driver.path("nowhere"), root.path().join("nowhere"));
    }

    #[tokio::test]
    async fn mount_rejects_empty_bucket() {
        let (_root, primitive, driver) = driver();
        let err = driver.mount("/abs", None).await.unwrap_err();
        assert!(matches!(err, VolumeError::InvalidName(_)));
        assert!(primitive.attach_calls().is_empty());
    }

    #[tokio::test]
    async fn mount_returns_volume_path() {
        let (root, primitive, driver) = driver();
        driver.create("b1/data", VolumeOptions::new()).await;

        let path = driver.mount("b1/data", None).await.unwrap();
        assert_eq!(path, root.path().join("b1/data"));
        assert_eq!(primitive.attach_calls(), vec![root.path().join("b1")]);
    }

    #[tokio::test]
    async fn unregistered_volume_mounts_with_defaults() {
        let (_root, primitive, driver) = driver();
        driver.mount("adhoc", None).await.unwrap();

        let configs = primitive.attach_configs();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].bucket, "adhoc");
        assert_eq!(configs[0].acl, "private");
    }

    #[tokio::test]
    async fn abandoned_mount_still_counts_its_attach() {
        let (_root, primitive, driver) = driver();
        primitive.delay_attach(Duration::from_millis(200));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), driver.mount("b1", Some("c1"))).await;
        assert!(abandoned.is_err());

        // waits for the abandoned attach to release the lock
        assert_eq!(driver.mount_count("b1").await, 1);
        assert_eq!(primitive.attach_calls().len(), 1);

        driver.mount("b1", Some("c2")).await.unwrap();
        assert_eq!(driver.mount_count("b1").await, 2);
        assert_eq!(primitive.attach_calls().len(), 1);
    }

    #[tokio::test]
    async fn abandoned_unmount_still_detaches() {
        let (root, primitive, driver) = driver();
        driver.mount("b1", Some("c1")).await.unwrap();
        primitive.delay_detach(Duration::from_millis(200));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), driver.unmount("b1", Some("c1"))).await;
        assert!(abandoned.is_err());

        assert_eq!(driver.mount_count("b1").await, 0);
        assert_eq!(primitive.detach_calls(), vec![root.path().join("b1")]);

        driver.mount("b1", Some("c2")).await.unwrap();
        assert_eq!(primitive.attach_calls().len(), 2);
        assert_eq!(driver.mount_count("b1").await, 1);
    }

    #[tokio::test]
    async fn capabilities_are_local() {
        let (_root, _primitive, driver) = driver();
        assert_eq!(driver.capabilities().scope.as_str(), "local");
    }
}
