/// Test doubles for exercising the volume state machine without FUSE
///
/// [`MockPrimitive`] stands in for the goofys mount primitive. It records
/// every attach and detach, can be told to fail either, and can report a
/// scripted [`MountpointState`](crate::primitive::MountpointState) for chosen
/// paths (for example a crashed, disconnected mount). Paths without a
/// scripted state are inspected on the real filesystem, so tests usually
/// point the driver at a `tempfile` root.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use common::testkit::MockPrimitive;
/// use common::volume::{MountDefaults, VolumeDriver};
///
/// let primitive = Arc::new(MockPrimitive::new());
/// let root = tempfile::tempdir()?;
/// let driver = VolumeDriver::new(root.path(), MountDefaults::default(), primitive.clone());
///
/// driver.create("vol-a", Default::default()).await;
/// driver.mount("vol-a", None).await?;
/// assert_eq!(primitive.attach_calls().len(), 1);
/// ```
mod mock_primitive;

pub use mock_primitive::MockPrimitive;
