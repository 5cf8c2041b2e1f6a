//! Volume lifecycle: registry, mountpoint layout, option translation and
//! per-bucket mount reference counting, tied together by [`VolumeDriver`].

mod driver;
mod error;
mod mountpoint;
pub mod options;
mod orchestrator;
mod refs;
mod registry;

pub use driver::{Capabilities, Scope, VolumeDriver, VolumeInfo, VolumeStatus};
pub use error::VolumeError;
pub use mountpoint::{BucketId, MountpointResolver};
pub use options::{keys, translate, CacheConfig, Credentials, MountConfig, MountDefaults};
pub use orchestrator::MountOrchestrator;
pub use refs::{Acquire, MountRefs, NotMounted, Release};
pub use registry::{VolumeEntry, VolumeOptions, VolumeRegistry};
