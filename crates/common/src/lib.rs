/**
 * Mounting network filesystems at a path.
 *  The goofys implementation and the trait
 *  the volume layer drives it through.
 */
pub mod primitive;
/**
 * In-process stand-ins for the mount primitive,
 *  shared by unit and integration tests.
 */
pub mod testkit;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;
/**
 * Docker volume semantics: named volumes,
 *  their options and shared bucket mounts.
 */
pub mod volume;

pub mod prelude {
    pub use crate::primitive::{GoofysPrimitive, MountPrimitive, MountpointState, PrimitiveError};
    pub use crate::version::build_info;
    pub use crate::volume::{
        MountDefaults, VolumeDriver, VolumeError, VolumeInfo, VolumeOptions,
    };
}
