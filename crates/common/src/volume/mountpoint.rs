//! Volume name → bucket identity and mountpoint path.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Unit of physical mounting: every volume whose name starts with
/// `<bucket>/` shares the mount of `<bucket>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketId(String);

impl BucketId {
    /// Derive the bucket identity from a volume name: everything before the
    /// first `/`, or the whole name when it has none.
    pub fn from_volume_name(name: &str) -> Self {
        let bucket = name.split_once('/').map_or(name, |(head, _)| head);
        Self(bucket.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BucketId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maps names onto paths under a single root directory.
#[derive(Debug, Clone)]
pub struct MountpointResolver {
    root: PathBuf,
}

impl MountpointResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join the root with the normal components of `name`.
    ///
    /// Root, `.` and `..` components are skipped so the result always stays
    /// below the root.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let mut path = self.root.clone();
        for component in Path::new(name).components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
        path
    }

    /// Mountpoint of the physical mount backing `bucket`.
    pub fn bucket_mountpoint(&self, bucket: &BucketId) -> PathBuf {
        self.resolve(bucket.as_str())
    }
}
