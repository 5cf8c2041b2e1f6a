//! Per-bucket count of outstanding mount requests.

use std::collections::HashMap;

use super::mountpoint::BucketId;

/// Outcome of [`MountRefs::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// No physical mount exists. The count is untouched; the caller must
    /// attach and then call [`MountRefs::mark_attached`].
    Cold,
    /// A physical mount already exists and the count was bumped to the
    /// contained value.
    Warm(usize),
}

/// Outcome of [`MountRefs::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The last outstanding reference is gone; the caller must detach.
    Last,
    /// References remain; nothing to do physically.
    Remaining(usize),
}

/// Returned by [`MountRefs::release`] for a bucket with nothing mounted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bucket {0} is not mounted")]
pub struct NotMounted(pub BucketId);

/// Reference counts keyed by bucket identity.
///
/// A count of zero and a missing entry both mean "no physical mount".
#[derive(Debug, Default)]
pub struct MountRefs {
    counts: HashMap<BucketId, usize>,
}

impl MountRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, bucket: &BucketId) -> usize {
        self.counts.get(bucket).copied().unwrap_or(0)
    }

    pub fn acquire(&mut self, bucket: &BucketId) -> Acquire {
        match self.counts.get_mut(bucket) {
            Some(count) if *count > 0 => {
                *count += 1;
                Acquire::Warm(*count)
            }
            _ => Acquire::Cold,
        }
    }

    /// Record a successful physical attach after a cold acquire.
    pub fn mark_attached(&mut self, bucket: &BucketId) {
        self.counts.insert(bucket.clone(), 1);
    }

    pub fn release(&mut self, bucket: &BucketId) -> Result<Release, NotMounted> {
        match self.counts.get_mut(bucket) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    Ok(Release::Last)
                } else {
                    Ok(Release::Remaining(*count))
                }
            }
            _ => Err(NotMounted(bucket.clone())),
        }
    }

    /// Drop the entry for `bucket` if it has no outstanding references.
    /// Returns whether an entry was removed.
    pub fn prune_idle(&mut self, bucket: &BucketId) -> bool {
        if self.counts.get(bucket) == Some(&0) {
            self.counts.remove(bucket);
            return true;
        }
        false
    }

    #[cfg(test)]
    fn has_entry(&self, bucket: &BucketId) -> bool {
        self.counts.contains_key(bucket)
    }
}
