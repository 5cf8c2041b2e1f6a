//! In-memory table of declared volumes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Raw, string-keyed options supplied when a volume is created.
pub type VolumeOptions = HashMap<String, String>;

/// A declared volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeEntry {
    pub options: VolumeOptions,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct VolumeRegistry {
    volumes: HashMap<String, VolumeEntry>,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `name`.
    pub fn create(&mut self, name: &str, options: VolumeOptions) {
        self.volumes.insert(
            name.to_string(),
            VolumeEntry {
                options,
                created_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&VolumeEntry> {
        self.volumes.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<VolumeEntry> {
        self.volumes.remove(name)
    }

    /// Iterate over all entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VolumeEntry)> {
        self.volumes.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(pairs: &[(&str, &str)]) -> VolumeOptions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn create_then_get() {
        let mut registry = VolumeRegistry::new();
        registry.create("vol-a", opts(&[("bucket", "b1")]));

        let entry = registry.get("vol-a").expect("entry");
        assert_eq!(entry.options.get("bucket").map(String::as_str), Some("b1"));
        assert!(registry.get("vol-b").is_none());
    }

    #[test]
    fn create_overwrites_options() {
        let mut registry = VolumeRegistry::new();
        registry.create("vol-a", opts(&[("region", "us-east-1")]));
        registry.create("vol-a", opts(&[("region", "eu-west-1")]));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("vol-a").unwrap().options.get("region").unwrap(),
            "eu-west-1"
        );
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut registry = VolumeRegistry::new();
        assert!(registry.remove("ghost").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn iter_lists_every_volume() {
        let mut registry = VolumeRegistry::new();
        registry.create("a", VolumeOptions::new());
        registry.create("a/sub", VolumeOptions::new());
        registry.create("b", VolumeOptions::new());

        let mut names: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        names.sort();
        assert_eq!(names, vec!["a", "a/sub", "b"]);
    }
}
