//! Cross-run upload manifest
//!
//! Optional JSON record of object names known to exist remotely, letting
//! later runs skip per-object existence checks. Purely an optimization: a
//! missing or corrupt manifest only costs extra checks, never a wrong URL.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    known_objects: BTreeSet<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest, starting empty when the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(
                        "Ignoring corrupt manifest {}: {}. Starting fresh.",
                        path.display(),
                        e
                    );
                    Self::new()
                }
            },
            Err(_) => Self::new(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn contains(&self, object_name: &str) -> bool {
        self.known_objects.contains(object_name)
    }

    pub fn record(&mut self, object_name: impl Into<String>) {
        self.known_objects.insert(object_name.into());
    }

    /// Forget an object, e.g. after it was deleted remotely.
    pub fn remove(&mut self, object_name: &str) -> bool {
        self.known_objects.remove(object_name)
    }

    pub fn len(&self) -> usize {
        self.known_objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known_objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_manifest_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");

        let mut manifest = Manifest::new();
        manifest.record("www/abcd.png");
        manifest.record("www/ef01.css");
        manifest.save(&path).unwrap();

        let loaded = Manifest::load(&path);
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains("www/abcd.png"));
        assert!(!loaded.contains("www/ffff.js"));
    }

    #[test]
    fn test_missing_manifest_starts_empty() {
        let manifest = Manifest::load(Path::new("/no/such/manifest.json"));
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_corrupt_manifest_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "not json at all").unwrap();

        let manifest = Manifest::load(&path);
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_remove_forgets_object() {
        let mut manifest = Manifest::new();
        manifest.record("www/abcd.png");

        assert!(manifest.remove("www/abcd.png"));
        assert!(!manifest.contains("www/abcd.png"));
        assert!(!manifest.remove("www/abcd.png"));
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut manifest = Manifest::new();
        manifest.record("www/abcd.png");
        manifest.record("www/abcd.png");
        assert_eq!(manifest.len(), 1);
    }
}
