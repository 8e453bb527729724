//! On-disk store manifest
//!
//! The manifest is the lookup index of the portable store: one entry per
//! derived key, recording the originating signature, payload encoding and
//! content hash. Entries are kept in a sorted map and the file is written
//! with stable formatting, so rebuilds from an unchanged ledger produce a
//! byte-identical manifest.

use crate::error::{IceboxError, IceboxResult};
use crate::store::producer::PayloadEncoding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Manifest file name inside the storage root
pub const MANIFEST_FILE: &str = "manifest.json";

/// Manifest format version
pub const MANIFEST_VERSION: u32 = 1;

/// One stored artifact as recorded in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Module-qualified producer name
    pub function_identity: String,
    /// Canonical serialization of the argument mapping
    pub arguments: String,
    /// How the payload bytes are encoded
    pub encoding: PayloadEncoding,
    /// SHA-256 of the payload bytes, hex-encoded
    pub content_hash: String,
    /// Payload size in bytes
    pub size: u64,
}

/// Index of every artifact in a storage root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version for forward compatibility
    pub version: u32,
    /// Derived key to artifact record, sorted by key
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load the manifest from a storage root
    pub fn load(storage_root: &Path) -> IceboxResult<Self> {
        let path = storage_root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).map_err(|e| IceboxError::ManifestInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| IceboxError::ManifestInvalid {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if manifest.version != MANIFEST_VERSION {
            return Err(IceboxError::ManifestInvalid {
                path,
                reason: format!(
                    "unsupported manifest version {} (expected {})",
                    manifest.version, MANIFEST_VERSION
                ),
            });
        }

        Ok(manifest)
    }

    /// Write the manifest into a storage root, atomically
    ///
    /// Written to a temporary path first and renamed into place, so a
    /// reader never observes a partially written index.
    pub fn save(&self, storage_root: &Path) -> IceboxResult<()> {
        let path = storage_root.join(MANIFEST_FILE);
        let tmp = storage_root.join(format!("{}.tmp", MANIFEST_FILE));

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, content)
            .map_err(|e| IceboxError::io(format!("writing manifest to {}", tmp.display()), e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            IceboxError::io(format!("moving manifest into place at {}", path.display()), e)
        })?;

        Ok(())
    }

    /// Look up an entry by derived key
    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(key)
    }

    /// Number of stored artifacts
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no artifacts
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(identity: &str) -> ManifestEntry {
        ManifestEntry {
            function_identity: identity.to_string(),
            arguments: "{}".to_string(),
            encoding: PayloadEncoding::Json,
            content_hash: "00".repeat(32),
            size: 2,
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut manifest = Manifest::new();
        manifest
            .entries
            .insert("load_table-abc".to_string(), entry("load_table"));

        manifest.save(dir.path()).unwrap();
        let loaded = Manifest::load(dir.path()).unwrap();

        assert_eq!(loaded, manifest);
    }

    #[test]
    fn save_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let mut manifest = Manifest::new();
        manifest.entries.insert("b-key".to_string(), entry("b"));
        manifest.entries.insert("a-key".to_string(), entry("a"));

        manifest.save(dir.path()).unwrap();
        let first = fs::read(dir.path().join(MANIFEST_FILE)).unwrap();

        manifest.save(dir.path()).unwrap();
        let second = fs::read(dir.path().join(MANIFEST_FILE)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, IceboxError::ManifestInvalid { .. }));
    }

    #[test]
    fn load_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"version": 99, "entries": {}}"#,
        )
        .unwrap();

        let err = Manifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, IceboxError::ManifestInvalid { .. }));
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "not json").unwrap();

        let err = Manifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, IceboxError::ManifestInvalid { .. }));
    }
}
