//! Store reader: runtime lookups against a built store
//!
//! In portable mode, any call site that would invoke a producer directly
//! routes through [`StoreReader::lookup`] with the identical function
//! identity and arguments. The reader derives the same key the builder
//! derived and streams back the persisted artifact; it never executes
//! producer code and never writes. Lookups are plain immutable reads, safe
//! for concurrent use.

use crate::error::{IceboxError, IceboxResult};
use crate::store::key::{ArgMap, CallSignature, KeyDeriver, Sha256KeyDeriver};
use crate::store::manifest::{Manifest, ManifestEntry};
use crate::store::producer::Payload;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view over a built storage root
pub struct StoreReader {
    storage_root: PathBuf,
    manifest: Manifest,
    deriver: Box<dyn KeyDeriver>,
    verify_on_read: bool,
}

impl std::fmt::Debug for StoreReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreReader")
            .field("storage_root", &self.storage_root)
            .field("manifest", &self.manifest)
            .field("verify_on_read", &self.verify_on_read)
            .finish_non_exhaustive()
    }
}

impl StoreReader {
    /// Open a storage root, loading its manifest
    pub fn open(storage_root: impl Into<PathBuf>) -> IceboxResult<Self> {
        let storage_root = storage_root.into();
        let manifest = Manifest::load(&storage_root)?;
        Ok(Self {
            storage_root,
            manifest,
            deriver: Box::new(Sha256KeyDeriver),
            verify_on_read: true,
        })
    }

    /// Disable content-hash verification on each read
    pub fn without_verification(mut self) -> Self {
        self.verify_on_read = false;
        self
    }

    /// Resolve the artifact for a call, without invoking its producer
    ///
    /// A missing key means the call site requests data that was never
    /// registered at build time. That is build/runtime skew, a programming
    /// error in a closed-world bundle, so it surfaces as `NotFound` rather
    /// than any recoverable condition.
    pub fn lookup(
        &self,
        function_identity: &str,
        arguments: ArgMap,
    ) -> IceboxResult<Payload> {
        let signature = CallSignature::new(function_identity, arguments);
        let key = self.deriver.derive(&signature)?;
        debug!("Lookup '{}' -> {}", function_identity, key);

        let entry = self
            .manifest
            .get(key.as_str())
            .ok_or_else(|| IceboxError::NotFound {
                function_identity: function_identity.to_string(),
                key: key.as_str().to_string(),
            })?;

        self.read_entry(key.as_str(), entry)
    }

    /// Read and decode one manifest entry
    fn read_entry(&self, key: &str, entry: &ManifestEntry) -> IceboxResult<Payload> {
        let path = self.storage_root.join(key);
        let bytes = fs::read(&path).map_err(|e| IceboxError::StoreCorrupt {
            key: key.to_string(),
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;

        if self.verify_on_read {
            verify_content(key, entry, &bytes)?;
        }

        Payload::decode(entry.encoding, bytes)
    }

    /// Recompute every content hash against the manifest
    ///
    /// Returns the number of verified artifacts; fails on the first
    /// mismatch or unreadable file.
    pub fn verify_all(&self) -> IceboxResult<usize> {
        for (key, entry) in &self.manifest.entries {
            let path = self.storage_root.join(key);
            let bytes = fs::read(&path).map_err(|e| IceboxError::StoreCorrupt {
                key: key.clone(),
                reason: format!("cannot read {}: {}", path.display(), e),
            })?;
            verify_content(key, entry, &bytes)?;
        }
        Ok(self.manifest.len())
    }

    /// The manifest this reader serves from
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The storage root this reader serves from
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }
}

fn verify_content(key: &str, entry: &ManifestEntry, bytes: &[u8]) -> IceboxResult<()> {
    if bytes.len() as u64 != entry.size {
        return Err(IceboxError::StoreCorrupt {
            key: key.to_string(),
            reason: format!("size mismatch: expected {}, found {}", entry.size, bytes.len()),
        });
    }

    let actual = hex::encode(Sha256::digest(bytes));
    if actual != entry.content_hash {
        return Err(IceboxError::StoreCorrupt {
            key: key.to_string(),
            reason: format!(
                "content hash mismatch: expected {}, found {}",
                entry.content_hash, actual
            ),
        });
    }

    Ok(())
}
