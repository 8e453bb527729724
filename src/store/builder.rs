//! Store builder: executes registered calls and freezes their results
//!
//! Drains a registration ledger, runs every distinct producer call exactly
//! once, and writes each result under its derived key into the storage
//! root. The build is all-or-nothing: the first collision, missing producer
//! or producer failure aborts the whole run, since a portable bundle with
//! missing artifacts is unusable.

use crate::error::{IceboxError, IceboxResult};
use crate::store::key::{CallSignature, KeyDeriver, Sha256KeyDeriver, StoreKey};
use crate::store::ledger::RegistrationLedger;
use crate::store::manifest::{Manifest, ManifestEntry};
use crate::store::producer::ProducerRegistry;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Summary of a completed build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Distinct artifacts written
    pub artifacts: usize,
    /// Total payload bytes written
    pub total_bytes: u64,
    /// Registrations collapsed into an already-claimed key
    pub duplicates_collapsed: usize,
}

/// Builds the content-addressed store from a registration ledger
pub struct StoreBuilder<'a> {
    producers: &'a ProducerRegistry,
    deriver: Box<dyn KeyDeriver>,
}

impl<'a> StoreBuilder<'a> {
    /// Create a builder over a producer registry
    pub fn new(producers: &'a ProducerRegistry) -> Self {
        Self {
            producers,
            deriver: Box::new(Sha256KeyDeriver),
        }
    }

    /// Replace the key deriver (used to exercise collision handling)
    pub fn with_deriver(mut self, deriver: impl KeyDeriver + 'static) -> Self {
        self.deriver = Box::new(deriver);
        self
    }

    /// Execute every distinct registered call and persist the results
    ///
    /// Runs in two phases. The planning phase derives every key, collapses
    /// duplicate signatures, detects collisions and checks that each
    /// producer is registered; nothing is executed or written until the
    /// whole plan is valid. The execution phase then runs producers
    /// sequentially and writes each artifact atomically, finishing with the
    /// manifest. Rebuilding from an unchanged ledger yields byte-identical
    /// storage root contents.
    pub fn build(
        &self,
        ledger: &RegistrationLedger,
        storage_root: &Path,
    ) -> IceboxResult<BuildReport> {
        let (plan, duplicates_collapsed) = self.plan(ledger)?;

        fs::create_dir_all(storage_root).map_err(|e| {
            IceboxError::io(
                format!("creating storage root {}", storage_root.display()),
                e,
            )
        })?;

        let mut manifest = Manifest::new();
        let mut total_bytes: u64 = 0;

        for (key, signature) in &plan {
            let producer = self.producers.resolve(&signature.function_identity)?;

            debug!("Executing '{}' -> {}", signature.function_identity, key);
            let payload = producer
                .produce(&signature.arguments)
                .map_err(|e| IceboxError::Producer {
                    function_identity: signature.function_identity.clone(),
                    arguments: signature.canonical_arguments(),
                    reason: e.to_string(),
                })?;

            let bytes = payload.encode();
            let content_hash = hex::encode(Sha256::digest(&bytes));
            let size = bytes.len() as u64;

            write_atomic(storage_root, key, &bytes)?;
            total_bytes += size;

            manifest.entries.insert(
                key.as_str().to_string(),
                ManifestEntry {
                    function_identity: signature.function_identity.clone(),
                    arguments: signature.canonical_arguments(),
                    encoding: payload.encoding(),
                    content_hash,
                    size,
                },
            );
        }

        manifest.save(storage_root)?;

        let report = BuildReport {
            artifacts: plan.len(),
            total_bytes,
            duplicates_collapsed,
        };
        info!(
            "Built {} artifact(s), {} byte(s), {} duplicate registration(s) collapsed",
            report.artifacts, report.total_bytes, report.duplicates_collapsed
        );
        Ok(report)
    }

    /// Derive keys, collapse duplicates and validate the whole build plan
    fn plan(
        &self,
        ledger: &RegistrationLedger,
    ) -> IceboxResult<(BTreeMap<StoreKey, CallSignature>, usize)> {
        let mut plan: BTreeMap<StoreKey, CallSignature> = BTreeMap::new();
        let mut duplicates_collapsed = 0;

        for signature in ledger.entries() {
            let key = self.deriver.derive(signature)?;

            match plan.get(&key) {
                None => {
                    plan.insert(key, signature.clone());
                }
                Some(existing) if existing.canonical_form() == signature.canonical_form() => {
                    duplicates_collapsed += 1;
                }
                Some(existing) => {
                    return Err(IceboxError::Collision {
                        key: key.as_str().to_string(),
                        first: existing.canonical_form(),
                        second: signature.canonical_form(),
                    });
                }
            }
        }

        // Resolve every producer up front so a missing one aborts the
        // build before any artifact is written.
        for signature in plan.values() {
            self.producers.resolve(&signature.function_identity)?;
        }

        Ok((plan, duplicates_collapsed))
    }
}

/// Write payload bytes under the key, atomically from a reader's view
///
/// Written to `<key>.tmp` in the same directory and renamed into place, so
/// a reader never observes a partially written artifact.
fn write_atomic(storage_root: &Path, key: &StoreKey, bytes: &[u8]) -> IceboxResult<()> {
    let path = storage_root.join(key.as_str());
    let tmp = storage_root.join(format!("{}.tmp", key.as_str()));

    fs::write(&tmp, bytes)
        .map_err(|e| IceboxError::io(format!("writing artifact to {}", tmp.display()), e))?;
    fs::rename(&tmp, &path).map_err(|e| {
        IceboxError::io(format!("moving artifact into place at {}", path.display()), e)
    })?;

    Ok(())
}
