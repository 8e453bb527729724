//! Build-time freeze store for portable deployments
//!
//! Precomputes every data artifact the dashboard's plugins will ever
//! request and persists it under a content-addressed key, so the deployed
//! application reads frozen artifacts instead of re-invoking producers.
//!
//! # Lifecycle
//!
//! | Phase | Component | Writes |
//! |-------|-----------|--------|
//! | Startup | `RegistrationLedger` | in-memory only |
//! | Build | `StoreBuilder` | artifacts + manifest, atomic |
//! | Runtime | `StoreReader` | none, store is immutable |
//!
//! Keys are SHA-256 digests over the producer's function identity and the
//! canonical serialization of its arguments; structurally equal argument
//! mappings always derive the same key.

pub mod builder;
pub mod key;
pub mod ledger;
pub mod manifest;
pub mod producer;
pub mod reader;

pub use builder::{BuildReport, StoreBuilder};
pub use key::{ArgMap, CallSignature, KeyDeriver, Sha256KeyDeriver, StoreKey};
pub use ledger::RegistrationLedger;
pub use manifest::{Manifest, ManifestEntry, MANIFEST_FILE};
pub use producer::{Payload, PayloadEncoding, Producer, ProducerRegistry};
pub use reader::StoreReader;
