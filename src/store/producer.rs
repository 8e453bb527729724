//! Producer functions and their registry
//!
//! A producer computes or loads one data artifact, expensive enough to
//! warrant freezing its result at build time. Producers are resolved by
//! function identity when the store is built; the deployed runtime never
//! invokes them.

use crate::error::{IceboxError, IceboxResult};
use crate::store::key::{canonical_bytes, ArgMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// A producer result, before on-disk encoding
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw bytes, passed through unchanged
    Bytes(Vec<u8>),
    /// Structured data, encoded as canonical JSON so rebuilds are
    /// byte-reproducible
    Json(Value),
}

impl Payload {
    /// Encode the payload to the bytes written into the store
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Bytes(bytes) => bytes.clone(),
            Self::Json(value) => canonical_bytes(value),
        }
    }

    /// Decode stored bytes back into a payload
    pub fn decode(encoding: PayloadEncoding, bytes: Vec<u8>) -> IceboxResult<Self> {
        match encoding {
            PayloadEncoding::Bytes => Ok(Self::Bytes(bytes)),
            PayloadEncoding::Json => {
                let value = serde_json::from_slice(&bytes)?;
                Ok(Self::Json(value))
            }
        }
    }

    /// The encoding tag recorded in the manifest for this payload
    pub fn encoding(&self) -> PayloadEncoding {
        match self {
            Self::Bytes(_) => PayloadEncoding::Bytes,
            Self::Json(_) => PayloadEncoding::Json,
        }
    }

    /// Interpret the payload as structured JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Bytes(_) => None,
        }
    }
}

/// On-disk encoding of a stored payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    /// Opaque bytes
    Bytes,
    /// Canonical JSON text
    Json,
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes => write!(f, "bytes"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// A function whose result can be frozen into the store
pub trait Producer: Send + Sync {
    /// Compute the artifact for one argument set
    fn produce(&self, arguments: &ArgMap) -> IceboxResult<Payload>;
}

impl<F> Producer for F
where
    F: Fn(&ArgMap) -> IceboxResult<Payload> + Send + Sync,
{
    fn produce(&self, arguments: &ArgMap) -> IceboxResult<Payload> {
        self(arguments)
    }
}

impl fmt::Debug for dyn Producer + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Producer")
    }
}

/// Resolves function identities to producer implementations
#[derive(Default)]
pub struct ProducerRegistry {
    producers: HashMap<String, Box<dyn Producer>>,
}

impl ProducerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a producer under its function identity
    ///
    /// Re-registering an identity replaces the previous producer.
    pub fn register(
        &mut self,
        function_identity: impl Into<String>,
        producer: impl Producer + 'static,
    ) {
        self.producers
            .insert(function_identity.into(), Box::new(producer));
    }

    /// Resolve a producer by identity
    pub fn resolve(&self, function_identity: &str) -> IceboxResult<&dyn Producer> {
        self.producers
            .get(function_identity)
            .map(|p| p.as_ref())
            .ok_or_else(|| IceboxError::ProducerNotRegistered(function_identity.to_string()))
    }

    /// Whether an identity has a registered producer
    pub fn contains(&self, function_identity: &str) -> bool {
        self.producers.contains_key(function_identity)
    }

    /// Number of registered producers
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

impl fmt::Debug for ProducerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerRegistry")
            .field("producers", &self.producers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_resolves_registered() {
        let mut registry = ProducerRegistry::new();
        registry.register("load_table", |args: &ArgMap| -> IceboxResult<Payload> {
            Ok(Payload::Json(json!({"rows": args["year"]})))
        });

        let producer = registry.resolve("load_table").unwrap();
        let mut args = ArgMap::new();
        args.insert("year".to_string(), json!(2020));

        let payload = producer.produce(&args).unwrap();
        assert_eq!(payload.as_json().unwrap()["rows"], json!(2020));
    }

    #[test]
    fn registry_unknown_identity() {
        let registry = ProducerRegistry::new();
        let err = registry.resolve("missing").unwrap_err();
        assert!(matches!(err, IceboxError::ProducerNotRegistered(_)));
    }

    #[test]
    fn bytes_payload_roundtrip() {
        let payload = Payload::Bytes(vec![0, 159, 146, 150]);
        let encoded = payload.encode();
        let decoded = Payload::decode(PayloadEncoding::Bytes, encoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn json_payload_encodes_canonically() {
        let payload = Payload::Json(json!({"b": 1, "a": [true, null]}));
        assert_eq!(payload.encode(), br#"{"a":[true,null],"b":1}"#.to_vec());
    }

    #[test]
    fn json_payload_roundtrip() {
        let payload = Payload::Json(json!({"rows": [1, 2, 3], "name": "t"}));
        let decoded = Payload::decode(PayloadEncoding::Json, payload.encode()).unwrap();
        assert_eq!(decoded, payload);
    }
}
