//! Key derivation for content-addressed storage
//!
//! Turns a (function identity, argument set) pair into a stable storage key.
//! Arguments are canonicalized first: object keys recursively sorted, stable
//! number and string rendering. Same call = same canonical form = same key,
//! regardless of how the argument mapping was constructed.

use crate::error::{IceboxError, IceboxResult};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Argument set for a producer call: parameter name to JSON value
pub type ArgMap = serde_json::Map<String, Value>;

/// Identifies one producer invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CallSignature {
    /// Module-qualified producer name
    pub function_identity: String,
    /// Ordered mapping from parameter name to value
    pub arguments: ArgMap,
}

impl CallSignature {
    /// Create a signature from an argument mapping
    pub fn new(function_identity: impl Into<String>, arguments: ArgMap) -> Self {
        Self {
            function_identity: function_identity.into(),
            arguments,
        }
    }

    /// Create a signature from any serializable argument struct
    ///
    /// The value must serialize to a JSON object; anything else (sequences,
    /// scalars, types serde_json rejects) is a `Serialization` error.
    pub fn from_serialize<T: Serialize>(
        function_identity: impl Into<String>,
        arguments: &T,
    ) -> IceboxResult<Self> {
        let identity = function_identity.into();
        let value = serde_json::to_value(arguments)
            .map_err(|e| IceboxError::serialization(&identity, e.to_string()))?;
        match value {
            Value::Object(map) => Ok(Self::new(identity, map)),
            other => Err(IceboxError::serialization(
                &identity,
                format!("argument set must be a mapping, got {}", value_kind(&other)),
            )),
        }
    }

    /// Canonical serialization of the argument mapping
    pub fn canonical_arguments(&self) -> String {
        let mut out = String::new();
        write_canonical_object(&self.arguments, &mut out);
        out
    }

    /// Canonical `identity(arguments)` form, used for collision reporting
    pub fn canonical_form(&self) -> String {
        format!("{}({})", self.function_identity, self.canonical_arguments())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// A derived storage key, safe as a single filesystem path segment
///
/// Format: `{prefix}-{digest}` where the prefix is a sanitized fragment of
/// the function identity (debuggability only) and the digest is the full
/// hex-encoded SHA-256 of the canonical signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(String);

impl StoreKey {
    /// Build a key from a raw string (trusted input, e.g. manifest entries)
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The key as a path segment
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derives storage keys from call signatures
///
/// A trait so the builder can be exercised with a stubbed deriver; the
/// production implementation is [`Sha256KeyDeriver`].
pub trait KeyDeriver: Send + Sync {
    /// Derive the storage key for a signature
    fn derive(&self, signature: &CallSignature) -> IceboxResult<StoreKey>;
}

/// Default deriver: SHA-256 over identity + canonical arguments
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256KeyDeriver;

impl KeyDeriver for Sha256KeyDeriver {
    fn derive(&self, signature: &CallSignature) -> IceboxResult<StoreKey> {
        let canonical = signature.canonical_arguments();

        let mut hasher = Sha256::new();
        hasher.update(signature.function_identity.as_bytes());
        hasher.update([0u8]); // separator so "ab"+"c" != "a"+"bc"
        hasher.update(canonical.as_bytes());
        let digest = hex::encode(hasher.finalize());

        let prefix = identity_prefix(&signature.function_identity);
        Ok(StoreKey(format!("{}-{}", prefix, digest)))
    }
}

/// Sanitize a function identity into a short, path-safe key prefix
fn identity_prefix(identity: &str) -> String {
    let tail = identity
        .rsplit(|c| c == ':' || c == '.' || c == '/')
        .next()
        .unwrap_or(identity);

    let mut prefix: String = tail
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(24)
        .collect();

    if prefix.is_empty() {
        prefix.push_str("fn");
    }
    prefix
}

/// Write the canonical JSON form of a value
///
/// Object keys are emitted in sorted order at every nesting level; numbers
/// use serde_json's stable rendering; no insignificant whitespace.
pub fn write_canonical_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_escaped_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_canonical_object(map, out),
    }
}

fn write_canonical_object(map: &ArgMap, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    out.push('{');
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_escaped_string(key, out);
        out.push(':');
        write_canonical_value(&map[key.as_str()], out);
    }
    out.push('}');
}

fn write_escaped_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Canonical JSON encoding of a full value, as bytes
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut out = String::new();
    write_canonical_value(value, &mut out);
    out.into_bytes()
}
