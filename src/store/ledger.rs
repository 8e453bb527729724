//! Registration ledger for build-time freeze calls
//!
//! Accumulates, per build invocation, every (function identity, argument
//! sets) pair the plugins declare. One ledger per build, created empty and
//! discarded once the store is written; it plays no role in the deployed
//! runtime. An explicit instance rather than process-global state, so
//! concurrent and test builds isolate cleanly.

use crate::error::{IceboxError, IceboxResult};
use crate::store::key::{ArgMap, CallSignature};
use serde_json::Value;
use tracing::debug;

/// Per-build table of declared producer calls
///
/// Registration happens during single-threaded application startup, before
/// the builder runs, so no internal locking is needed.
#[derive(Debug, Default)]
pub struct RegistrationLedger {
    entries: Vec<CallSignature>,
}

impl RegistrationLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one producer with the argument sets it must be frozen for
    ///
    /// May be called many times across many plugins; order is irrelevant.
    /// Duplicates are kept here and collapsed by the builder, which
    /// deduplicates by derived key.
    pub fn register(
        &mut self,
        function_identity: impl Into<String>,
        argument_sets: Vec<ArgMap>,
    ) {
        let identity = function_identity.into();
        debug!(
            "Registering {} argument set(s) for '{}'",
            argument_sets.len(),
            identity
        );
        for arguments in argument_sets {
            self.entries.push(CallSignature::new(identity.clone(), arguments));
        }
    }

    /// Register argument sets given as raw JSON values
    ///
    /// Each value must be a mapping; anything else is a `Serialization`
    /// error naming the offending producer.
    pub fn register_values(
        &mut self,
        function_identity: impl Into<String>,
        argument_sets: Vec<Value>,
    ) -> IceboxResult<()> {
        let identity = function_identity.into();
        let mut maps = Vec::with_capacity(argument_sets.len());
        for value in argument_sets {
            match value {
                Value::Object(map) => maps.push(map),
                other => {
                    return Err(IceboxError::serialization(
                        &identity,
                        format!("argument set must be a mapping, got: {}", other),
                    ))
                }
            }
        }
        self.register(identity, maps);
        Ok(())
    }

    /// Iterate over every registered signature, duplicates included
    pub fn entries(&self) -> impl Iterator<Item = &CallSignature> {
        self.entries.iter()
    }

    /// Number of raw registrations (before deduplication)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether anything has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn arg_map(value: Value) -> ArgMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected mapping"),
        }
    }

    #[test]
    fn register_appends_per_argument_set() {
        let mut ledger = RegistrationLedger::new();
        ledger.register(
            "load_table",
            vec![
                arg_map(json!({"year": 2020})),
                arg_map(json!({"year": 2021})),
            ],
        );

        assert_eq!(ledger.len(), 2);
        let identities: Vec<_> = ledger
            .entries()
            .map(|s| s.function_identity.as_str())
            .collect();
        assert_eq!(identities, vec!["load_table", "load_table"]);
    }

    #[test]
    fn register_keeps_duplicates() {
        // Two plugins declaring the same call both land in the ledger;
        // the builder collapses them by derived key.
        let mut ledger = RegistrationLedger::new();
        ledger.register("load_table", vec![arg_map(json!({"year": 2020}))]);
        ledger.register("load_table", vec![arg_map(json!({"year": 2020}))]);

        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn register_values_accepts_mappings() {
        let mut ledger = RegistrationLedger::new();
        ledger
            .register_values("load_csv", vec![json!({"path": "a.csv"})])
            .unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn register_values_rejects_non_mapping() {
        let mut ledger = RegistrationLedger::new();
        let err = ledger
            .register_values("load_csv", vec![json!(["not", "a", "mapping"])])
            .unwrap_err();

        assert!(matches!(err, IceboxError::Serialization { .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn empty_ledger() {
        let ledger = RegistrationLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.entries().count(), 0);
    }
}
