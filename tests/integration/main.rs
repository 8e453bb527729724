//! Integration tests for Icebox

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn icebox() -> Command {
        cargo_bin_cmd!("icebox")
    }

    #[test]
    fn help_displays() {
        icebox()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("freeze store"));
    }

    #[test]
    fn version_displays() {
        icebox()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("icebox"));
    }

    #[test]
    fn build_writes_store_and_manifest() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("frozen_store");

        icebox()
            .args(["build", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("froze 0 artifact(s)"));

        assert!(root.join("manifest.json").is_file());
    }

    #[test]
    fn list_empty_store() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("frozen_store");

        icebox().args(["build", "--root"]).arg(&root).assert().success();

        icebox()
            .args(["list", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("holds no artifacts"));
    }

    #[test]
    fn list_without_store_fails() {
        let dir = TempDir::new().unwrap();

        icebox()
            .args(["list", "--root"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid store manifest"));
    }

    #[test]
    fn verify_built_store() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("frozen_store");

        icebox().args(["build", "--root"]).arg(&root).assert().success();

        icebox()
            .args(["verify", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("verified 0 artifact(s)"));
    }

    #[test]
    fn get_unregistered_signature_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("frozen_store");

        icebox().args(["build", "--root"]).arg(&root).assert().success();

        icebox()
            .args(["get", "load_table", "--arg", "year=2020", "--root"])
            .arg(&root)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No artifact"));
    }

    #[test]
    fn config_drives_json_logging() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[general]\nverbose = true\nlog_format = \"json\"\n",
        )
        .unwrap();

        let root = dir.path().join("frozen_store");

        // verbose = true floors the level at info without any -v flag, and
        // log_format = "json" switches the subscriber to JSON lines
        icebox()
            .arg("--config")
            .arg(&config_path)
            .args(["build", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""level":"INFO""#));
    }

    #[test]
    fn config_show() {
        icebox()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[store]"));
    }

    #[test]
    fn config_path() {
        icebox()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }
}

mod store_tests {
    use icebox::plugin::{App, DashboardPlugin, FrozenCall, FrozenDataRequirements};
    use icebox::store::{ArgMap, Payload, StoreBuilder, StoreReader};
    use icebox::IceboxResult;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn arg_map(value: Value) -> ArgMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected mapping"),
        }
    }

    struct YearlyTablePlugin;

    impl FrozenDataRequirements for YearlyTablePlugin {
        fn frozen_calls(&self) -> Vec<FrozenCall> {
            vec![FrozenCall::new(
                "load_table",
                vec![
                    arg_map(json!({"year": 2020})),
                    arg_map(json!({"year": 2021})),
                ],
            )]
        }
    }

    impl DashboardPlugin for YearlyTablePlugin {
        fn name(&self) -> &str {
            "yearly-table"
        }

        fn frozen_data(&self) -> Option<&dyn FrozenDataRequirements> {
            Some(self)
        }
    }

    fn table_for(year: &Value) -> Value {
        json!({"columns": ["month", "total"], "rows": [[1, 10], [2, 20]], "year": year})
    }

    #[test]
    fn portable_build_then_runtime_lookup() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        // Build step: two plugins declare the same data, the producer
        // runs once per distinct signature.
        let counter = calls.clone();
        let mut app = App::new()
            .with_plugin(YearlyTablePlugin)
            .with_plugin(YearlyTablePlugin);
        app.producers_mut().register(
            "load_table",
            move |args: &ArgMap| -> IceboxResult<Payload> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Payload::Json(table_for(&args["year"])))
            },
        );

        let ledger = app.collect_registrations().unwrap();
        assert_eq!(ledger.len(), 4); // raw registrations, pre-dedup

        let report = StoreBuilder::new(app.producers())
            .build(&ledger, dir.path())
            .unwrap();

        assert_eq!(report.artifacts, 2);
        assert_eq!(report.duplicates_collapsed, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Runtime step: lookups resolve the frozen artifacts without
        // invoking the producer again.
        let reader = StoreReader::open(dir.path()).unwrap();
        let payload = reader
            .lookup("load_table", arg_map(json!({"year": 2020})))
            .unwrap();

        assert_eq!(payload.as_json().unwrap(), &table_for(&json!(2020)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn producer_failure_fails_whole_build() {
        let dir = TempDir::new().unwrap();

        let mut app = App::new().with_plugin(YearlyTablePlugin);
        app.producers_mut()
            .register("load_table", |args: &ArgMap| -> IceboxResult<Payload> {
                if args["year"] == json!(2021) {
                    Err(icebox::IceboxError::Internal(
                        "2021 source offline".to_string(),
                    ))
                } else {
                    Ok(Payload::Json(json!({})))
                }
            });

        let ledger = app.collect_registrations().unwrap();
        let err = StoreBuilder::new(app.producers())
            .build(&ledger, dir.path())
            .unwrap_err();

        assert!(err.to_string().contains("load_table"));
        // The failed build left no usable store behind
        assert!(StoreReader::open(dir.path()).is_err());
    }

    #[test]
    fn rebuild_leaves_store_byte_identical() {
        let dir = TempDir::new().unwrap();

        let mut app = App::new().with_plugin(YearlyTablePlugin);
        app.producers_mut().register(
            "load_table",
            |args: &ArgMap| -> IceboxResult<Payload> {
                Ok(Payload::Json(table_for(&args["year"])))
            },
        );

        let ledger = app.collect_registrations().unwrap();
        let builder = StoreBuilder::new(app.producers());

        builder.build(&ledger, dir.path()).unwrap();
        let first = snapshot(dir.path());

        let ledger = app.collect_registrations().unwrap();
        builder.build(&ledger, dir.path()).unwrap();
        let second = snapshot(dir.path());

        assert_eq!(first, second);
    }

    fn snapshot(root: &std::path::Path) -> std::collections::BTreeMap<String, Vec<u8>> {
        let mut files = std::collections::BTreeMap::new();
        for entry in std::fs::read_dir(root).unwrap() {
            let entry = entry.unwrap();
            files.insert(
                entry.file_name().to_string_lossy().to_string(),
                std::fs::read(entry.path()).unwrap(),
            );
        }
        files
    }
}
