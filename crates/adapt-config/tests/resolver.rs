//! Tests for schema resolution ordering, classification, and failure aggregation.

use adapt_config::{
    ConfigError, ConfigStore, ModuleDescriptor, SchemaResolver, SetOptions, ViolationKind,
    schema::ResolverOptions,
};
use adapt_config_test_utils::{FailingValidator, ModuleFixture, RecordingValidator};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;

fn simple_schema(attribute: &str, default: Value) -> Value {
    json!({ "properties": { attribute: { "default": default } } })
}

/// One module failing does not stop the others from resolving.
#[tokio::test]
async fn failing_module_does_not_block_others() {
    let fixture = ModuleFixture::new();
    let modules = vec![
        fixture.module("alpha", simple_schema("a", json!(1))),
        fixture.module("beta", simple_schema("b", json!(2))),
        fixture.module("gamma", simple_schema("c", json!(3))),
    ];
    let store = Arc::new(ConfigStore::new());
    let validator = FailingValidator::new()
        .failing("alpha", "a")
        .failing("gamma", "c");
    let err = SchemaResolver::new(store.clone(), Arc::new(validator))
        .resolve(&modules)
        .await
        .unwrap_err();

    let ConfigError::Resolution(failure) = err else {
        panic!("expected resolution failure, got {err}");
    };
    assert_eq!(failure.modules(), vec!["alpha", "gamma"]);
    assert_eq!(store.get("beta.b"), Some(json!(2)));
    assert_eq!(store.get("alpha.a"), None);
    let msg = failure.to_string();
    assert!(msg.contains("alpha.a"));
    assert!(msg.contains("gamma.c"));
}

/// Every module's type and required errors appear in one aggregate report.
#[tokio::test]
async fn aggregate_lists_every_module_and_attribute() {
    let fixture = ModuleFixture::new();
    let modules = vec![
        fixture.module(
            "server",
            json!({ "properties": { "port": { "type": "number" } } }),
        ),
        fixture.module(
            "auth",
            json!({
                "required": ["secret"],
                "properties": { "secret": { "type": "string" } }
            }),
        ),
    ];
    let store = Arc::new(ConfigStore::new());
    store.set("server.port", json!("eighty"), SetOptions::default());
    let err = SchemaResolver::new(
        store,
        Arc::new(adapt_config::JsonSchemaValidator::new()),
    )
    .resolve(&modules)
    .await
    .unwrap_err();

    let ConfigError::Resolution(failure) = err else {
        panic!("expected resolution failure, got {err}");
    };
    assert_eq!(failure.modules(), vec!["server", "auth"]);
    let server = failure.for_module("server").expect("server");
    assert_eq!(server.violations[0].kind, ViolationKind::TypeMismatch);
    let auth = failure.for_module("auth").expect("auth");
    assert_eq!(auth.violations[0].kind, ViolationKind::MissingRequired);
}

/// Classification is recorded even when the module fails validation.
#[tokio::test]
async fn classification_survives_validation_failure() {
    let fixture = ModuleFixture::new();
    let module = fixture.module(
        "ui",
        json!({
            "properties": {
                "theme": { "type": "string", "isPublic": true, "isMutable": true }
            }
        }),
    );
    let store = Arc::new(ConfigStore::new());
    let validator = FailingValidator::new().failing("ui", "theme");
    let result = SchemaResolver::new(store.clone(), Arc::new(validator))
        .resolve(&[module])
        .await;
    assert!(result.is_err());
    assert!(store.is_public("ui.theme"));
    assert!(store.is_mutable("ui.theme"));
}

/// The core module is validated before any other module.
#[tokio::test]
async fn core_module_resolves_first() {
    let fixture = ModuleFixture::new();
    let mut modules = Vec::new();
    for name in ["one", "two", "three", "four"] {
        modules.push(fixture.module(name, simple_schema("x", json!(name))));
    }
    modules.push(fixture.module("core", simple_schema("x", json!("core"))));

    let store = Arc::new(ConfigStore::new());
    let recorder = RecordingValidator::default();
    let report = SchemaResolver::new(store.clone(), Arc::new(recorder.clone()))
        .with_options(ResolverOptions {
            core_module: Some("core".to_string()),
            root_dir: None,
        })
        .resolve(&modules)
        .await
        .expect("resolve");

    let seen = recorder.modules();
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0], "core");
    assert_eq!(
        report.processed,
        vec!["core", "one", "two", "three", "four"]
    );
    for name in ["core", "one", "two", "three", "four"] {
        assert_eq!(store.get(&format!("{name}.x")), Some(json!(name)));
    }
}

/// `$DATA` expands from the core module's resolved data directory.
#[tokio::test]
async fn data_token_uses_core_module_value() {
    let fixture = ModuleFixture::new();
    let modules = vec![
        fixture.module(
            "uploads",
            json!({
                "properties": {
                    "dir": { "type": "string", "isDirectory": true, "default": "$DATA/uploads" }
                }
            }),
        ),
        fixture.module(
            "core",
            json!({
                "properties": {
                    "dataDir": { "type": "string", "isDirectory": true, "default": "$ROOT/data" }
                }
            }),
        ),
    ];
    let store = Arc::new(ConfigStore::new());
    let root = fixture.root().to_path_buf();
    SchemaResolver::new(
        store.clone(),
        Arc::new(adapt_config::JsonSchemaValidator::new()),
    )
    .with_options(ResolverOptions {
        core_module: Some("core".to_string()),
        root_dir: Some(root.clone()),
    })
    .resolve(&modules)
    .await
    .expect("resolve");

    let data_dir = root.join("data");
    assert_eq!(
        store.get("core.dataDir"),
        Some(json!(data_dir.to_string_lossy()))
    );
    assert_eq!(
        store.get("uploads.dir"),
        Some(json!(data_dir.join("uploads").to_string_lossy()))
    );
}

/// Candidates only carry values that are already in the store.
#[tokio::test]
async fn candidate_contains_only_present_values() {
    let fixture = ModuleFixture::new();
    let module = fixture.module(
        "mail",
        json!({
            "properties": {
                "host": { "type": "string" },
                "port": { "type": "number", "default": 25 }
            }
        }),
    );
    let store = Arc::new(ConfigStore::new());
    store.set("mail.host", json!("smtp.local"), SetOptions::default());
    store.set("other.host", json!("ignored"), SetOptions::default());
    let recorder = RecordingValidator::default();
    SchemaResolver::new(store.clone(), Arc::new(recorder.clone()))
        .resolve(&[module])
        .await
        .expect("resolve");

    let candidate = recorder.candidate("mail").expect("candidate");
    assert_eq!(Value::Object(candidate), json!({ "host": "smtp.local" }));
    assert_eq!(store.get("mail.port"), Some(json!(25)));
}

/// Validated values overwrite earlier immutable values.
#[tokio::test]
async fn validated_values_are_written_with_force() {
    let fixture = ModuleFixture::new();
    let module = fixture.module(
        "paths",
        json!({
            "properties": {
                "dir": { "type": "string", "isDirectory": true }
            }
        }),
    );
    let store = Arc::new(ConfigStore::new());
    store.set("paths.dir", json!("$ROOT/files"), SetOptions::default());
    SchemaResolver::new(
        store.clone(),
        Arc::new(adapt_config::JsonSchemaValidator::new()),
    )
    .with_options(ResolverOptions {
        core_module: None,
        root_dir: Some("/srv/app".into()),
    })
    .resolve(&[module])
    .await
    .expect("resolve");

    let expected = std::path::PathBuf::from("/srv/app").join("files");
    assert_eq!(
        store.get("paths.dir"),
        Some(json!(expected.to_string_lossy()))
    );
}

/// Modules without schema files are skipped, not failed.
#[tokio::test]
async fn modules_without_schema_are_skipped() {
    let fixture = ModuleFixture::new();
    let modules = vec![
        fixture.bare_module("plain"),
        fixture.module("configured", simple_schema("a", json!(true))),
    ];
    let report = SchemaResolver::new(
        Arc::new(ConfigStore::new()),
        Arc::new(adapt_config::JsonSchemaValidator::new()),
    )
    .resolve(&modules)
    .await
    .expect("resolve");
    assert_eq!(report.skipped, vec!["plain"]);
    assert_eq!(report.processed, vec!["configured"]);
}

/// A malformed schema aborts before any module is validated.
#[tokio::test]
async fn malformed_schema_aborts_resolution() {
    let fixture = ModuleFixture::new();
    let modules = vec![
        fixture.module("good", simple_schema("a", json!(1))),
        fixture.module_raw("bad", "{ not json"),
    ];
    let store = Arc::new(ConfigStore::new());
    let recorder = RecordingValidator::default();
    let err = SchemaResolver::new(store.clone(), Arc::new(recorder.clone()))
        .resolve(&modules)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::Syntax { .. }));
    assert!(recorder.modules().is_empty());
    assert!(store.is_empty());
}

/// Duplicate namespaces are a configuration error.
#[tokio::test]
async fn duplicate_modules_are_rejected() {
    let modules = vec![
        ModuleDescriptor::new("dup", "/a"),
        ModuleDescriptor::new("dup", "/b"),
    ];
    let err = SchemaResolver::new(
        Arc::new(ConfigStore::new()),
        Arc::new(adapt_config::JsonSchemaValidator::new()),
    )
    .resolve(&modules)
    .await
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateModule(ref name) if name == "dup"));
}
