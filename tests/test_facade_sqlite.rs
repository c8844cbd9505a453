//! Façade behaviour end to end against an in-memory sqlite engine.

use model_store::domain::condition::TranslationError;
use model_store::{
    Condition, Database, FieldDescriptor, FieldSchema, FieldType, FindOptions, IndexSpec,
    OperatorFilters, OrderBy, RawQueryOptions, Record, StoreConfig, StoreError, TableOptions,
};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

async fn memory_db() -> Database {
    Database::open(&StoreConfig::in_memory())
        .await
        .expect("open in-memory database")
}

fn user_fields() -> FieldSchema {
    let mut fields = FieldSchema::new();
    fields.insert(
        "name".to_string(),
        FieldDescriptor::new(FieldType::String).not_null(),
    );
    fields.insert(
        "email".to_string(),
        FieldDescriptor::new(FieldType::String).unique(),
    );
    fields.insert("age".to_string(), FieldDescriptor::new(FieldType::Integer));
    fields.insert(
        "active".to_string(),
        FieldDescriptor::new(FieldType::Boolean).default_value(json!(true)),
    );
    fields
}

fn record(value: JsonValue) -> Record {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

async fn users_db() -> Database {
    let db = memory_db().await;
    db.define("users", user_fields(), TableOptions::default())
        .await
        .expect("define users");
    db
}

#[tokio::test]
async fn insert_fills_system_fields_and_defaults() {
    let db = users_db().await;

    let stored = db
        .insert(
            "users",
            record(json!({ "name": "Alice", "email": "alice@example.com", "age": 30 })),
        )
        .await
        .unwrap();

    let id = stored["id"].as_i64().expect("integer id");
    assert!(id >= 1);
    assert!(stored["createdAt"].is_string());
    assert!(stored["updatedAt"].is_string());
    assert_eq!(stored["createdAt"], stored["updatedAt"]);
    assert_eq!(stored["active"], json!(true));

    let found = db.find_by_id("users", id).await.unwrap().expect("row by id");
    assert_eq!(found["name"], json!("Alice"));
    assert_eq!(found["age"], json!(30));
    assert_eq!(found["createdAt"], stored["createdAt"]);
    assert_eq!(found["updatedAt"], stored["updatedAt"]);

    assert!(db.find_by_id("users", id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn define_is_idempotent() {
    let db = memory_db().await;

    let first = db
        .define("users", user_fields(), TableOptions::default())
        .await
        .unwrap();

    // Different fields on the second call are ignored.
    let mut other = FieldSchema::new();
    other.insert("nickname".to_string(), FieldDescriptor::new(FieldType::Text));
    let second = db.define("users", other, TableOptions::default()).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(db.list_tables().await, vec!["users".to_string()]);
    let description = db.describe("users").await.unwrap();
    assert!(description.attributes.contains_key("email"));
    assert!(!description.attributes.contains_key("nickname"));
}

#[tokio::test]
async fn caller_fields_override_system_fields() {
    let db = memory_db().await;

    let mut fields = FieldSchema::new();
    fields.insert(
        "id".to_string(),
        FieldDescriptor::new(FieldType::Uuid).primary_key(),
    );
    fields.insert("label".to_string(), FieldDescriptor::new(FieldType::String));

    let handle = db
        .define("Tokens", fields, TableOptions::default())
        .await
        .unwrap();
    assert_eq!(handle.storage_name(), "tokens");

    let attributes: Vec<&String> = handle.definition().fields().keys().collect();
    assert_eq!(attributes, ["id", "createdAt", "updatedAt", "label"]);
    assert_eq!(handle.definition().fields()["id"].field_type, FieldType::Uuid);

    let uuid = "7f1f7c3e-8f0a-4c1e-9d4e-3a6b2c1d0e9f";
    db.insert("Tokens", record(json!({ "id": uuid, "label": "a" })))
        .await
        .unwrap();

    let found = db
        .find_one("Tokens", &Condition::exact([("id", uuid)]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found["label"], json!("a"));
}

#[tokio::test]
async fn paginated_search_reports_page_metadata() {
    let db = users_db().await;
    let rows: Vec<Record> = (1..=25)
        .map(|i| {
            record(json!({
                "name": format!("user{:02}", i),
                "email": format!("user{}@example.com", i),
                "age": 20 + i,
            }))
        })
        .collect();
    assert_eq!(db.insert_many("users", rows).await.unwrap().len(), 25);

    let page = db
        .search_paginated("users", &Condition::all(), 2, 10)
        .await
        .unwrap();
    assert_eq!(page.data.len(), 10);
    assert_eq!((page.total, page.page, page.pages, page.has_more), (25, 2, 3, true));
    assert_eq!(page.data[0]["name"], json!("user11"));

    let last = db
        .search_paginated("users", &Condition::all(), 3, 10)
        .await
        .unwrap();
    assert_eq!(last.data.len(), 5);
    assert!(!last.has_more);

    let past_end = db
        .search_paginated("users", &Condition::all(), 4, 10)
        .await
        .unwrap();
    assert!(past_end.data.is_empty());
    assert_eq!(past_end.total, 25);

    let filtered = db
        .search_paginated(
            "users",
            &Condition::from(OperatorFilters::new().op("age", "gt", 40)),
            1,
            10,
        )
        .await
        .unwrap();
    assert_eq!((filtered.total, filtered.pages), (5, 1));
}

#[tokio::test]
async fn far_pages_are_empty_or_rejected() {
    let db = users_db().await;
    for i in 0..3 {
        db.insert(
            "users",
            record(json!({ "name": format!("u{}", i), "email": format!("u{}@x.io", i) })),
        )
        .await
        .unwrap();
    }

    let far = db
        .search_paginated("users", &Condition::all(), 1_000_000_000_000, 1000)
        .await
        .unwrap();
    assert!(far.data.is_empty());
    assert_eq!((far.total, far.pages, far.has_more), (3, 1, false));

    for (page, page_size) in [(1_000_000_000_000_000_000, 10), (i64::MAX, i64::MAX)] {
        let err = db
            .search_paginated("users", &Condition::all(), page, page_size)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Translation(TranslationError::InvalidPage { name: "page", .. })
        ));
    }
}

#[tokio::test]
async fn invalid_page_parameters_are_rejected() {
    let db = users_db().await;

    let err = db
        .search_paginated("users", &Condition::all(), 0, 10)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Translation(TranslationError::InvalidPage { name: "page", .. })
    ));

    let err = db
        .search_paginated("users", &Condition::all(), 1, 0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Translation(TranslationError::InvalidPage { name: "page_size", .. })
    ));
}

#[tokio::test]
async fn update_moves_updated_at_past_created_at() {
    let db = users_db().await;
    let stored = db
        .insert(
            "users",
            record(json!({ "name": "Ann", "email": "ann@x.io", "age": 17 })),
        )
        .await
        .unwrap();
    let id = stored["id"].as_i64().expect("integer id");

    // Timestamps carry millisecond precision.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    db.update(
        "users",
        record(json!({ "age": 18 })),
        &Condition::exact([("id", id)]),
    )
    .await
    .unwrap();

    let found = db.find_by_id("users", id).await.unwrap().expect("row by id");
    let created = found["createdAt"].as_str().expect("createdAt");
    let updated = found["updatedAt"].as_str().expect("updatedAt");
    assert_eq!(created, stored["createdAt"].as_str().expect("createdAt"));
    assert!(updated > created, "{} should be after {}", updated, created);
}

#[tokio::test]
async fn update_and_delete_report_affected_rows() {
    let db = users_db().await;
    for (name, age) in [("Ann", 17), ("Bob", 25), ("Cid", 40)] {
        db.insert(
            "users",
            record(json!({ "name": name, "email": format!("{}@x.io", name), "age": age })),
        )
        .await
        .unwrap();
    }

    let adults = Condition::from(OperatorFilters::new().op("age", "gte", 18));
    let updated = db
        .update("users", record(json!({ "active": false })), &adults)
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let inactive = db
        .find("users", &Condition::exact([("active", false)]))
        .await
        .unwrap();
    assert_eq!(inactive.len(), 2);
    assert!(inactive.iter().all(|r| r["updatedAt"].is_string()));

    let none = db
        .update(
            "users",
            record(json!({ "age": 99 })),
            &Condition::exact([("name", "Nobody")]),
        )
        .await
        .unwrap();
    assert_eq!(none, 0);

    let deleted = db
        .delete("users", &Condition::exact([("name", "Ann")]))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(db.count("users", &Condition::all()).await.unwrap(), 2);
}

#[tokio::test]
async fn search_entry_points_agree() {
    let db = users_db().await;
    for (name, age) in [("Alice Smith", 30), ("ALICIA Keys", 45), ("Bob", 30)] {
        db.insert(
            "users",
            record(json!({
                "name": name,
                "email": format!("{}@x.io", age + name.len() as i64),
                "age": age
            })),
        )
        .await
        .unwrap();
    }

    let text = db.search_text("users", "name", "ali").await.unwrap();
    assert_eq!(text.len(), 2);

    let mut values = indexmap::IndexMap::new();
    values.insert("age".to_string(), json!(30));
    let exact = db.search("users", values).await.unwrap();
    assert_eq!(exact.len(), 2);

    let advanced = db
        .search_advanced(
            "users",
            OperatorFilters::new()
                .op("age", "between", json!([40, 50]))
                .op("name", "like", "%Keys"),
        )
        .await
        .unwrap();
    assert_eq!(advanced.len(), 1);
    assert_eq!(advanced[0]["name"], json!("ALICIA Keys"));

    let in_set = db
        .search_advanced(
            "users",
            OperatorFilters::new().op("name", "in", json!(["Bob", "Nobody"])),
        )
        .await
        .unwrap();
    assert_eq!(in_set.len(), 1);
}

#[tokio::test]
async fn find_with_orders_and_limits() {
    let db = users_db().await;
    for (name, age) in [("a", 3), ("b", 1), ("c", 2)] {
        db.insert(
            "users",
            record(json!({ "name": name, "email": format!("{}@x.io", name), "age": age })),
        )
        .await
        .unwrap();
    }

    let options = FindOptions {
        order: vec![OrderBy::desc("age")],
        limit: Some(2),
    };
    let rows = db
        .find_with("users", &Condition::all(), &options)
        .await
        .unwrap();
    let names: Vec<&JsonValue> = rows.iter().map(|r| &r["name"]).collect();
    assert_eq!(names, [&json!("a"), &json!("c")]);
}

#[tokio::test]
async fn search_fields_projects_columns() {
    let db = users_db().await;
    db.insert(
        "users",
        record(json!({ "name": "Alice", "email": "alice@example.com", "age": 30 })),
    )
    .await
    .unwrap();

    let rows = db
        .search_fields(
            "users",
            &Condition::all(),
            &["name".to_string(), "age".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let keys: Vec<&String> = rows[0].keys().collect();
    assert_eq!(keys.len(), 2);
    assert!(rows[0].contains_key("name") && rows[0].contains_key("age"));
}

#[tokio::test]
async fn translation_errors_surface_before_the_engine() {
    let db = users_db().await;

    let err = db
        .find(
            "users",
            &Condition::from(OperatorFilters::new().op("age", "approx", 3)),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Translation(TranslationError::UnknownOperator { .. })
    ));

    let err = db
        .count(
            "users",
            &Condition::from(OperatorFilters::new().op("age", "between", json!([1]))),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Translation(TranslationError::BetweenArity { got: 1, .. })
    ));

    let err = db
        .find("users", &Condition::exact([("age; DROP TABLE users", 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Translation(TranslationError::InvalidField(_))
    ));
}

#[tokio::test]
async fn unknown_table_is_reported_by_every_operation() {
    let db = memory_db().await;

    assert!(matches!(
        db.insert("ghosts", Record::new()).await,
        Err(StoreError::TableNotRegistered(ref t)) if t == "ghosts"
    ));
    assert!(matches!(
        db.find("ghosts", &Condition::all()).await,
        Err(StoreError::TableNotRegistered(_))
    ));
    assert!(matches!(
        db.count("ghosts", &Condition::all()).await,
        Err(StoreError::TableNotRegistered(_))
    ));
    assert!(matches!(
        db.search_paginated("ghosts", &Condition::all(), 1, 10).await,
        Err(StoreError::TableNotRegistered(_))
    ));
    assert!(db.describe("ghosts").await.is_none());
}

#[tokio::test]
async fn insert_many_is_all_or_nothing() {
    let db = users_db().await;

    assert!(db.insert_many("users", Vec::new()).await.unwrap().is_empty());

    let batch = vec![
        record(json!({ "name": "A", "email": "dup@example.com" })),
        record(json!({ "name": "B", "email": "dup@example.com" })),
    ];
    let err = db.insert_many("users", batch).await.unwrap_err();
    assert!(matches!(err, StoreError::Engine(_)));
    assert_eq!(db.count("users", &Condition::all()).await.unwrap(), 0);
}

#[tokio::test]
async fn unique_index_option_is_enforced() {
    let db = memory_db().await;
    let mut fields = FieldSchema::new();
    fields.insert("sku".to_string(), FieldDescriptor::new(FieldType::String));
    fields.insert("region".to_string(), FieldDescriptor::new(FieldType::String));
    let options = TableOptions {
        storage_name: Some("Product_Catalog".to_string()),
        indexes: vec![IndexSpec {
            fields: vec!["sku".to_string(), "region".to_string()],
            unique: true,
        }],
    };
    let handle = db.define("products", fields, options).await.unwrap();
    assert_eq!(handle.storage_name(), "product_catalog");

    db.insert("products", record(json!({ "sku": "X1", "region": "eu" })))
        .await
        .unwrap();
    db.insert("products", record(json!({ "sku": "X1", "region": "us" })))
        .await
        .unwrap();
    assert!(db
        .insert("products", record(json!({ "sku": "X1", "region": "eu" })))
        .await
        .is_err());
}

#[tokio::test]
async fn json_fields_round_trip_as_structured_values() {
    let db = memory_db().await;
    let mut fields = FieldSchema::new();
    fields.insert("payload".to_string(), FieldDescriptor::new(FieldType::Json));
    db.define("events", fields, TableOptions::default())
        .await
        .unwrap();

    let stored = db
        .insert(
            "events",
            record(json!({ "payload": { "kind": "click", "x": [1, 2] } })),
        )
        .await
        .unwrap();
    assert_eq!(stored["payload"], json!({ "kind": "click", "x": [1, 2] }));
}

#[tokio::test]
async fn json_fields_match_the_values_they_were_written_with() {
    let db = memory_db().await;
    let mut fields = FieldSchema::new();
    fields.insert("payload".to_string(), FieldDescriptor::new(FieldType::Json));
    db.define("events", fields, TableOptions::default())
        .await
        .unwrap();

    let payloads = [json!("abc"), json!({ "a": 1 }), json!(5)];
    for payload in &payloads {
        db.insert("events", record(json!({ "payload": payload })))
            .await
            .unwrap();
    }

    for payload in &payloads {
        let matching = Condition::exact([("payload", payload.clone())]);
        assert_eq!(db.count("events", &matching).await.unwrap(), 1, "{}", payload);
        let found = db.find_one("events", &matching).await.unwrap().expect("row");
        assert_eq!(&found["payload"], payload);
    }

    let either = Condition::from(OperatorFilters::new().op("payload", "in", json!(["abc", 5])));
    assert_eq!(db.count("events", &either).await.unwrap(), 2);

    let others = Condition::from(OperatorFilters::new().op("payload", "ne", "abc"));
    assert_eq!(db.count("events", &others).await.unwrap(), 2);
}

#[tokio::test]
async fn raw_query_passes_through() {
    let db = users_db().await;
    for name in ["a", "b", "c"] {
        db.insert(
            "users",
            record(json!({ "name": name, "email": format!("{}@x.io", name), "age": 20 })),
        )
        .await
        .unwrap();
    }

    let result = db
        .query(
            "SELECT COUNT(*) AS n FROM users WHERE age = ?",
            &RawQueryOptions {
                params: vec![json!(20)],
            },
        )
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0]["n"], json!(3));

    let result = db
        .query(
            "UPDATE users SET age = 21 WHERE name = ?",
            &RawQueryOptions {
                params: vec![json!("a")],
            },
        )
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_insert_id, None);

    let result = db
        .query("DELETE FROM users WHERE name = 'b'", &RawQueryOptions::default())
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_insert_id, None);

    let result = db
        .query(
            "INSERT INTO users (name, email, age) VALUES (?, ?, ?)",
            &RawQueryOptions {
                params: vec![json!("d"), json!("d@x.io"), json!(22)],
            },
        )
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.last_insert_id, Some(4));

    assert!(db
        .query("SELEKT nonsense", &RawQueryOptions::default())
        .await
        .is_err());
}
