//! Stored Layout Tests
//!
//! What the connector leaves in the database: the routing id, the version,
//! the list wrapper for arrays and the store-assigned `_id`.

use crate::*;

#[tokio::test]
async fn test_object_is_stored_flat_with_reserved_fields() {
    let (connector, driver) = create_connector().await;

    connector
        .set("user/i4vcg5j1", 10, &json!({"firstname": "Wolfram"}))
        .await
        .unwrap();

    let docs = collection(&driver, "user").documents();
    assert_eq!(docs.len(), 1);
    let doc = &docs[0];
    assert_eq!(doc["firstname"], json!("Wolfram"));
    assert_eq!(doc["ds_key"], json!("i4vcg5j1"));
    assert_eq!(doc["ds_version"], json!(10));
    assert!(doc.contains_key("_id"));
    assert_eq!(doc.len(), 4);
}

#[tokio::test]
async fn test_array_is_wrapped_in_list_field() {
    let (connector, driver) = create_connector().await;

    connector.set("list/n", 3, &json!([1, 2, 3])).await.unwrap();

    let doc = &collection(&driver, "list").documents()[0];
    assert_eq!(doc["ds_list"], json!([1, 2, 3]));
    assert_eq!(doc["ds_key"], json!("n"));
    assert_eq!(doc["ds_version"], json!(3));
}

#[tokio::test]
async fn test_rewrite_keeps_single_document() {
    let (connector, driver) = create_connector().await;

    for version in 1..=5 {
        connector
            .set("user/a", version, &json!({"v": version}))
            .await
            .unwrap();
    }

    let user = collection(&driver, "user");
    assert_eq!(user.len(), 1);
    assert_eq!(user.documents()[0]["ds_version"], json!(5));
}

#[tokio::test]
async fn test_internal_id_is_not_returned() {
    let (connector, driver) = create_connector().await;

    connector.set("user/a", 1, &json!({"n": 1})).await.unwrap();
    assert!(collection(&driver, "user").documents()[0].contains_key("_id"));

    let value = connector.get("user/a").await.unwrap().value.unwrap();
    assert!(value.get("_id").is_none());
    assert!(value.get("ds_key").is_none());
    assert!(value.get("ds_version").is_none());
}

#[tokio::test]
async fn test_caller_reserved_fields_are_shadowed() {
    let (connector, driver) = create_connector().await;

    connector
        .set(
            "user/a",
            4,
            &json!({"ds_key": "other", "ds_version": 99, "_id": "mine", "n": 1}),
        )
        .await
        .unwrap();

    let doc = &collection(&driver, "user").documents()[0];
    assert_eq!(doc["ds_key"], json!("a"));
    assert_eq!(doc["ds_version"], json!(4));
    assert_ne!(doc["_id"], json!("mine"));

    let versioned = connector.get("user/a").await.unwrap();
    assert_eq!(versioned.version, 4);
    assert_eq!(versioned.value, Some(json!({"n": 1})));
}

#[tokio::test]
async fn test_routing_index_requested_on_first_use() {
    let (connector, driver) = create_connector().await;

    connector.get("user/a").await.unwrap();
    connector.get("post/a").await.unwrap();
    settle().await;

    for name in ["user", "post"] {
        let coll = collection(&driver, name);
        assert_eq!(coll.indexes(), vec!["ds_key".to_string()]);
        assert_eq!(coll.index_request_count(), 1);
    }
}
