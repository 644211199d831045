//! Concurrency Tests
//!
//! The connector is shared across tasks on a multi-threaded runtime.

use crate::*;
use serde_json::Value;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_across_collections() {
    let (connector, driver) = create_connector().await;
    let connector = Arc::new(connector);

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let connector = Arc::clone(&connector);
            tokio::spawn(async move {
                let key = format!("coll{}/doc{}", i % 4, i);
                connector.set(&key, i, &json!({"i": i})).await?;
                connector.get(&key).await
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let versioned = task.await.unwrap().unwrap();
        assert_eq!(versioned.version, i as i64);
        assert_eq!(versioned.value, Some(json!({"i": i})));
    }

    let db = database(&driver);
    assert_eq!(db.collection_names().len(), 4);
    assert_eq!(db.open_count(), 4);
    for c in 0..4 {
        assert_eq!(collection(&driver, &format!("coll{}", c)).len(), 16);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_to_one_key_leave_one_document() {
    let (connector, driver) = create_connector().await;
    let connector = Arc::new(connector);

    let tasks: Vec<_> = (1..=32)
        .map(|version| {
            let connector = Arc::clone(&connector);
            tokio::spawn(async move {
                connector
                    .set("user/shared", version, &json!({"v": version}))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(collection(&driver, "user").len(), 1);

    // Last write wins: the stored version and value come from the same write.
    let versioned = connector.get("user/shared").await.unwrap();
    let value = versioned.value.unwrap();
    assert_eq!(value["v"], Value::from(versioned.version));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_delete_bulk() {
    let (connector, driver) = create_connector().await;

    let keys: Vec<String> = (0..50).map(|i| format!("bulk/{}", i)).collect();
    for key in &keys {
        connector.set(key, 1, &json!({})).await.unwrap();
    }
    assert_eq!(collection(&driver, "bulk").len(), 50);

    connector.delete_bulk(&keys).await.unwrap();
    assert!(collection(&driver, "bulk").is_empty());
}
