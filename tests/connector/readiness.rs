//! Readiness Tests
//!
//! Operations issued before the connection is up wait for it; a failed
//! connection rejects every operation.

use crate::*;
use std::time::Duration;

#[tokio::test]
async fn test_operations_wait_for_connection() {
    init_tracing();
    let driver = MemoryDriver::gated();
    let connector = Arc::new(Connector::new(test_config(), driver.clone()).unwrap());
    assert!(!connector.is_ready());

    let pending = {
        let connector = Arc::clone(&connector);
        tokio::spawn(async move {
            connector.set("user/a", 1, &json!({"early": true})).await?;
            connector.get("user/a").await
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!pending.is_finished());
    assert!(!connector.is_ready());

    driver.open_gate();
    let versioned = pending.await.unwrap().unwrap();
    assert_eq!(versioned.version, 1);
    assert_eq!(versioned.value, Some(json!({"early": true})));
    assert!(connector.is_ready());
}

#[tokio::test]
async fn test_concurrent_waiters_share_one_connect() {
    init_tracing();
    let driver = MemoryDriver::gated();
    let connector = Arc::new(Connector::new(test_config(), driver.clone()).unwrap());

    let waiters: Vec<_> = (0..8)
        .map(|i| {
            let connector = Arc::clone(&connector);
            tokio::spawn(async move { connector.get(&format!("user/{}", i)).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    driver.open_gate();

    for waiter in waiters {
        assert!(!waiter.await.unwrap().unwrap().is_found());
    }
    assert_eq!(driver.connect_count(), 1);
}

#[tokio::test]
async fn test_failed_connection_rejects_all_operations() {
    init_tracing();
    let driver = MemoryDriver::new();
    driver.set_offline(true);
    let connector = Connector::new(test_config(), driver.clone()).unwrap();

    assert!(matches!(connector.when_ready().await, Err(Error::NotReady(_))));
    assert!(matches!(
        connector.set("user/a", 1, &json!({})).await,
        Err(Error::NotReady(_))
    ));
    assert!(matches!(connector.get("user/a").await, Err(Error::NotReady(_))));
    assert!(matches!(connector.delete("user/a").await, Err(Error::NotReady(_))));

    // Not retried once failed
    driver.set_offline(false);
    assert!(matches!(connector.get("user/a").await, Err(Error::NotReady(_))));
    assert_eq!(driver.connect_count(), 1);
    assert!(!connector.is_ready());
}

#[tokio::test]
async fn test_open_reports_connect_failure() {
    init_tracing();
    let driver = MemoryDriver::new();
    driver.set_offline(true);

    let err = Connector::open(test_config(), driver).await.err().unwrap();
    assert!(matches!(err, Error::NotReady(_)));
    assert!(err.to_string().contains("offline"));
}

#[tokio::test]
async fn test_builder_open_with_memory_driver() {
    init_tracing();
    let driver = MemoryDriver::new();
    let connector = Connector::builder()
        .connection_string("memory://127.0.0.1")
        .database("deepstream")
        .split_char('/')
        .driver(driver.clone())
        .open()
        .await
        .unwrap();

    assert!(connector.is_ready());
    connector.set("user/a", 1, &json!({})).await.unwrap();
    assert_eq!(collection(&driver, "user").len(), 1);
}

#[test]
fn test_missing_connection_string_is_configuration_error() {
    let err = Connector::new(ConnectorConfig::default(), MemoryDriver::new())
        .err()
        .unwrap();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("connectionString"));
}

#[tokio::test]
async fn test_construction_starts_connecting() {
    init_tracing();
    let driver = MemoryDriver::new();
    let connector = Connector::new(test_config(), driver.clone()).unwrap();

    // No operation issued: readiness comes from the background connect.
    for _ in 0..100 {
        if connector.is_ready() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert!(connector.is_ready());
    assert_eq!(driver.connect_count(), 1);
}
