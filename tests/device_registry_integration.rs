//! Device registry integration tests
//!
//! Reconciliation and access control against the in-memory device store.

use std::sync::Arc;

use tokio_test::assert_ok;

use onesignal_bridge::auth::SessionContext;
use onesignal_bridge::config::{DatabaseConfig, PushConfig};
use onesignal_bridge::device::{create_device_store, Device, DeviceRegistry, DeviceStore, MemoryDeviceStore};

const APP: &str = "com.example.mobile";

fn device(id: i64, user_id: i64, platform: &str) -> Device {
    Device {
        id,
        user_id,
        app_id: APP.to_string(),
        platform: platform.to_string(),
        name: format!("device-{}", id),
        model: "model".to_string(),
        version: "17".to_string(),
        push_id: format!("token-{}", id),
    }
}

fn setup(devices: Vec<Device>) -> (Arc<MemoryDeviceStore>, DeviceRegistry) {
    let store = Arc::new(MemoryDeviceStore::new());
    for d in devices {
        store.register_device(d);
    }
    let registry = DeviceRegistry::new(store.clone(), PushConfig::default());
    (store, registry)
}

#[tokio::test]
async fn test_reconciliation_is_idempotent() {
    let (store, registry) = setup(vec![device(1, 10, "ios"), device(2, 10, "ios")]);
    let session = SessionContext::new(10);

    let first = assert_ok!(registry.get_user_devices(&session, APP, None).await);
    let second = assert_ok!(registry.get_user_devices(&session, APP, None).await);

    assert_eq!(first.len(), 2);
    assert_eq!(store.link_count(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_reconciliation_creates_one_link_per_device() {
    let (store, registry) = setup((1..=5).map(|id| device(id, 10, "ios")).collect());
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .get_user_devices(&SessionContext::new(10), APP, None)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(store.link_count(), 5);
    for result in &results {
        assert_eq!(result, &results[0]);
    }
}

#[tokio::test]
async fn test_only_push_capable_platforms_are_listed() {
    let (store, registry) = setup(vec![
        device(1, 10, "ios"),
        device(2, 10, "android"),
        device(3, 10, "IOS"),
    ]);

    let devices = registry
        .get_user_devices(&SessionContext::new(10), APP, None)
        .await
        .unwrap();

    let ids: Vec<i64> = devices.iter().map(|d| d.user_device_id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert!(store.link_for_device(2).is_none());
}

#[tokio::test]
async fn test_view_carries_link_id_and_hides_token() {
    let (store, registry) = setup(vec![device(7, 10, "ios")]);

    let devices = registry
        .get_user_devices(&SessionContext::new(10), APP, None)
        .await
        .unwrap();
    let link = store.link_for_device(7).unwrap();

    assert_eq!(devices[0].id, link.id);
    assert_eq!(devices[0].user_device_id, 7);
    assert!(devices[0].enabled);
    assert!(devices[0].push_id.is_empty());
}

#[tokio::test]
async fn test_explicit_user_and_other_app() {
    let (_store, registry) = setup(vec![device(1, 10, "ios"), device(2, 20, "ios")]);
    let session = SessionContext::new(10);

    let other = registry.get_user_devices(&session, APP, Some(20)).await.unwrap();
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].user_device_id, 2);

    let none = registry
        .get_user_devices(&session, "com.example.other", None)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_owner_can_toggle_device() {
    let (store, registry) = setup(vec![device(1, 10, "ios")]);
    let session = SessionContext::new(10);
    let link_id = registry.get_user_devices(&session, APP, None).await.unwrap()[0].id;

    assert!(registry.enable_device(&session, link_id, false).await);
    assert!(!store.link_for_device(1).unwrap().enabled);

    let devices = registry.get_user_devices(&session, APP, None).await.unwrap();
    assert!(!devices[0].enabled);

    assert!(registry.enable_device(&session, link_id, true).await);
    assert!(store.link_for_device(1).unwrap().enabled);
}

#[tokio::test]
async fn test_foreign_device_is_untouched() {
    let (store, registry) = setup(vec![device(1, 10, "ios")]);
    let link_id = registry
        .get_user_devices(&SessionContext::new(10), APP, None)
        .await
        .unwrap()[0]
        .id;

    let intruder = SessionContext::new(99);
    assert!(!registry.enable_device(&intruder, link_id, false).await);
    assert!(store.link_for_device(1).unwrap().enabled);
}

#[tokio::test]
async fn test_unknown_link_is_rejected() {
    let (_store, registry) = setup(vec![]);
    assert!(!registry.enable_device(&SessionContext::new(10), 12345, false).await);
}

#[tokio::test]
async fn test_orphaned_link_cannot_be_toggled() {
    let (store, registry) = setup(vec![device(1, 10, "ios")]);
    let session = SessionContext::new(10);
    let link_id = registry.get_user_devices(&session, APP, None).await.unwrap()[0].id;

    store.unregister_device(1);
    assert!(!registry.enable_device(&session, link_id, false).await);
}

#[tokio::test]
async fn test_factory_defaults_to_memory() {
    let store = create_device_store(&DatabaseConfig::default(), None);
    assert_eq!(store.backend_type(), "memory");

    let postgres_without_pool = DatabaseConfig {
        backend: "postgres".to_string(),
        ..DatabaseConfig::default()
    };
    let store = create_device_store(&postgres_without_pool, None);
    assert_eq!(store.backend_type(), "memory");
}
