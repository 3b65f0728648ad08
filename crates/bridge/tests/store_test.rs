//! Store-level scenarios exercised through the bridge: persistence
//! round trips, fresh-file initialization, and write serialization
//! under concurrency.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use quiver_bridge::Bridge;
use quiver_domain::Collection;
use tempfile::tempdir;

#[tokio::test]
async fn fresh_file_starts_empty_with_default_settings() {
    let dir = tempdir().expect("tempdir");
    let bridge = Bridge::open(dir.path().join("quiver.json"))
        .await
        .expect("open");

    assert!(bridge.collection_list().await.data.expect("data").is_empty());
    assert!(bridge.env_list().await.data.expect("data").is_empty());

    let settings = bridge.settings_get_all().await.data.expect("data");
    assert_eq!(settings.get("theme"), Some(&serde_json::json!("system")));
}

#[tokio::test]
async fn saved_data_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("quiver.json");

    let id = {
        let bridge = Bridge::open(&path).await.expect("open");
        let response = bridge.collection_save(Collection::new("api")).await;
        assert!(response.success);
        response.id.expect("id")
    };

    let reopened = Bridge::open(&path).await.expect("reopen");
    let collections = reopened.collection_list().await.data.expect("data");
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].id, Some(id));
    assert_eq!(collections[0].name, "api");
}

#[tokio::test]
async fn concurrent_saves_all_land() {
    let dir = tempdir().expect("tempdir");
    let bridge = Arc::new(
        Bridge::open(dir.path().join("quiver.json"))
            .await
            .expect("open"),
    );

    let mut handles = Vec::new();
    for i in 0..100 {
        let bridge = Arc::clone(&bridge);
        handles.push(tokio::spawn(async move {
            bridge.collection_save(Collection::new(format!("c{i}"))).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let response = handle.await.expect("join");
        assert!(response.success);
        ids.push(response.id.expect("id"));
    }

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 100);

    let collections = bridge.collection_list().await.data.expect("data");
    assert_eq!(collections.len(), 100);
}

#[tokio::test]
async fn ids_stay_monotonic_across_deletes() {
    let dir = tempdir().expect("tempdir");
    let bridge = Bridge::open(dir.path().join("quiver.json"))
        .await
        .expect("open");

    let first = bridge
        .collection_save(Collection::new("first"))
        .await
        .id
        .expect("id");
    assert!(bridge.collection_delete(first).await.success);

    let second = bridge
        .collection_save(Collection::new("second"))
        .await
        .id
        .expect("id");
    assert!(second > first);
}
