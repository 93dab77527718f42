//! End-to-end scenarios S5 and S6 (`spec.md` §8).

use brain_infra::{Cache, MemoryStore};
use brain_types::domain::SearchOptions;
use brain_types::{CacheConfig, MemoryStoreConfig};
use std::collections::HashSet;
use std::time::Duration;

fn cache_config() -> CacheConfig {
    CacheConfig {
        max_size: 2,
        default_ttl_seconds: 1,
        ..Default::default()
    }
}

/// S5 — of two equal-confidence memories, the one with the higher access
/// count wins a `limit:1` query, and the call bumps its own access count.
#[tokio::test]
async fn s5_memory_retrieval_breaks_ties_by_access_count() {
    let store = MemoryStore::connect(MemoryStoreConfig {
        database_url: "sqlite::memory:".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();

    store
        .store_memory("idle", serde_json::json!("idle"), "note", None, 0.8, HashSet::new())
        .await
        .unwrap();
    store
        .store_memory("active", serde_json::json!("active"), "note", None, 0.8, HashSet::new())
        .await
        .unwrap();
    for _ in 0..3 {
        store.get_memory_by_key("active").await.unwrap();
    }

    let results = store
        .search_memories(&SearchOptions { min_confidence: Some(0.5), limit: Some(1), ..Default::default() })
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].key, "active");
    assert_eq!(results[0].access_count, 4);
}

/// S6 — `maxSize=2`, insert `A, B`, touch `A`, insert `C`: `B` (least
/// recently used) is evicted and `A` later expires on TTL.
#[tokio::test]
async fn s6_cache_ttl_and_eviction_order() {
    let cache = Cache::new(cache_config());

    cache.set("A", "a", Some(1)).await.unwrap(); // t=0
    cache.set("B", "b", Some(1)).await.unwrap(); // t=0

    tokio::time::sleep(Duration::from_millis(500)).await; // t=0.5
    let touched: Option<String> = cache.get("A").await.unwrap();
    assert_eq!(touched, Some("a".to_string()));

    tokio::time::sleep(Duration::from_millis(200)).await; // t=0.7
    cache.set("C", "c", Some(1)).await.unwrap();

    let a: Option<String> = cache.get("A").await.unwrap();
    let b: Option<String> = cache.get("B").await.unwrap();
    let c: Option<String> = cache.get("C").await.unwrap();
    assert!(a.is_some());
    assert!(b.is_none());
    assert!(c.is_some());

    tokio::time::sleep(Duration::from_millis(400)).await; // t=1.1
    let expired: Option<String> = cache.get("A").await.unwrap();
    assert_eq!(expired, None);
    assert!(!cache.has("A").await);
}
