use std::time::Duration;

use roster::search::{SearchEngine, SearchOptions};
use roster::test_utils::{local_config, sample_roster};

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let engine = SearchEngine::local(sample_roster(), &local_config()).unwrap();

    let first = engine.search("Python", &SearchOptions::default()).await.unwrap();
    let second = engine.search("  python", &SearchOptions::default()).await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.results, second.results);
    let stats = engine.cache_stats().unwrap();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn cached_response_honours_a_smaller_limit() {
    let engine = SearchEngine::local(sample_roster(), &local_config()).unwrap();
    engine.search("python", &SearchOptions::default()).await.unwrap();

    let limited = SearchOptions {
        limit: Some(1),
        ..SearchOptions::default()
    };
    let cached = engine.search("python", &limited).await.unwrap();

    assert!(cached.cached);
    assert_eq!(cached.results.len(), 1);
    assert_eq!(cached.total, 2);
}

#[tokio::test]
async fn expired_entries_are_recomputed() {
    let mut config = local_config();
    config.cache.ttl = Duration::from_millis(40);
    let engine = SearchEngine::local(sample_roster(), &config).unwrap();

    engine.search("figma", &SearchOptions::default()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    let again = engine.search("figma", &SearchOptions::default()).await.unwrap();

    assert!(!again.cached);
    assert_eq!(engine.cache_stats().unwrap().expired, 1);
}

#[tokio::test]
async fn bypassing_the_cache() {
    let engine = SearchEngine::local(sample_roster(), &local_config()).unwrap();
    let bypass = SearchOptions {
        use_cache: false,
        ..SearchOptions::default()
    };

    engine.search("figma", &bypass).await.unwrap();
    let again = engine.search("figma", &bypass).await.unwrap();

    assert!(!again.cached);
    assert_eq!(engine.cache_stats().unwrap().hits, 0);
}

#[tokio::test]
async fn disabled_cache_has_no_stats() {
    let mut config = local_config();
    config.cache.enabled = false;
    let engine = SearchEngine::local(sample_roster(), &config).unwrap();

    let response = engine.search("figma", &SearchOptions::default()).await.unwrap();

    assert!(!response.cached);
    assert!(engine.cache_stats().is_none());
}
