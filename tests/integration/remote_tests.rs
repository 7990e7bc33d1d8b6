use std::collections::BTreeSet;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use roster::search::remote::HttpMatcher;
use roster::search::{RemoteStatus, SearchEngine, SearchOptions, Strategy};
use roster::test_utils::{local_config, sample_roster};

use super::support::{BrokenMatcher, ScriptedMatcher, hit};

fn no_cache() -> SearchOptions {
    SearchOptions {
        use_cache: false,
        ..SearchOptions::default()
    }
}

#[tokio::test]
async fn remote_hits_are_blended_with_local_results() {
    let matcher = ScriptedMatcher::new(vec![hit(3, 0.9), hit(1, 0.4)]);
    let engine = SearchEngine::new(sample_roster(), &local_config(), Some(matcher)).unwrap();

    let response = engine.search("engineer", &no_cache()).await.unwrap();

    assert_eq!(response.remote, RemoteStatus::Ok { matches: 2 });
    let ren = response.results.iter().find(|r| r.id == 3).unwrap();
    assert_eq!(ren.strategy, Strategy::Hybrid);
    let aoi = response.results.iter().find(|r| r.id == 1).unwrap();
    assert_eq!(aoi.strategy, Strategy::Ai);
    assert!(aoi.matched_fields.is_empty());
    let kenji = response.results.iter().find(|r| r.id == 2).unwrap();
    assert_eq!(kenji.strategy, Strategy::Structured);
}

#[tokio::test]
async fn remote_timeout_falls_back_to_local_results() {
    let mut config = local_config();
    config.remote.timeout = Duration::from_millis(50);
    let slow = ScriptedMatcher::slow(vec![hit(1, 1.0)], Duration::from_secs(5));
    let engine = SearchEngine::new(sample_roster(), &config, Some(slow)).unwrap();
    let local = SearchEngine::local(sample_roster(), &config).unwrap();

    let degraded = engine.search("engineer", &no_cache()).await.unwrap();
    let expected = local.search("engineer", &no_cache()).await.unwrap();

    assert!(matches!(degraded.remote, RemoteStatus::Failed { .. }));
    assert!(degraded.is_degraded());
    assert_eq!(degraded.warnings.len(), 1);
    assert_eq!(degraded.results, expected.results);
    assert!(!degraded.results.is_empty());
}

#[tokio::test]
async fn remote_error_falls_back_to_local_results() {
    let engine = SearchEngine::new(sample_roster(), &local_config(), Some(BrokenMatcher)).unwrap();

    let response = engine.search("python", &SearchOptions::default()).await.unwrap();

    match &response.remote {
        RemoteStatus::Failed { reason } => assert!(reason.contains("connection reset")),
        other => panic!("expected failure, got {other:?}"),
    }
    let ids: BTreeSet<u32> = response.results.iter().map(|r| r.id).collect();
    assert_eq!(ids, BTreeSet::from([3, 4]));
}

#[tokio::test]
async fn remote_failure_without_local_matches_says_so() {
    let engine = SearchEngine::new(sample_roster(), &local_config(), Some(BrokenMatcher)).unwrap();

    let with_local = engine.search("python", &no_cache()).await.unwrap();
    let without_local = engine.search("zzyzx", &no_cache()).await.unwrap();

    assert!(without_local.results.is_empty());
    assert!(without_local.is_degraded());
    assert_eq!(without_local.warnings.len(), 1);
    assert!(without_local.warnings[0].contains("no local matches"));
    assert!(!with_local.warnings[0].contains("no local matches"));
}

#[tokio::test]
async fn degraded_responses_are_not_cached() {
    let engine = SearchEngine::new(sample_roster(), &local_config(), Some(BrokenMatcher)).unwrap();

    let first = engine.search("python", &SearchOptions::default()).await.unwrap();
    let second = engine.search("python", &SearchOptions::default()).await.unwrap();

    assert!(!first.cached);
    assert!(!second.cached);
    assert_eq!(engine.cache_stats().unwrap().rejected, 2);
}

#[tokio::test]
async fn skipping_remote_uses_its_own_cache_slot() {
    let matcher = ScriptedMatcher::new(vec![hit(5, 0.8)]);
    let engine = SearchEngine::new(sample_roster(), &local_config(), Some(matcher)).unwrap();
    let local_only = SearchOptions {
        use_remote: false,
        ..SearchOptions::default()
    };

    let with_remote = engine.search("marketing", &SearchOptions::default()).await.unwrap();
    let without = engine.search("marketing", &local_only).await.unwrap();

    assert!(!without.cached);
    assert_eq!(without.remote, RemoteStatus::Disabled);
    assert_eq!(with_remote.remote, RemoteStatus::Ok { matches: 1 });
}

#[tokio::test]
async fn newer_search_supersedes_older_one() {
    let mut config = local_config();
    config.remote.timeout = Duration::from_secs(5);
    let matcher = ScriptedMatcher::slow(vec![hit(3, 0.9)], Duration::from_millis(300));
    let engine = SearchEngine::new(sample_roster(), &config, Some(matcher)).unwrap();
    let options = no_cache();

    let (older, newer) = tokio::join!(engine.search_latest("python", &options), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        engine.search_latest("designer", &options).await
    });

    assert!(older.unwrap().is_none());
    let newer = newer.unwrap().expect("latest search answers");
    assert_eq!(newer.query, "designer");
    assert_eq!(engine.current_token(), 2);
}

#[tokio::test]
async fn http_matcher_sends_query_and_catalog() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/match")
                .header("authorization", "Bearer token-123")
                .body_includes("someone who likes data")
                .body_includes("id,name,team,roles,skills");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "matches": [{ "id": 4, "confidence": 0.9 }] }));
        })
        .await;

    let matcher = HttpMatcher::new(
        &server.url("/match"),
        Duration::from_secs(5),
        Some("token-123".to_string()),
    )
    .unwrap();
    let engine = SearchEngine::new(sample_roster(), &local_config(), Some(matcher)).unwrap();

    let response = engine
        .search("someone who likes data", &SearchOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.remote, RemoteStatus::Ok { matches: 1 });
    let mio = response.results.iter().find(|r| r.id == 4).unwrap();
    assert_eq!(mio.strategy, Strategy::Hybrid);
}

#[tokio::test]
async fn http_matcher_accepts_bare_id_lists() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/match");
            then.status(200).json_body(json!({ "ids": [5, 42] }));
        })
        .await;

    let matcher = HttpMatcher::new(&server.url("/match"), Duration::from_secs(5), None).unwrap();
    let engine = SearchEngine::new(sample_roster(), &local_config(), Some(matcher)).unwrap();

    let response = engine.search("zzyzx", &SearchOptions::default()).await.unwrap();

    assert_eq!(response.remote, RemoteStatus::Ok { matches: 1 });
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].id, 5);
    assert_eq!(response.results[0].strategy, Strategy::Ai);
}

#[tokio::test]
async fn http_matcher_server_error_degrades() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/match");
            then.status(500);
        })
        .await;

    let matcher = HttpMatcher::new(&server.url("/match"), Duration::from_secs(5), None).unwrap();
    let engine = SearchEngine::new(sample_roster(), &local_config(), Some(matcher)).unwrap();

    let first = engine.search("python", &SearchOptions::default()).await.unwrap();
    let second = engine.search("python", &SearchOptions::default()).await.unwrap();

    assert!(first.is_degraded());
    assert!(!second.cached);
    assert!(!first.results.is_empty());
    mock.assert_hits_async(2).await;
}
