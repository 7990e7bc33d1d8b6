use proptest::prelude::*;

use roster::search::fuzzy::{FuzzyMatcher, similarity};
use roster::search::normalize::{normalize, normalize_text};
use roster::search::{SearchEngine, SearchOptions};
use roster::test_utils::{local_config, sample_roster};

proptest! {
    #[test]
    fn test_normalize_is_idempotent(text in "[a-zA-Z0-9ａ-ｚＡ-Ｚ０-９ぁ-ゖァ-ヶー一-龥 .,!?・/()-]{0,40}") {
        let once = normalize_text(&text);
        prop_assert_eq!(normalize_text(&once), once.clone());
        prop_assert!(!once.starts_with(' '));
        prop_assert!(!once.ends_with(' '));
        prop_assert!(!once.contains("  "));
    }

    #[test]
    fn test_normalize_never_panics(text in ".*") {
        let normalized = normalize(&text);
        prop_assert_eq!(normalized.text.trim(), normalized.text.as_str());
    }

    #[test]
    fn test_similarity_is_bounded_and_reflexive(a in "[a-zアイウエオカキクケコ]{0,12}", b in "[a-zアイウエオカキクケコ]{0,12}") {
        let score = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score));
        if !a.is_empty() {
            prop_assert!((similarity(&a, &a) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fuzzy_scores_are_bounded(a in "[a-z ]{1,16}", b in "[a-z ]{1,24}") {
        let matcher = FuzzyMatcher::default();
        if let Some(found) = matcher.compare(&a, &b, 0.75) {
            prop_assert!(found.score > 0.0 && found.score <= 1.0);
            prop_assert!(found.confidence > 0.0 && found.confidence <= 1.0);
        }
    }

    #[test]
    fn test_arbitrary_queries_never_fail_unexpectedly(query in ".{0,30}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        let engine = SearchEngine::local(sample_roster(), &local_config()).expect("engine");
        let outcome = runtime.block_on(engine.search(&query, &SearchOptions::default()));
        match outcome {
            Ok(response) => prop_assert!(response.results.len() <= response.total),
            Err(err) => prop_assert_eq!(err.code(), "empty_query"),
        }
    }
}
