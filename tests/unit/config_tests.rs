use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use roster::RosterError;
use roster::config::Config;
use roster::search::{SearchField, Strategy};
use roster::test_utils::{RosterFixture, TestCase, run_table_tests};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn load_fixture(relative: &str) -> roster::Result<Config> {
    let content = fs::read_to_string(fixture_path(relative)).expect("read fixture");
    Config::from_toml(&content)
}

#[test]
fn config_search_values_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "default",
            input: "tests/fixtures/configs/default.toml",
            expected: (0.75f64, 0.5f64, 20usize, true, Duration::from_secs(3)),
            should_panic: false,
        },
        TestCase {
            name: "tuned",
            input: "tests/fixtures/configs/tuned.toml",
            expected: (0.85f64, 1.0f64, 5usize, true, Duration::from_millis(750)),
            should_panic: false,
        },
    ];

    run_table_tests(cases, |relative_path| {
        let config = load_fixture(relative_path).expect("parse config");
        (
            config.search.fuzzy_threshold,
            config.search.min_score,
            config.search.default_limit,
            config.search.partial_expansion,
            config.remote.timeout,
        )
    })
}

#[test]
fn config_default_fixture_matches_builtin_defaults() {
    let from_file = load_fixture("tests/fixtures/configs/default.toml").unwrap();
    let builtin = Config::default();

    assert_eq!(from_file.dataset.location, builtin.dataset.location);
    assert_eq!(from_file.dataset.timeout, builtin.dataset.timeout);
    assert_eq!(from_file.merge.blend, builtin.merge.blend);
    assert_eq!(from_file.cache.capacity, builtin.cache.capacity);
    assert_eq!(from_file.cache.ttl, builtin.cache.ttl);
    assert_eq!(from_file.history.max_entries, builtin.history.max_entries);
    assert_eq!(from_file.search.field_weights, builtin.search.field_weights);
}

#[test]
fn config_partial_maps_extend_defaults() {
    let config = load_fixture("tests/fixtures/configs/tuned.toml").unwrap();

    assert_eq!(config.search.field_weights[&SearchField::Bio], 6.0);
    assert_eq!(config.search.field_weights[&SearchField::Repository], 0.0);
    assert_eq!(config.search.field_weights[&SearchField::Name], 10.0);

    assert_eq!(config.merge.blend[&Strategy::Ai], 0.7);
    assert_eq!(config.merge.blend[&Strategy::Structured], 0.6);
}

#[test]
fn config_role_exclusions_replace_defaults() {
    let config = load_fixture("tests/fixtures/configs/tuned.toml").unwrap();

    assert_eq!(config.search.role_exclusions.len(), 1);
    assert_eq!(config.search.role_exclusions[0].query_terms, vec!["marketing"]);
    assert_eq!(config.search.role_exclusions[0].excluded_roles, vec!["engineer"]);
}

#[test]
fn config_remote_and_cache_sections() {
    let config = load_fixture("tests/fixtures/configs/tuned.toml").unwrap();

    assert!(config.remote.enabled);
    assert_eq!(config.remote.endpoint, "https://matcher.example.invalid/match");
    assert_eq!(config.remote.api_key_env.as_deref(), Some("MATCHER_TOKEN"));
    assert_eq!(config.cache.capacity, 16);
    assert_eq!(config.cache.ttl, Duration::from_secs(30));
    assert!(config.cache.enabled);
    assert!(!config.history.enabled);
}

#[test]
fn config_rejects_invalid_values() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "threshold above one",
            input: "tests/fixtures/configs/invalid_threshold.toml",
            expected: "config",
            should_panic: false,
        },
        TestCase {
            name: "nan field weight",
            input: "tests/fixtures/configs/invalid_nan_weight.toml",
            expected: "config",
            should_panic: false,
        },
        TestCase {
            name: "remote without endpoint",
            input: "tests/fixtures/configs/remote_without_endpoint.toml",
            expected: "config",
            should_panic: false,
        },
    ];

    run_table_tests(cases, |relative_path| match load_fixture(relative_path) {
        Ok(_) => "ok",
        Err(err) => err.code(),
    })
}

#[test]
fn config_rejects_unparseable_toml() {
    let err = Config::from_toml("[search\nfuzzy_threshold = ").unwrap_err();
    assert!(matches!(err, RosterError::Config(_)));
}

#[test]
fn config_load_explicit_file() {
    let fixture = RosterFixture::new();
    fixture.write_config("[search]\ndefault_limit = 3\n");

    let config = Config::load(Some(fixture.config_path.as_path()), &fixture.root).unwrap();

    assert_eq!(config.search.default_limit, 3);
    assert_eq!(
        PathBuf::from(&config.dataset.location),
        fixture.dataset_path
    );
    assert_eq!(config.history.path.as_deref(), Some(fixture.history_path.as_path()));
}

#[test]
fn config_load_missing_explicit_file_is_an_error() {
    let fixture = RosterFixture::new();
    let missing = fixture.root.join("nope.toml");

    let err = Config::load(Some(missing.as_path()), &fixture.root).unwrap_err();

    assert!(matches!(err, RosterError::MissingConfig(_)));
}
