use std::collections::BTreeSet;

use roster::roster::Roster;
use roster::search::{MatchKind, SearchEngine, SearchField, SearchOptions, SearchResponse, Strategy};
use roster::test_utils::{local_config, sample_roster};

const THREE_PEOPLE: &str = r#"[
    { "id": 1, "name": { "en": "A" }, "roles": [{ "en": "UI Designer" }] },
    { "id": 2, "name": { "en": "B" }, "roles": [{ "en": "PM, Engineer" }] },
    { "id": 3, "name": { "en": "C" }, "roles": [{ "en": "Backend Engineer" }] }
]"#;

fn engine() -> SearchEngine {
    SearchEngine::local(sample_roster(), &local_config()).unwrap()
}

fn local_only() -> SearchOptions {
    SearchOptions {
        limit: None,
        use_remote: false,
        use_cache: false,
    }
}

fn ids(response: &SearchResponse) -> BTreeSet<u32> {
    response.results.iter().map(|r| r.id).collect()
}

fn confidence_of(response: &SearchResponse, id: u32) -> f64 {
    response
        .results
        .iter()
        .find(|r| r.id == id)
        .map(|r| r.confidence)
        .unwrap_or_else(|| panic!("id {id} missing from {:?}", ids(response)))
}

#[tokio::test]
async fn designer_query_skips_combined_pm_engineer_role() {
    let roster = Roster::from_json(THREE_PEOPLE).unwrap();
    let engine = SearchEngine::local(roster, &local_config()).unwrap();

    let designers = engine.search("designer", &local_only()).await.unwrap();
    assert_eq!(ids(&designers), BTreeSet::from([1]));

    let engineers = engine.search("engineer", &local_only()).await.unwrap();
    assert_eq!(ids(&engineers), BTreeSet::from([2, 3]));
}

#[tokio::test]
async fn designer_rule_decides_combined_role_label() {
    let roster = Roster::from_json(THREE_PEOPLE).unwrap();
    let engine = SearchEngine::local(roster.clone(), &local_config()).unwrap();

    let response = engine.search("designer engineer", &local_only()).await.unwrap();
    assert_eq!(ids(&response), BTreeSet::from([1, 3]));

    let mut config = local_config();
    config.search.role_exclusions.clear();
    let unrestricted = SearchEngine::local(roster, &config).unwrap();
    let response = unrestricted
        .search("designer engineer", &local_only())
        .await
        .unwrap();
    assert_eq!(ids(&response), BTreeSet::from([1, 2, 3]));
}

#[tokio::test]
async fn longer_skill_query_does_not_match_its_prefix() {
    let roster = Roster::from_json(
        r#"[
            { "id": 1, "name": { "en": "A" }, "skills": [{ "en": "JavaScript" }] },
            { "id": 2, "name": { "en": "B" }, "skills": [{ "en": "Java" }] }
        ]"#,
    )
    .unwrap();
    let engine = SearchEngine::local(roster, &local_config()).unwrap();

    let response = engine.search("javascript", &local_only()).await.unwrap();
    assert_eq!(ids(&response), BTreeSet::from([1]));

    let response = engine.search("java", &local_only()).await.unwrap();
    assert!(ids(&response).contains(&2));
}

#[tokio::test]
async fn designer_query_on_full_roster() {
    let response = engine().search("designer", &local_only()).await.unwrap();

    assert_eq!(ids(&response), BTreeSet::from([1]));
    let role = response.results[0]
        .matched_fields
        .iter()
        .find(|f| f.field == SearchField::Role)
        .unwrap();
    assert_eq!(role.value, "UI Designer");
}

#[tokio::test]
async fn japanese_role_label_finds_same_people_as_english() {
    let engine = engine();
    let english = engine.search("engineer", &local_only()).await.unwrap();
    let japanese = engine.search("エンジニア", &local_only()).await.unwrap();

    assert_eq!(ids(&english), BTreeSet::from([2, 3]));
    assert_eq!(ids(&english), ids(&japanese));
}

#[tokio::test]
async fn typo_still_finds_skill_with_lower_confidence() {
    let engine = engine();
    let exact = engine.search("python", &local_only()).await.unwrap();
    let typo = engine.search("pythom", &local_only()).await.unwrap();

    assert!(ids(&typo).contains(&3));
    assert!(ids(&typo).contains(&4));
    for id in [3, 4] {
        assert!(confidence_of(&typo, id) < confidence_of(&exact, id));
    }
    let skill = typo.results[0]
        .matched_fields
        .iter()
        .find(|f| f.field == SearchField::Skill)
        .unwrap();
    assert_eq!(skill.kind, MatchKind::Fuzzy);
}

#[tokio::test]
async fn results_are_sorted_and_unique() {
    let response = engine().search("team sakura python", &local_only()).await.unwrap();

    assert!(!response.results.is_empty());
    let scores: Vec<f64> = response.results.iter().map(|r| r.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(ids(&response).len(), response.results.len());
    assert!(response.results.iter().all(|r| r.strategy == Strategy::Structured));
    assert!(response.results.iter().all(|r| (0.0..=1.0).contains(&r.confidence)));
}

#[tokio::test]
async fn exact_name_outranks_partial_mentions() {
    let response = engine().search("Ren Suzuki", &local_only()).await.unwrap();
    assert_eq!(response.results[0].id, 3);
}

#[tokio::test]
async fn normalization_makes_width_and_case_irrelevant() {
    let engine = engine();
    let plain = engine.search("figma", &local_only()).await.unwrap();
    let wide = engine.search("ＦＩＧＭＡ", &local_only()).await.unwrap();

    assert_eq!(plain.normalized, "figma");
    assert_eq!(wide.normalized, "figma");
    assert_eq!(plain.results, wide.results);
}

#[tokio::test]
async fn limit_keeps_total() {
    let options = SearchOptions {
        limit: Some(1),
        ..local_only()
    };
    let response = engine().search("python", &options).await.unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.total, 2);
}

#[tokio::test]
async fn unmatched_query_is_an_empty_success() {
    let response = engine().search("zzyzx", &local_only()).await.unwrap();
    assert!(response.results.is_empty());
    assert_eq!(response.total, 0);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let err = engine().search(" 、 ", &local_only()).await.unwrap_err();
    assert_eq!(err.code(), "empty_query");
}

#[tokio::test]
async fn record_lookup() {
    let engine = engine();
    assert_eq!(engine.record(4).unwrap().name.en, "Mio Takahashi");
    assert_eq!(engine.record(99).unwrap_err().code(), "not_found");
}
