use std::time::Duration;

use httpmock::prelude::*;

use roster::roster::{DatasetSource, Roster};
use roster::search::SearchField;
use roster::test_utils::{RosterFixture, SAMPLE_DATASET, sample_roster};

#[test]
fn dataset_sample_parses_every_field() {
    let roster = sample_roster();
    assert_eq!(roster.len(), 5);

    let ren = roster.get(3).unwrap();
    assert_eq!(ren.name.ja, "鈴木 蓮");
    assert_eq!(ren.values_for(SearchField::Language), vec!["Python", "Go"]);
    assert_eq!(
        ren.values_for(SearchField::Repository),
        vec!["ingest-kit", "Streaming ingestion toolkit"]
    );
    assert_eq!(ren.values_for(SearchField::Company), vec!["Kumo Inc."]);

    let aoi = roster.get(1).unwrap();
    assert!(aoi.github.is_none());
    assert!(aoi.values_for(SearchField::Bio).is_empty());
    // Empty Japanese labels are not searchable values.
    assert_eq!(aoi.values_for(SearchField::Skill), vec!["Figma", "UX Research", "UXリサーチ"]);
}

#[test]
fn dataset_accepts_bare_array_and_legacy_names() {
    let raw = r#"[
        {
            "id": 7,
            "name": { "en": "Sora Kato" },
            "specialties": [{ "en": "Rust" }],
            "projects": [{ "en": "Bike share map" }],
            "enrichment": { "topLanguages": ["Rust"] }
        }
    ]"#;
    let roster = Roster::from_json(raw).unwrap();
    let sora = roster.get(7).unwrap();

    assert_eq!(sora.skills[0].en, "Rust");
    assert_eq!(sora.ideas[0].en, "Bike share map");
    assert_eq!(sora.github.as_ref().unwrap().top_languages, vec!["Rust"]);
    assert!(sora.team.is_empty());
}



#[test]
fn dataset_completeness_reflects_filled_fields() {
    let roster = sample_roster();
    let ren = roster.get(3).unwrap().completeness();
    let yuki = roster.get(5).unwrap().completeness();

    assert!(ren > yuki);
    assert!((0.0..=1.0).contains(&ren));
}


#[tokio::test]
async fn dataset_load_from_file() {
    let fixture = RosterFixture::new();
    let source = DatasetSource::File(fixture.dataset_path.clone());

    let roster = Roster::load(&source, Duration::from_secs(1)).await.unwrap();

    assert_eq!(roster.len(), 5);
}


#[tokio::test]
async fn dataset_load_over_http() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/participants.json");
            then.status(200)
                .header("content-type", "application/json")
                .body(SAMPLE_DATASET);
        })
        .await;

    let source = DatasetSource::parse(&server.url("/participants.json"));
    let roster = Roster::load(&source, Duration::from_secs(5)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(roster.len(), 5);
}

#[tokio::test]
async fn dataset_http_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/participants.json");
            then.status(503);
        })
        .await;

    let source = DatasetSource::parse(&server.url("/participants.json"));
    let err = Roster::load(&source, Duration::from_secs(5)).await.unwrap_err();

    assert_eq!(err.code(), "dataset");
}
