use std::path::PathBuf;

use tempfile::TempDir;

use crate::config::Config;
use crate::roster::{PersonRecord, Roster};

/// Five bilingual participants covering every searchable field.
pub const SAMPLE_DATASET: &str = r#"{
  "participants": [
    {
      "id": 1,
      "name": { "en": "Aoi Sato", "ja": "佐藤 葵" },
      "team": { "en": "Team Sakura", "ja": "チームさくら" },
      "roles": [{ "en": "UI Designer", "ja": "UIデザイナー" }],
      "skills": [
        { "en": "Figma", "ja": "" },
        { "en": "UX Research", "ja": "UXリサーチ" }
      ],
      "interests": [{ "en": "Accessibility", "ja": "アクセシビリティ" }],
      "ideas": [{ "en": "Campus map app", "ja": "キャンパスマップアプリ" }]
    },
    {
      "id": 2,
      "name": { "en": "Kenji Tanaka", "ja": "田中 健二" },
      "team": { "en": "Team Fuji", "ja": "チームふじ" },
      "roles": [{ "en": "PM, Engineer", "ja": "PM・エンジニア" }],
      "skills": [
        { "en": "Product Management", "ja": "プロダクトマネジメント" },
        { "en": "TypeScript", "ja": "" }
      ],
      "interests": [{ "en": "Education", "ja": "教育" }],
      "ideas": [{ "en": "Study planner for students", "ja": "" }]
    },
    {
      "id": 3,
      "name": { "en": "Ren Suzuki", "ja": "鈴木 蓮" },
      "team": { "en": "Team Sakura", "ja": "チームさくら" },
      "roles": [{ "en": "Backend Engineer", "ja": "バックエンドエンジニア" }],
      "skills": [
        { "en": "Python", "ja": "パイソン" },
        { "en": "Django", "ja": "" },
        { "en": "PostgreSQL", "ja": "" }
      ],
      "github": {
        "bio": "Backend developer who enjoys data pipelines",
        "company": "Kumo Inc.",
        "topLanguages": ["Python", "Go"],
        "repositories": [
          { "name": "ingest-kit", "description": "Streaming ingestion toolkit", "stars": 42 }
        ]
      }
    },
    {
      "id": 4,
      "name": { "en": "Mio Takahashi", "ja": "高橋 美緒" },
      "team": { "en": "Team Fuji", "ja": "チームふじ" },
      "roles": [{ "en": "Data Scientist", "ja": "データサイエンティスト" }],
      "skills": [
        { "en": "Machine Learning", "ja": "機械学習" },
        { "en": "Python", "ja": "" }
      ],
      "interests": [{ "en": "Healthcare", "ja": "ヘルスケア" }]
    },
    {
      "id": 5,
      "name": { "en": "Yuki Ito", "ja": "伊藤 由紀" },
      "team": { "en": "Team Kaze", "ja": "" },
      "roles": [{ "en": "Product Manager", "ja": "プロダクトマネージャー" }],
      "skills": [{ "en": "Marketing", "ja": "マーケティング" }],
      "ideas": [{ "en": "Community event platform", "ja": "" }]
    }
  ]
}"#;

/// Parsed [`SAMPLE_DATASET`].
#[must_use]
pub fn sample_roster() -> Roster {
    Roster::from_json(SAMPLE_DATASET).expect("sample dataset parses")
}

#[must_use]
pub fn sample_records() -> Vec<PersonRecord> {
    sample_roster().records().to_vec()
}

/// Defaults with the remote matcher off and nothing read from the host.
#[must_use]
pub fn local_config() -> Config {
    let mut config = Config::default();
    config.remote.enabled = false;
    config.history.enabled = false;
    config
}

/// Isolated working directory holding the sample dataset and a config file
/// that keeps history inside the directory.
pub struct RosterFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub dataset_path: PathBuf,
    pub config_path: PathBuf,
    pub history_path: PathBuf,
}

impl Default for RosterFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterFixture {
    #[must_use]
    pub fn new() -> Self {
        Self::with_dataset(SAMPLE_DATASET)
    }

    #[must_use]
    pub fn with_dataset(dataset: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let dataset_path = root.join("data/participants.json");
        let config_path = root.join("config.toml");
        let history_path = root.join("recent_queries.json");

        println!("[FIXTURE] Created temp directory: {root:?}");

        let fixture = Self {
            temp_dir,
            root,
            dataset_path,
            config_path,
            history_path,
        };
        fixture.create_file("data/participants.json", dataset);
        fixture.write_config("");
        fixture
    }

    /// Rewrite `config.toml`: dataset and history point into the fixture,
    /// followed by `extra` verbatim.
    pub fn write_config(&self, extra: &str) {
        let content = format!(
            "[dataset]\nlocation = '{}'\n\n[history]\npath = '{}'\n\n{extra}\n",
            self.dataset_path.display(),
            self.history_path.display(),
        );
        std::fs::write(&self.config_path, content).expect("Failed to write config");
    }

    /// Create a file under the fixture root.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {:?} ({} bytes)",
            full_path,
            content.len()
        );
        full_path
    }
}

impl Drop for RosterFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.root);
    }
}
