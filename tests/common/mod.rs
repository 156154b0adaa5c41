#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use lecture_portal::{
    config::{AppConfig, DatabaseProvider, StorageProvider},
    models::{
        language::LanguageCode,
        lecture::{CategoryPath, LectureGroup, VideoAsset},
    },
    services::{
        lecture::{NewLecture, StagedFile},
        repository::{LectureRepository, MemoryLectureRepository},
        storage::{MemoryStorage, ObjectStorage},
    },
    AppState,
};

pub const WATCH_BASE: &str = "https://lectures.example.com/watch/";
pub const BOUNDARY: &str = "lecture-portal-test-boundary";

pub struct TestApp {
    pub state: AppState,
    pub repo: Arc<MemoryLectureRepository>,
    pub storage: Arc<MemoryStorage>,
    pub dir: TempDir,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.app.watch_base_url = WATCH_BASE.to_string();
    config.database.provider = DatabaseProvider::Memory;
    config.storage.provider = StorageProvider::Memory;
    config.storage.bucket = "test-bucket".to_string();
    config.storage.cdn_url = "https://cdn.example.com".to_string();
    config.translate.api_key = None;
    // Probing falls back to unknown metadata without a real ffprobe
    config.media.ffprobe_path = "ffprobe-not-installed-for-tests".to_string();
    config.admin.api_token = None;
    config
}

pub fn setup_test_app() -> TestApp {
    setup_with_config(test_config())
}

pub fn setup_with_config(config: AppConfig) -> TestApp {
    let repo = Arc::new(MemoryLectureRepository::new());
    let storage = Arc::new(MemoryStorage::new(&config.storage));
    let state = AppState::new(config, repo.clone(), storage.clone()).expect("Failed to build app state");

    TestApp {
        state,
        repo,
        storage,
        dir: tempfile::tempdir().expect("Failed to create temp dir"),
    }
}

/// Memory storage that rejects writes to keys ending with any of `failing_suffixes`.
pub struct FlakyStorage {
    pub inner: Arc<MemoryStorage>,
    pub failing_suffixes: Vec<&'static str>,
}

impl FlakyStorage {
    fn check(&self, key: &str) -> Result<()> {
        if self.failing_suffixes.iter().any(|suffix| key.ends_with(suffix)) {
            anyhow::bail!("gateway rejected {}", key);
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for FlakyStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<String> {
        self.check(key)?;
        self.inner.put_object(key, body, content_type).await
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<String> {
        self.check(key)?;
        self.inner.put_file(key, path, content_type).await
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner.delete_object(key).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }
}

/// Memory repository whose group inserts always fail. Remembers the ids it refused.
pub struct BrokenGroupRepository {
    pub inner: Arc<MemoryLectureRepository>,
    pub refused_groups: Mutex<Vec<String>>,
}

#[async_trait]
impl LectureRepository for BrokenGroupRepository {
    async fn insert_group(&self, group: &LectureGroup) -> Result<()> {
        self.refused_groups.lock().unwrap().push(group.group_id.clone());
        anyhow::bail!("connection reset while inserting {}", group.group_id)
    }

    async fn find_group(&self, group_id: &str) -> Result<Option<LectureGroup>> {
        self.inner.find_group(group_id).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<LectureGroup>> {
        self.inner.list_recent(limit).await
    }

    async fn upsert_video(&self, asset: &VideoAsset) -> Result<()> {
        self.inner.upsert_video(asset).await
    }

    async fn find_videos(&self, group_id: &str) -> Result<Vec<VideoAsset>> {
        self.inner.find_videos(group_id).await
    }

    async fn delete_video(&self, group_id: &str, language: LanguageCode) -> Result<()> {
        self.inner.delete_video(group_id, language).await
    }

    async fn add_language(&self, group_id: &str, language: LanguageCode) -> Result<()> {
        self.inner.add_language(group_id, language).await
    }
}

/// App whose storage rejects the given key suffixes. `app.storage` and
/// `app.repo` expose the memory backends underneath.
pub fn setup_with_flaky_storage(failing_suffixes: Vec<&'static str>) -> TestApp {
    let config = test_config();
    let repo = Arc::new(MemoryLectureRepository::new());
    let storage = Arc::new(MemoryStorage::new(&config.storage));
    let flaky = Arc::new(FlakyStorage {
        inner: storage.clone(),
        failing_suffixes,
    });
    let state = AppState::new(config, repo.clone(), flaky).expect("Failed to build app state");

    TestApp {
        state,
        repo,
        storage,
        dir: tempfile::tempdir().expect("Failed to create temp dir"),
    }
}

/// App whose database accepts video rows but fails every group insert.
pub fn setup_with_broken_groups() -> (TestApp, Arc<BrokenGroupRepository>) {
    let config = test_config();
    let repo = Arc::new(MemoryLectureRepository::new());
    let storage = Arc::new(MemoryStorage::new(&config.storage));
    let broken = Arc::new(BrokenGroupRepository {
        inner: repo.clone(),
        refused_groups: Mutex::new(Vec::new()),
    });
    let state = AppState::new(config, broken.clone(), storage.clone()).expect("Failed to build app state");

    let app = TestApp {
        state,
        repo,
        storage,
        dir: tempfile::tempdir().expect("Failed to create temp dir"),
    };
    (app, broken)
}

pub fn stage_file(dir: &TempDir, name: &str, content: &[u8]) -> StagedFile {
    let path = dir.path().join(format!("{}-{}", uuid::Uuid::new_v4().simple(), name));
    std::fs::write(&path, content).expect("Failed to write staged file");
    StagedFile {
        path,
        original_name: name.to_string(),
        size: content.len() as u64,
    }
}

pub fn sample_category() -> CategoryPath {
    CategoryPath::new("기계", "건설기계", "크레인")
}

pub fn sample_description() -> String {
    "• 크레인 점검 절차\n• 신호수 배치 요령\n1. 작업 전 안전 점검\n2. 인양 하중 확인".to_string()
}

pub fn sample_lecture(dir: &TempDir) -> NewLecture {
    NewLecture {
        group_name: "크레인 안전 교육".to_string(),
        category: sample_category(),
        content_description: sample_description(),
        translated_titles: BTreeMap::new(),
        video: stage_file(dir, "lecture.mp4", b"fake korean video bytes"),
        thumbnail: None,
    }
}

/// Publishes the sample lecture and returns its group id.
pub async fn publish_sample(app: &TestApp) -> String {
    let outcome = app
        .state
        .lectures
        .publish_lecture(sample_lecture(&app.dir))
        .await
        .expect("Failed to publish sample lecture");
    outcome.group_id
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        content: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
