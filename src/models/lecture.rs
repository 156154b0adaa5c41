use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

use crate::models::language::LanguageCode;

/// One uploaded lecture, addressed by a single id and a single watch link.
/// Per-language videos live in their own records (`VideoAsset`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LectureGroup {
    pub group_id: String,
    pub group_name: String,
    pub content_description: String,
    pub category: CategoryPath,
    /// `main/sub/leaf`, indexed for category lookups.
    #[serde(default)]
    pub search_path: String,
    pub base_folder: String,
    pub storage_provider: String,
    pub bucket_name: String,
    pub upload_date: String, // YYYYMMDD
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub supported_languages: BTreeSet<LanguageCode>,
    pub watch_link: String,
    pub qr_s3_key: Option<String>,
    pub qr_url: Option<String>,
    pub thumbnail_s3_key: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Filename-safe titles keyed by language code.
    pub translated_titles: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub total_file_size: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct CategoryPath {
    pub main: String,
    pub sub: String,
    pub leaf: String,
}

/// A playable video for one (lecture, language) pair.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoAsset {
    pub group_id: String,
    pub language_code: LanguageCode,
    pub video_s3_key: String,
    pub video_url: String,
    pub content_type: String,
    pub metadata: VideoMetadata,
    pub upload_date: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub is_original: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, ToSchema)]
pub struct VideoMetadata {
    pub duration_seconds: u64,
    pub duration_string: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub file_size: u64,
}

impl LectureGroup {
    /// A lecture is only watchable once its Korean original exists.
    pub fn is_published(&self) -> bool {
        self.supported_languages.contains(&LanguageCode::DEFAULT)
    }

    /// Title used in object keys for the given language, falling back to the
    /// Korean title and then to the sanitised group name.
    pub fn title_for(&self, language: LanguageCode, safe_name: &str) -> String {
        self.translated_titles
            .get(language.code())
            .or_else(|| self.translated_titles.get(LanguageCode::DEFAULT.code()))
            .cloned()
            .unwrap_or_else(|| safe_name.to_string())
    }

    pub fn video_key(&self, title: &str, language: LanguageCode, extension: &str) -> String {
        format!("{}/{}_video_{}{}", self.base_folder, title, language.code(), extension)
    }

    pub fn thumbnail_key(&self, title: &str, extension: &str) -> String {
        format!("{}/{}_thumbnail{}", self.base_folder, title, extension)
    }

    pub fn qr_key(&self, title: &str) -> String {
        format!("{}/{}_qrcode.svg", self.base_folder, title)
    }
}

impl CategoryPath {
    pub fn new(main: impl Into<String>, sub: impl Into<String>, leaf: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            sub: sub.into(),
            leaf: leaf.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.main.is_empty() && !self.sub.is_empty() && !self.leaf.is_empty()
    }

    pub fn display(&self) -> String {
        format!("{} > {} > {}", self.main, self.sub, self.leaf)
    }

    pub fn search_path(&self) -> String {
        format!("{}/{}/{}", self.main, self.sub, self.leaf)
    }
}

impl VideoMetadata {
    pub fn new(duration_seconds: u64, width: u32, height: u32, fps: f64, file_size: u64) -> Self {
        Self {
            duration_seconds,
            duration_string: format_duration(duration_seconds),
            width,
            height,
            fps,
            file_size,
        }
    }

    /// Values recorded when probing the file fails.
    pub fn unknown(file_size: u64) -> Self {
        Self::new(0, 0, 0, 0.0, file_size)
    }

    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// `m:ss`, minutes are not wrapped into hours.
pub fn format_duration(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
