use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::models::{language::LanguageCode, lecture::VideoMetadata};
use crate::services::resolver::Resolution;

/// Result of publishing a new lecture.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadOutcome {
    pub group_id: String,
    pub video_url: String,
    /// Language-independent link encoded in the QR code.
    pub watch_link: String,
    pub qr_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LanguageUploadResponse {
    pub success: bool,
    pub message: String,
    pub group_id: String,
    pub language_code: LanguageCode,
    pub video_url: String,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LectureSummary {
    pub group_id: String,
    pub title: String,
    pub main_category: String,
    pub sub_category: String,
    pub sub_sub_category: String,
    pub upload_date: String,
    /// Availability for every supported language code.
    pub languages: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LectureListResponse {
    pub success: bool,
    pub videos: Vec<LectureSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LectureListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LanguageBreakdown {
    pub language_name: String,
    pub video_url: String,
    pub file_size: u64,
    pub duration: String,
    pub resolution: String,
    pub fps: f64,
    pub upload_date: String,
    pub is_original: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LectureDetailResponse {
    pub group_id: String,
    pub group_name: String,
    pub content_description: String,
    pub category_path: String,
    pub search_path: String,
    pub upload_date: String,
    pub created_at: String,
    pub supported_languages: Vec<LanguageCode>,
    pub supported_languages_count: usize,
    pub total_file_size: u64,
    pub watch_link: String,
    pub qr_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub tags: Vec<String>,
    pub language_breakdown: BTreeMap<String, LanguageBreakdown>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WatchQuery {
    /// Requested language code; unknown codes fall back to Korean.
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LanguageOption {
    pub code: LanguageCode,
    pub name: String,
    pub available: bool,
    pub selected: bool,
}

/// What the player needs: which language is served, whether that was a
/// fallback, and the video to play.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WatchResponse {
    pub group_id: String,
    pub group_name: String,
    pub content_description: String,
    pub category_path: String,
    /// Raw `lang` value as received, if any.
    pub requested_language: Option<String>,
    pub actual_language: LanguageCode,
    pub fell_back: bool,
    pub video_url: String,
    pub content_type: String,
    pub thumbnail_url: Option<String>,
    pub watch_link: String,
    pub languages: Vec<LanguageOption>,
}

impl WatchResponse {
    pub fn resolution(&self) -> Resolution {
        Resolution {
            actual: self.actual_language,
            fell_back: self.fell_back,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateRequest {
    pub text: String,
    /// Defaults to every translation target.
    pub target_languages: Option<Vec<String>>,
}
