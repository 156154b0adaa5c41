use axum::body::Bytes;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::lecture::{
        LanguageBreakdown, LanguageOption, LanguageUploadResponse, LectureDetailResponse, LectureSummary,
        UploadOutcome, WatchResponse,
    },
    error::{PortalError, PortalResult},
    models::{
        language::LanguageCode,
        lecture::{CategoryPath, LectureGroup, VideoAsset, VideoMetadata},
    },
    services::{
        media::MediaProbe,
        qr,
        repository::LectureRepository,
        resolver::{self, ResolveError},
        storage::ObjectStorage,
        translation::TitleTranslator,
    },
    utils::text::{
        extension_of, extract_tags, image_content_type, make_filename_safe, safe_group_name,
        video_content_type, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS,
    },
};

/// An uploaded file written to a temporary location.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub path: PathBuf,
    pub original_name: String,
    pub size: u64,
}

impl StagedFile {
    pub fn extension(&self) -> String {
        extension_of(&self.original_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Image,
}

#[derive(Debug, Clone)]
pub struct NewLecture {
    pub group_name: String,
    pub category: CategoryPath,
    pub content_description: String,
    /// Filename titles per language code; computed when empty.
    pub translated_titles: BTreeMap<String, String>,
    pub video: StagedFile,
    pub thumbnail: Option<StagedFile>,
}

/// Lecture publishing, translation uploads and playback lookup.
pub struct LectureService {
    repo: Arc<dyn LectureRepository>,
    storage: Arc<dyn ObjectStorage>,
    probe: MediaProbe,
    translator: TitleTranslator,
    config: Arc<AppConfig>,
}

impl LectureService {
    pub fn new(
        repo: Arc<dyn LectureRepository>,
        storage: Arc<dyn ObjectStorage>,
        probe: MediaProbe,
        translator: TitleTranslator,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            repo,
            storage,
            probe,
            translator,
            config,
        }
    }

    pub fn translator(&self) -> &TitleTranslator {
        &self.translator
    }

    pub fn storage_provider(&self) -> &'static str {
        self.storage.provider_name()
    }

    pub fn validate_file(&self, file: &StagedFile, kind: FileKind) -> PortalResult<()> {
        let extension = file.extension();
        let allowed: &[&str] = match kind {
            FileKind::Video => &VIDEO_EXTENSIONS,
            FileKind::Image => &IMAGE_EXTENSIONS,
        };

        if !allowed.contains(&extension.as_str()) {
            return Err(PortalError::Validation(format!(
                "Unsupported file type '{}' for {}",
                extension,
                file.original_name
            )));
        }
        if file.size == 0 {
            return Err(PortalError::Validation(format!("{} is empty", file.original_name)));
        }
        if file.size > self.config.upload.max_file_size {
            return Err(PortalError::FileTooLarge {
                limit_gb: self.config.upload.max_file_size / (1024 * 1024 * 1024),
            });
        }
        Ok(())
    }

    fn validate_new_lecture(&self, lecture: &NewLecture) -> PortalResult<()> {
        if lecture.group_name.trim().is_empty()
            || !lecture.category.is_complete()
            || lecture.content_description.trim().is_empty()
        {
            return Err(PortalError::Validation("모든 필수 필드를 입력해주세요.".to_string()));
        }
        let min_chars = self.config.upload.min_description_chars;
        if lecture.content_description.trim().chars().count() < min_chars {
            return Err(PortalError::Validation(format!(
                "강의 내용은 {}글자 이상 입력해주세요.",
                min_chars
            )));
        }
        Ok(())
    }

    /// Uploads the Korean original and publishes the lecture under a new id.
    pub async fn publish_lecture(&self, lecture: NewLecture) -> PortalResult<UploadOutcome> {
        self.validate_new_lecture(&lecture)?;
        self.validate_file(&lecture.video, FileKind::Video)?;
        if let Some(thumbnail) = &lecture.thumbnail {
            self.validate_file(thumbnail, FileKind::Image)?;
        }

        let metadata = self.probe.extract_metadata(&lecture.video.path).await;
        tracing::info!(
            "Publishing lecture '{}' ({} bytes, {})",
            lecture.group_name,
            metadata.file_size,
            metadata.duration_string
        );

        let now = Utc::now();
        let group_id = Uuid::new_v4().simple().to_string();
        let safe_name = safe_group_name(lecture.group_name.trim());

        let translated_titles = if lecture.translated_titles.is_empty() {
            self.translator
                .translate_title(lecture.group_name.trim())
                .await
                .into_iter()
                .map(|(language, title)| (language.code().to_string(), title))
                .collect()
        } else {
            sanitize_titles(lecture.translated_titles.clone())
        };

        let mut group = LectureGroup {
            group_id: group_id.clone(),
            group_name: lecture.group_name.trim().to_string(),
            content_description: lecture.content_description.trim().to_string(),
            search_path: lecture.category.search_path(),
            category: lecture.category.clone(),
            base_folder: format!("videos/{}/{}_{}", now.format("%Y/%m"), group_id, safe_name),
            storage_provider: self.storage.provider_name().to_string(),
            bucket_name: self.storage.bucket().to_string(),
            upload_date: now.format("%Y%m%d").to_string(),
            created_at: now,
            updated_at: now,
            supported_languages: BTreeSet::from([LanguageCode::DEFAULT]),
            watch_link: self.config.watch_link(&group_id),
            qr_s3_key: None,
            qr_url: None,
            thumbnail_s3_key: None,
            thumbnail_url: None,
            translated_titles,
            tags: extract_tags(&lecture.content_description),
            total_file_size: metadata.file_size,
        };

        let mut uploaded_keys = Vec::new();
        let uploaded = self
            .upload_lecture_objects(&lecture, &mut group, metadata.clone(), &mut uploaded_keys)
            .await;
        let asset = match uploaded {
            Ok(asset) => asset,
            Err(e) => {
                self.discard_objects(&uploaded_keys).await;
                return Err(e);
            }
        };

        // The Korean asset goes in first so a stored group is always watchable
        if let Err(e) = self.repo.upsert_video(&asset).await {
            self.discard_objects(&uploaded_keys).await;
            return Err(PortalError::Database(e));
        }
        if let Err(e) = self.repo.insert_group(&group).await {
            if let Err(cleanup) = self.repo.delete_video(&group_id, LanguageCode::DEFAULT).await {
                tracing::warn!("Failed to remove video record of {}: {:#}", group_id, cleanup);
            }
            self.discard_objects(&uploaded_keys).await;
            return Err(PortalError::Database(e));
        }

        tracing::info!("Lecture {} published at {}", group_id, group.watch_link);

        Ok(UploadOutcome {
            group_id,
            video_url: asset.video_url,
            watch_link: group.watch_link,
            qr_url: group.qr_url,
            thumbnail_url: group.thumbnail_url,
            metadata,
        })
    }

    /// Stores the Korean video, then the optional thumbnail and the QR code.
    /// Only the video is required; every key written is pushed to `uploaded`.
    async fn upload_lecture_objects(
        &self,
        lecture: &NewLecture,
        group: &mut LectureGroup,
        metadata: VideoMetadata,
        uploaded: &mut Vec<String>,
    ) -> PortalResult<VideoAsset> {
        let safe_name = safe_group_name(&group.group_name);
        let ko_title = group.title_for(LanguageCode::DEFAULT, &safe_name);

        let extension = lecture.video.extension();
        let video_key = group.video_key(&ko_title, LanguageCode::DEFAULT, &extension);
        let content_type = video_content_type(&extension);
        let video_url = self
            .storage
            .put_file(&video_key, &lecture.video.path, content_type)
            .await
            .map_err(PortalError::Storage)?;
        uploaded.push(video_key.clone());

        if let Some(thumbnail) = &lecture.thumbnail {
            let extension = thumbnail.extension();
            let key = group.thumbnail_key(&ko_title, &extension);
            match self
                .storage
                .put_file(&key, &thumbnail.path, image_content_type(&extension))
                .await
            {
                Ok(url) => {
                    uploaded.push(key.clone());
                    group.thumbnail_s3_key = Some(key);
                    group.thumbnail_url = Some(url);
                }
                Err(e) => tracing::warn!("Thumbnail upload failed for {}: {:#}", group.group_id, e),
            }
        }

        // The QR code only ever encodes the language-independent watch link
        let caption = qr::caption_lines(&group.group_name, &group.category);
        match qr::render_svg(&group.watch_link, &caption) {
            Ok(svg) => {
                let key = group.qr_key(&ko_title);
                match self.storage.put_object(&key, Bytes::from(svg), "image/svg+xml").await {
                    Ok(url) => {
                        uploaded.push(key.clone());
                        group.qr_s3_key = Some(key);
                        group.qr_url = Some(url);
                    }
                    Err(e) => tracing::warn!("QR upload failed for {}: {:#}", group.group_id, e),
                }
            }
            Err(e) => tracing::warn!("QR generation failed for {}: {:#}", group.group_id, e),
        }

        Ok(VideoAsset {
            group_id: group.group_id.clone(),
            language_code: LanguageCode::DEFAULT,
            video_s3_key: video_key,
            video_url,
            content_type: content_type.to_string(),
            metadata,
            upload_date: group.upload_date.clone(),
            created_at: group.created_at,
            is_original: true,
        })
    }

    async fn discard_objects(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.storage.delete_object(key).await {
                tracing::warn!("Failed to remove orphaned object {}: {:#}", key, e);
            }
        }
    }

    /// Adds or replaces a translated video. The Korean original cannot be
    /// replaced through this path.
    pub async fn add_language_video(
        &self,
        group_id: &str,
        language: LanguageCode,
        video: &StagedFile,
    ) -> PortalResult<LanguageUploadResponse> {
        if language.is_default() {
            return Err(PortalError::Validation(
                "한국어 원본 영상은 교체할 수 없습니다.".to_string(),
            ));
        }
        self.validate_file(video, FileKind::Video)?;

        let group = self
            .repo
            .find_group(group_id)
            .await
            .map_err(PortalError::Database)?
            .ok_or_else(|| PortalError::NotFound(group_id.to_string()))?;

        let metadata = self.probe.extract_metadata(&video.path).await;
        let safe_name = safe_group_name(&group.group_name);
        let title = group.title_for(language, &safe_name);
        let extension = video.extension();
        let key = group.video_key(&title, language, &extension);
        let content_type = video_content_type(&extension);

        let video_url = self
            .storage
            .put_file(&key, &video.path, content_type)
            .await
            .map_err(PortalError::Storage)?;

        let asset = VideoAsset {
            group_id: group.group_id.clone(),
            language_code: language,
            video_s3_key: key,
            video_url: video_url.clone(),
            content_type: content_type.to_string(),
            metadata: metadata.clone(),
            upload_date: Utc::now().format("%Y%m%d").to_string(),
            created_at: Utc::now(),
            is_original: false,
        };

        self.repo.upsert_video(&asset).await.map_err(PortalError::Database)?;
        self.repo
            .add_language(&group.group_id, language)
            .await
            .map_err(PortalError::Database)?;

        tracing::info!("Added {} video to lecture {}", language, group.group_id);

        Ok(LanguageUploadResponse {
            success: true,
            message: format!("{} 언어 영상이 성공적으로 업로드되었습니다", language),
            group_id: group.group_id,
            language_code: language,
            video_url,
            metadata,
        })
    }

    pub async fn list_recent(&self, limit: usize) -> PortalResult<Vec<LectureSummary>> {
        let groups = self.repo.list_recent(limit).await.map_err(PortalError::Database)?;

        Ok(groups
            .into_iter()
            .map(|group| LectureSummary {
                languages: LanguageCode::ALL
                    .iter()
                    .map(|language| {
                        (language.code().to_string(), group.supported_languages.contains(language))
                    })
                    .collect(),
                group_id: group.group_id,
                title: group.group_name,
                main_category: group.category.main,
                sub_category: group.category.sub,
                sub_sub_category: group.category.leaf,
                upload_date: group.upload_date,
            })
            .collect())
    }

    pub async fn lecture_detail(&self, group_id: &str) -> PortalResult<LectureDetailResponse> {
        let group = self.find_group(group_id).await?;
        let videos = self.repo.find_videos(group_id).await.map_err(PortalError::Database)?;

        let language_breakdown = videos
            .iter()
            .map(|asset| {
                (
                    asset.language_code.code().to_string(),
                    LanguageBreakdown {
                        language_name: asset.language_code.native_name().to_string(),
                        video_url: asset.video_url.clone(),
                        file_size: asset.metadata.file_size,
                        duration: asset.metadata.duration_string.clone(),
                        resolution: asset.metadata.resolution(),
                        fps: asset.metadata.fps,
                        upload_date: asset.upload_date.clone(),
                        is_original: asset.is_original,
                    },
                )
            })
            .collect();

        Ok(LectureDetailResponse {
            group_id: group.group_id,
            group_name: group.group_name,
            content_description: group.content_description,
            category_path: group.category.display(),
            search_path: group.search_path,
            upload_date: group.upload_date,
            created_at: group.created_at.to_rfc3339(),
            supported_languages_count: group.supported_languages.len(),
            supported_languages: group.supported_languages.into_iter().collect(),
            total_file_size: group.total_file_size,
            watch_link: group.watch_link,
            qr_url: group.qr_url,
            thumbnail_url: group.thumbnail_url,
            tags: group.tags,
            language_breakdown,
        })
    }

    async fn find_group(&self, group_id: &str) -> PortalResult<LectureGroup> {
        self.repo
            .find_group(group_id)
            .await
            .map_err(PortalError::Database)?
            .ok_or_else(|| PortalError::NotFound(group_id.to_string()))
    }

    /// Picks the video to play for a watch-link visit.
    pub async fn watch(&self, group_id: &str, requested: Option<&str>) -> PortalResult<WatchResponse> {
        let group = self.find_group(group_id).await?;
        if !group.is_published() {
            return Err(PortalError::NotPublished(group_id.to_string()));
        }

        let videos = self.repo.find_videos(group_id).await.map_err(PortalError::Database)?;
        let available: BTreeSet<LanguageCode> = videos.iter().map(|asset| asset.language_code).collect();

        let resolution = resolver::resolve_query(requested, &available).map_err(|e| match e {
            ResolveError::MissingDefault => PortalError::NotPublished(group_id.to_string()),
        })?;

        let asset = videos
            .iter()
            .find(|asset| asset.language_code == resolution.actual)
            .ok_or_else(|| PortalError::NotPublished(group_id.to_string()))?;

        if resolution.fell_back {
            tracing::debug!(
                "Lecture {}: requested {:?}, serving {}",
                group_id,
                requested,
                resolution.actual
            );
        }

        let languages = LanguageCode::ALL
            .iter()
            .map(|language| LanguageOption {
                code: *language,
                name: language.native_name().to_string(),
                available: available.contains(language),
                selected: *language == resolution.actual,
            })
            .collect();

        Ok(WatchResponse {
            group_id: group.group_id,
            group_name: group.group_name,
            content_description: group.content_description,
            category_path: group.category.display(),
            requested_language: requested.map(str::to_string),
            actual_language: resolution.actual,
            fell_back: resolution.fell_back,
            video_url: asset.video_url.clone(),
            content_type: asset.content_type.clone(),
            thumbnail_url: group.thumbnail_url,
            watch_link: group.watch_link,
            languages,
        })
    }
}

/// Client-supplied titles end up in object keys; keep only known languages
/// and make every value filename-safe.
fn sanitize_titles(titles: BTreeMap<String, String>) -> BTreeMap<String, String> {
    titles
        .into_iter()
        .filter_map(|(code, title)| {
            let language = LanguageCode::parse_lenient(&code)?;
            Some((language.code().to_string(), make_filename_safe(&title)))
        })
        .collect()
}
