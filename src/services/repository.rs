use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    models::{language::LanguageCode, lecture::{LectureGroup, VideoAsset}},
    services::database::Database,
};

/// Persistence for lectures and their per-language videos.
#[async_trait]
pub trait LectureRepository: Send + Sync {
    async fn insert_group(&self, group: &LectureGroup) -> Result<()>;

    async fn find_group(&self, group_id: &str) -> Result<Option<LectureGroup>>;

    /// Newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<LectureGroup>>;

    /// Inserts or replaces the video for `(asset.group_id, asset.language_code)`.
    async fn upsert_video(&self, asset: &VideoAsset) -> Result<()>;

    async fn find_videos(&self, group_id: &str) -> Result<Vec<VideoAsset>>;

    /// Removes one language's video row. Used to roll back a publish whose
    /// group insert failed.
    async fn delete_video(&self, group_id: &str, language: LanguageCode) -> Result<()>;

    /// Adds a language to the group's supported set. Languages are never removed.
    async fn add_language(&self, group_id: &str, language: LanguageCode) -> Result<()>;
}

const GROUPS_COLLECTION: &str = "lecture_groups";
const VIDEOS_COLLECTION: &str = "language_videos";

pub struct MongoLectureRepository {
    groups: Collection<LectureGroup>,
    videos: Collection<VideoAsset>,
}

impl MongoLectureRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            groups: db.database.collection(GROUPS_COLLECTION),
            videos: db.database.collection(VIDEOS_COLLECTION),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = IndexOptions::builder().unique(true).build();

        self.groups
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "group_id": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;
        self.groups
            .create_index(IndexModel::builder().keys(doc! { "created_at": -1 }).build(), None)
            .await?;
        self.groups
            .create_index(IndexModel::builder().keys(doc! { "search_path": 1 }).build(), None)
            .await?;
        self.videos
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "group_id": 1, "language_code": 1 })
                    .options(unique)
                    .build(),
                None,
            )
            .await?;

        tracing::info!("MongoDB indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl LectureRepository for MongoLectureRepository {
    async fn insert_group(&self, group: &LectureGroup) -> Result<()> {
        self.groups.insert_one(group, None).await?;
        Ok(())
    }

    async fn find_group(&self, group_id: &str) -> Result<Option<LectureGroup>> {
        Ok(self.groups.find_one(doc! { "group_id": group_id }, None).await?)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<LectureGroup>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit as i64)
            .build();

        let cursor = self.groups.find(doc! {}, options).await?;
        let groups: Vec<LectureGroup> = cursor.try_collect().await?;
        Ok(groups)
    }

    async fn upsert_video(&self, asset: &VideoAsset) -> Result<()> {
        let filter = doc! {
            "group_id": asset.group_id.as_str(),
            "language_code": asset.language_code.code(),
        };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.videos.replace_one(filter, asset, options).await?;
        Ok(())
    }

    async fn find_videos(&self, group_id: &str) -> Result<Vec<VideoAsset>> {
        let cursor = self.videos.find(doc! { "group_id": group_id }, None).await?;
        let mut videos: Vec<VideoAsset> = cursor.try_collect().await?;
        videos.sort_by_key(|asset| asset.language_code);
        Ok(videos)
    }

    async fn delete_video(&self, group_id: &str, language: LanguageCode) -> Result<()> {
        self.videos
            .delete_one(doc! { "group_id": group_id, "language_code": language.code() }, None)
            .await?;
        Ok(())
    }

    async fn add_language(&self, group_id: &str, language: LanguageCode) -> Result<()> {
        let result = self
            .groups
            .update_one(
                doc! { "group_id": group_id },
                doc! {
                    "$addToSet": { "supported_languages": language.code() },
                    "$set": { "updated_at": Utc::now().timestamp_millis() },
                },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            anyhow::bail!("lecture group {} does not exist", group_id);
        }
        Ok(())
    }
}

/// Process-local repository for development and tests.
#[derive(Default)]
pub struct MemoryLectureRepository {
    groups: RwLock<HashMap<String, LectureGroup>>,
    videos: RwLock<HashMap<(String, LanguageCode), VideoAsset>>,
}

impl MemoryLectureRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LectureRepository for MemoryLectureRepository {
    async fn insert_group(&self, group: &LectureGroup) -> Result<()> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(&group.group_id) {
            anyhow::bail!("lecture group {} already exists", group.group_id);
        }
        groups.insert(group.group_id.clone(), group.clone());
        Ok(())
    }

    async fn find_group(&self, group_id: &str) -> Result<Option<LectureGroup>> {
        Ok(self.groups.read().await.get(group_id).cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<LectureGroup>> {
        let mut groups: Vec<LectureGroup> = self.groups.read().await.values().cloned().collect();
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        groups.truncate(limit);
        Ok(groups)
    }

    async fn upsert_video(&self, asset: &VideoAsset) -> Result<()> {
        self.videos
            .write()
            .await
            .insert((asset.group_id.clone(), asset.language_code), asset.clone());
        Ok(())
    }

    async fn find_videos(&self, group_id: &str) -> Result<Vec<VideoAsset>> {
        let mut videos: Vec<VideoAsset> = self
            .videos
            .read()
            .await
            .values()
            .filter(|asset| asset.group_id == group_id)
            .cloned()
            .collect();
        videos.sort_by_key(|asset| asset.language_code);
        Ok(videos)
    }

    async fn delete_video(&self, group_id: &str, language: LanguageCode) -> Result<()> {
        self.videos
            .write()
            .await
            .remove(&(group_id.to_string(), language));
        Ok(())
    }

    async fn add_language(&self, group_id: &str, language: LanguageCode) -> Result<()> {
        let mut groups = self.groups.write().await;
        let group = groups
            .get_mut(group_id)
            .ok_or_else(|| anyhow::anyhow!("lecture group {} does not exist", group_id))?;
        group.supported_languages.insert(language);
        group.updated_at = Utc::now();
        Ok(())
    }
}
