pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::AppConfig;
pub use error::{PortalError, PortalResult};

use config::{DatabaseProvider, StorageProvider};
use handlers::{admin, health, pages, translate, watch};
use services::{
    database::Database,
    lecture::LectureService,
    media::MediaProbe,
    repository::{LectureRepository, MemoryLectureRepository, MongoLectureRepository},
    storage::{GatewayStorage, MemoryStorage, ObjectStorage},
    translation::TitleTranslator,
};

/// Room for multipart framing and text fields on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub lectures: Arc<LectureService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn LectureRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let translator = TitleTranslator::new(&config.translate)?;
        let probe = MediaProbe::new(config.media.ffprobe_path.clone());
        let lectures = LectureService::new(repo, storage, probe, translator, config.clone());

        Ok(Self {
            lectures: Arc::new(lectures),
            config,
        })
    }
}

/// Wires the configured repository and storage backends.
pub async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let repo: Arc<dyn LectureRepository> = match config.database.provider {
        DatabaseProvider::Mongo => {
            let database = Database::new(&config.database.url, &config.database.name).await?;
            let repo = MongoLectureRepository::new(&database);
            repo.ensure_indexes().await?;
            Arc::new(repo)
        }
        DatabaseProvider::Memory => {
            tracing::warn!("Using in-memory lecture repository, data is lost on restart");
            Arc::new(MemoryLectureRepository::new())
        }
    };

    let storage: Arc<dyn ObjectStorage> = match config.storage.provider {
        StorageProvider::Gateway => Arc::new(GatewayStorage::new(&config.storage)?),
        StorageProvider::Memory => {
            tracing::warn!("Using in-memory object storage, uploads are not persisted");
            Arc::new(MemoryStorage::new(&config.storage))
        }
    };

    AppState::new(config, repo, storage)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        watch::watch_info,
        watch::categories,
        translate::translate,
        admin::list_videos,
        admin::video_detail,
        admin::upload_language_video,
        health::health,
    ),
    components(schemas(
        dto::lecture::WatchResponse,
        dto::lecture::LanguageOption,
        dto::lecture::LectureSummary,
        dto::lecture::LectureListResponse,
        dto::lecture::LectureDetailResponse,
        dto::lecture::LanguageBreakdown,
        dto::lecture::LanguageUploadResponse,
        dto::lecture::TranslateRequest,
        models::language::LanguageCode,
        models::lecture::VideoMetadata,
        models::category::CategoryTree,
        models::category::MainCategory,
        models::category::SubCategory,
        error::ErrorResponse,
        health::HealthResponse,
    )),
    tags(
        (name = "watch", description = "Watch-link playback"),
        (name = "translate", description = "Title translation"),
        (name = "admin", description = "Lecture administration"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max((state.config.upload.max_file_size + MULTIPART_OVERHEAD) as usize);

    // Admin routes - token protected when a token is configured
    let admin_routes = Router::new()
        .route("/upload", post(pages::upload_lecture))
        .route("/api/admin/videos", get(admin::list_videos))
        .route("/api/admin/videos/:group_id", get(admin::video_detail))
        .route("/api/admin/upload_language_video", post(admin::upload_language_video))
        .layer(body_limit)
        .layer(axum_middleware::from_fn_with_state(state.clone(), middleware::require_admin));

    // Public routes - watch links are printed as QR codes
    let public_routes = Router::new()
        .route("/", get(pages::upload_form))
        .route("/watch/:group_id", get(pages::watch_page))
        .route("/api/watch/:group_id", get(watch::watch_info))
        .route("/api/categories", get(watch::categories))
        .route("/api/translate", post(translate::translate))
        .route("/health", get(health::health));

    let api_docs = SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(admin_routes)
        .merge(public_routes)
        .merge(api_docs)
        .fallback(pages::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
