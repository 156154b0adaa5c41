use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::collections::BTreeMap;

use crate::{
    dto::lecture::{UploadOutcome, WatchQuery, WatchResponse},
    error::PortalError,
    handlers::upload::stage_multipart,
    models::{category::CategoryTree, lecture::CategoryPath},
    services::lecture::NewLecture,
    utils::text::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS},
    AppState,
};

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub error_code: u16,
    pub error_message: String,
}

#[derive(Template)]
#[template(path = "upload_form.html")]
pub struct UploadFormTemplate {
    pub categories: CategoryTree,
    pub max_size_gb: u64,
    pub video_accept: String,
    pub image_accept: String,
}

#[derive(Template)]
#[template(path = "upload_success.html")]
pub struct UploadSuccessTemplate {
    pub group_name: String,
    pub outcome: UploadOutcome,
    pub resolution: String,
    pub qr_url: String,
    pub thumbnail_url: String,
}

#[derive(Template)]
#[template(path = "watch.html")]
pub struct WatchTemplate {
    pub view: WatchResponse,
    /// Native name of the requested language, empty when unrecognised.
    pub requested_label: String,
    pub poster: String,
}

fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

fn error_page(status: StatusCode, message: impl Into<String>) -> Response {
    let template = ErrorTemplate {
        error_code: status.as_u16(),
        error_message: message.into(),
    };
    (status, render(&template)).into_response()
}

/// Service errors shown as the HTML error page instead of JSON.
pub struct PageError(pub PortalError);

impl From<PortalError> for PageError {
    fn from(err: PortalError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.log();
        let status = self.0.status();
        let message = match &self.0 {
            PortalError::NotFound(_) | PortalError::NotPublished(_) => "강의를 찾을 수 없습니다.".to_string(),
            PortalError::FileTooLarge { limit_gb } => format!("파일 크기가 {}GB를 초과합니다.", limit_gb),
            PortalError::Validation(message) => message.clone(),
            other => other.public_message(),
        };
        error_page(status, message)
    }
}

pub async fn upload_form(State(state): State<AppState>) -> Response {
    render(&UploadFormTemplate {
        categories: CategoryTree::standard(),
        max_size_gb: state.config.upload.max_file_size / (1024 * 1024 * 1024),
        video_accept: VIDEO_EXTENSIONS.join(","),
        image_accept: IMAGE_EXTENSIONS.join(","),
    })
}

pub async fn upload_lecture(State(state): State<AppState>, multipart: Multipart) -> Result<Response, PageError> {
    let mut form = stage_multipart(multipart, state.config.upload.max_file_size).await?;

    let translated_titles = match form.text("translated_filenames").as_str() {
        "" => BTreeMap::new(),
        raw => serde_json::from_str::<BTreeMap<String, String>>(raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed translated_filenames: {}", e);
            BTreeMap::new()
        }),
    };

    let video = form
        .take_file("file")
        .ok_or_else(|| PortalError::Validation("동영상 파일을 선택해주세요.".to_string()))?;

    let lecture = NewLecture {
        group_name: form.text("group_name"),
        category: CategoryPath::new(
            form.text("main_category"),
            form.text("sub_category"),
            form.text("sub_sub_category"),
        ),
        content_description: form.text("content_description"),
        translated_titles,
        video,
        thumbnail: form.take_file("thumbnail"),
    };
    let group_name = lecture.group_name.clone();

    let outcome = state.lectures.publish_lecture(lecture).await?;

    Ok(render(&UploadSuccessTemplate {
        group_name,
        resolution: outcome.metadata.resolution(),
        qr_url: outcome.qr_url.clone().unwrap_or_default(),
        thumbnail_url: outcome.thumbnail_url.clone().unwrap_or_default(),
        outcome,
    }))
}

/// Target of every QR code. The optional `lang` parameter only selects the
/// video; the link itself never changes.
pub async fn watch_page(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<WatchQuery>,
) -> Result<Response, PageError> {
    let view = state.lectures.watch(&group_id, query.lang.as_deref()).await?;

    let requested_label = query
        .lang
        .as_deref()
        .and_then(crate::models::LanguageCode::parse_lenient)
        .map(|language| language.native_name().to_string())
        .unwrap_or_default();

    Ok(render(&WatchTemplate {
        poster: view.thumbnail_url.clone().unwrap_or_default(),
        requested_label,
        view,
    }))
}

pub async fn not_found() -> Response {
    error_page(StatusCode::NOT_FOUND, "페이지를 찾을 수 없습니다.")
}
