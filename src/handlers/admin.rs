use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};

use crate::{
    dto::lecture::{LanguageUploadResponse, LectureDetailResponse, LectureListQuery, LectureListResponse},
    error::{ErrorResponse, PortalError, PortalResult},
    handlers::upload::stage_multipart,
    models::language::LanguageCode,
    AppState,
};

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 200;

/// Recently uploaded lectures with per-language availability
#[utoipa::path(
    get,
    path = "/api/admin/videos",
    tag = "admin",
    params(LectureListQuery),
    responses(
        (status = 200, description = "Lectures retrieved successfully", body = LectureListResponse),
        (status = 401, description = "Missing or invalid admin token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<LectureListQuery>,
) -> PortalResult<Json<LectureListResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let videos = state.lectures.list_recent(limit).await?;

    Ok(Json(LectureListResponse {
        success: true,
        total: videos.len(),
        videos,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/videos/{group_id}",
    tag = "admin",
    params(
        ("group_id" = String, Path, description = "Lecture group id")
    ),
    responses(
        (status = 200, description = "Lecture details", body = LectureDetailResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse)
    )
)]
pub async fn video_detail(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> PortalResult<Json<LectureDetailResponse>> {
    Ok(Json(state.lectures.lecture_detail(&group_id).await?))
}

/// Upload a translated video for an existing lecture
///
/// Multipart fields: `group_id`, `language_code` and the video as `file`.
#[utoipa::path(
    post,
    path = "/api/admin/upload_language_video",
    tag = "admin",
    request_body(content = String, content_type = "multipart/form-data", description = "group_id, language_code, file"),
    responses(
        (status = 200, description = "Language video stored", body = LanguageUploadResponse),
        (status = 400, description = "Invalid form or file", body = ErrorResponse),
        (status = 404, description = "Lecture not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
pub async fn upload_language_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> PortalResult<Json<LanguageUploadResponse>> {
    let mut form = stage_multipart(multipart, state.config.upload.max_file_size).await?;

    let group_id = form.text("group_id");
    let language_code = form.text("language_code");
    if group_id.is_empty() || language_code.is_empty() {
        return Err(PortalError::Validation("그룹 ID와 언어 코드가 필요합니다.".to_string()));
    }

    let language = LanguageCode::parse_lenient(&language_code)
        .ok_or_else(|| PortalError::Validation(format!("지원하지 않는 언어 코드입니다: {}", language_code)))?;
    let video = form
        .take_file("file")
        .ok_or_else(|| PortalError::Validation("동영상 파일을 선택해주세요.".to_string()))?;

    let response = state.lectures.add_language_video(&group_id, language, &video).await?;
    Ok(Json(response))
}
