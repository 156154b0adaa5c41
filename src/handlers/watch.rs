use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    dto::lecture::{WatchQuery, WatchResponse},
    error::{ErrorResponse, PortalResult},
    models::category::CategoryTree,
    AppState,
};

/// Resolve which language version a watch-link visit plays
#[utoipa::path(
    get,
    path = "/api/watch/{group_id}",
    tag = "watch",
    params(
        ("group_id" = String, Path, description = "Lecture group id from the watch link"),
        WatchQuery
    ),
    responses(
        (status = 200, description = "Video selected for playback", body = WatchResponse),
        (status = 404, description = "Lecture not found or not yet published", body = ErrorResponse)
    )
)]
pub async fn watch_info(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<WatchQuery>,
) -> PortalResult<Json<WatchResponse>> {
    let view = state.lectures.watch(&group_id, query.lang.as_deref()).await?;
    Ok(Json(view))
}

/// Category tree offered by the upload form
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "watch",
    responses(
        (status = 200, description = "Main, sub and leaf categories", body = CategoryTree)
    )
)]
pub async fn categories() -> Json<CategoryTree> {
    Json(CategoryTree::standard())
}
