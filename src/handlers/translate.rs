use axum::{extract::State, Json};
use std::collections::BTreeMap;

use crate::{
    dto::lecture::TranslateRequest,
    error::{ErrorResponse, PortalError, PortalResult},
    models::language::LanguageCode,
    AppState,
};

/// Translate a Korean lecture title into filename-safe titles
///
/// Returns a map from language code to title for the requested targets.
/// Unknown codes in `target_languages` are ignored.
#[utoipa::path(
    post,
    path = "/api/translate",
    tag = "translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Titles keyed by language code", body = BTreeMap<String, String>),
        (status = 400, description = "No text to translate", body = ErrorResponse)
    )
)]
pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> PortalResult<Json<BTreeMap<String, String>>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(PortalError::Validation("번역할 텍스트가 없습니다.".to_string()));
    }

    let targets: Vec<LanguageCode> = match &request.target_languages {
        Some(codes) => codes.iter().filter_map(|code| LanguageCode::parse_lenient(code)).collect(),
        None => LanguageCode::TRANSLATION_TARGETS.to_vec(),
    };

    let translations = state.lectures.translator().translate_title(text).await;
    let filtered = targets
        .into_iter()
        .filter_map(|language| {
            translations
                .get(&language)
                .map(|title| (language.code().to_string(), title.clone()))
        })
        .collect();

    Ok(Json(filtered))
}
