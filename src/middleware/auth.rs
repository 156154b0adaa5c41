use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::{error::PortalError, AppState};

const TOKEN_COOKIE: &str = "admin_token";

/// Guards admin routes with the configured API token. Without a configured
/// token every request passes.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.config.admin.api_token.as_deref().filter(|t| !t.is_empty()) else {
        return next.run(request).await;
    };

    match extract_token_from_headers(request.headers()) {
        Some(token) if tokens_match(&token, expected) => next.run(request).await,
        Some(_) => {
            tracing::warn!("Rejected admin request to {} with invalid token", request.uri().path());
            PortalError::Unauthorized.into_response()
        }
        None => {
            tracing::debug!("No admin token on request to {}", request.uri().path());
            PortalError::Unauthorized.into_response()
        }
    }
}

/// Bearer token from `Authorization`, falling back to the `admin_token` cookie.
pub fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    let cookies = headers.get(header::COOKIE).and_then(|v| v.to_str().ok())?;
    cookies
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
}

// Digests have equal length, so the comparison does not leak the token length
fn tokens_match(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
