//! Picks which language version of a lecture to play.
//!
//! A requested language is honoured only when
//! a video exists for it, otherwise the Korean original is played. No other
//! language is ever substituted.

use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::language::LanguageCode;

/// Outcome of resolving a viewer's language request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Resolution {
    pub actual: LanguageCode,
    pub fell_back: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Callers must only resolve against lectures that have a Korean video.
    #[error("available languages do not include the default language ({})", LanguageCode::DEFAULT)]
    MissingDefault,
}

pub fn resolve(
    requested: Option<LanguageCode>,
    available: &BTreeSet<LanguageCode>,
) -> Result<Resolution, ResolveError> {
    if !available.contains(&LanguageCode::DEFAULT) {
        return Err(ResolveError::MissingDefault);
    }

    match requested {
        Some(language) if available.contains(&language) => Ok(Resolution {
            actual: language,
            fell_back: false,
        }),
        _ => Ok(Resolution {
            actual: LanguageCode::DEFAULT,
            fell_back: true,
        }),
    }
}

/// Resolves a raw `lang` query value. Empty or unrecognised codes are treated
/// the same as a language without a video.
pub fn resolve_query(
    raw: Option<&str>,
    available: &BTreeSet<LanguageCode>,
) -> Result<Resolution, ResolveError> {
    resolve(raw.and_then(LanguageCode::parse_lenient), available)
}
