use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::error::{Error, Result};

/// Pulls the bearer credential the presentation layer obtained at log-in.
/// The token is opaque here: the coordination backend is the one that
/// accepts or refuses it.
pub fn bearer_token(headers: &HeaderMap) -> Result<String> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Err(Error::Unauthorized("missing_authorization".to_string()));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(Error::Unauthorized("bad_authorization".to_string()));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(Error::Unauthorized("unsupported_scheme".to_string()));
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(Error::Unauthorized("missing_token".to_string()));
    }
    Ok(token.to_string())
}
