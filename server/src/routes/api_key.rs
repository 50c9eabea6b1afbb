//! `X-API-Key` extractor.

use agent::relay::{API_KEY_HEADER, ErrorBody};
use axum::Json;
use axum::http::StatusCode;
use axum::http::request::Parts;

/// Caller-supplied provider credential, forwarded as is.
/// Use as a handler parameter to require the header.
pub struct ApiKey(pub String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl<S> axum::extract::FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();
        if key.is_empty() {
            tracing::warn!("request without API key");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody { error: "API key required".into(), success: false }),
            ));
        }
        Ok(Self(key.to_owned()))
    }
}
