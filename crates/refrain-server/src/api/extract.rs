//! Request extractors

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::ApiError;

/// Header carrying the caller's opaque user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity. There is no authentication; the id is taken as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::validation("Missing X-User-Id header"))?;
        let id = value
            .to_str()
            .map_err(|_| ApiError::validation("X-User-Id header is not valid text"))?
            .trim();
        if id.is_empty() {
            return Err(ApiError::validation("X-User-Id header is empty"));
        }
        Ok(UserId(id.to_string()))
    }
}
