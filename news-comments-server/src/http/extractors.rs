//! Custom Axum extractors
//!
//! Decode failures become `ApiError::InvalidInput` so clients always get the
//! JSON error shape, never axum's plain-text rejections.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON request body.
///
/// Unlike `axum::Json` this does not insist on a `content-type` header.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_input(format!("incorrect request: {}", e.body_text())))?;

        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::invalid_input(format!("incorrect request: {}", e)))?;

        Ok(Self(value))
    }
}

/// Extract a news thread id from the path
pub struct NewsId(pub u64);

impl<S> FromRequestParts<S> for NewsId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_input(format!("incorrect news id: {}", e.body_text())))?;

        // digits only: `u64::from_str` would also take a leading `+`
        let id = Some(raw.as_str())
            .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| ApiError::invalid_input(format!("incorrect news id: {}", raw)))?;

        Ok(Self(id))
    }
}
