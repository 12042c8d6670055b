//! API error type with IntoResponse
//!
//! Every error body has the shape `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::store::StoreError;

/// API error type with HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Request could not be decoded (400). Never reaches the store.
    InvalidInput { message: String },

    /// Store failure of any kind (500, logged)
    Store(StoreError),
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::InvalidInput { message } => message,
            Self::Store(e) => {
                tracing::error!("Store error: {}", e);
                format!("internal error: {}", e)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
