//! Comment endpoints
//!
//! - `POST /comments` adds a comment to a news thread
//! - `GET /comments/{news_id}` lists a thread, newest first

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, NewsId};
use crate::http::server::AppState;
use crate::store::Comment;

/// Add comment request
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    /// Older clients send `new_id`
    #[serde(alias = "new_id")]
    pub news_id: u64,
    #[serde(default)]
    pub parent_id: Option<u64>,
    pub text: String,
}

/// Add comment response
#[derive(Serialize)]
pub struct AddCommentResponse {
    pub status: &'static str,
}

/// Comment as rendered on the wire
#[derive(Serialize)]
pub struct CommentResponse {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub text: String,
    /// RFC 3339 with explicit UTC offset
    pub pub_date: String,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            text: c.text,
            pub_date: c.pub_date.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}

/// List comments response
#[derive(Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentResponse>,
}

/// POST /comments - add a comment
async fn add_comment(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<AddCommentRequest>,
) -> Result<Json<AddCommentResponse>, ApiError> {
    state
        .comments
        .add(req.news_id, req.parent_id, &req.text)
        .await?;

    tracing::debug!(news_id = req.news_id, parent_id = ?req.parent_id, "comment added");
    Ok(Json(AddCommentResponse { status: "success" }))
}

/// GET /comments/{news_id} - list comments for a news thread
async fn list_comments(
    State(state): State<Arc<AppState>>,
    NewsId(news_id): NewsId,
) -> Result<Json<CommentsResponse>, ApiError> {
    let comments = state.comments.list(news_id).await?;

    tracing::debug!(news_id, count = comments.len(), "comments listed");
    Ok(Json(CommentsResponse {
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

/// Comment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/comments", post(add_comment))
        .route("/comments/{news_id}", get(list_comments))
}
