//! news-comments-server: threaded comments for news items
//!
//! Persists and lists comments in PostgreSQL and exposes them over HTTP.
//! The comment store owns query construction, deadlines and row mapping;
//! the HTTP layer only decodes requests and maps store results to responses.

pub mod config;
pub mod db;
pub mod http;
pub mod store;

pub use config::{Config, ConfigError};
pub use store::{Comment, CommentRepository, CommentStore, StoreError, StoreState};
