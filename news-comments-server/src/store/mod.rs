//! Comment store - persistence and retrieval of threaded comments
//!
//! Each call acquires a pooled connection, runs one statement under a fixed
//! deadline and releases the connection before returning. No retries: every
//! failure goes back to the caller as a [`StoreError`].

mod comment;
mod postgres;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

pub use comment::{Comment, CommentRow};
pub use postgres::CommentStore;

/// Operations the HTTP layer needs from a comment store.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Append a comment to the thread `news_id`.
    ///
    /// `parent_id` is stored as given; it is not checked against existing
    /// comments.
    async fn add(&self, news_id: u64, parent_id: Option<u64>, text: &str) -> Result<(), StoreError>;

    /// All comments of `news_id`, most recent first. Empty when none exist.
    async fn list(&self, news_id: u64) -> Result<Vec<Comment>, StoreError>;

    /// Whether calls are currently being served.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Store operation, used for error context and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Ping,
    Add,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Add => "add",
            Self::List => "list",
        }
    }
}

/// Comment store error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection, deadline exceeded, or store not in `Ready`
    #[error("comment store unavailable ({op}): {reason}")]
    Unavailable { op: &'static str, reason: String },

    /// The backing store refused the insert
    #[error("comment rejected: {reason}")]
    Rejected { reason: String },

    /// Query or row decoding failed on read
    #[error("reading comments failed: {reason}")]
    ReadFailed { reason: String },
}

impl StoreError {
    pub fn unavailable(op: Operation, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            op: op.as_str(),
            reason: reason.into(),
        }
    }

    /// Classify a driver error raised while running `op`.
    ///
    /// Connection-level failures are `Unavailable` regardless of the
    /// operation, including those the server reports with a SQLSTATE
    /// (see [`is_connection_sqlstate`]). Anything else is attributed to the
    /// statement itself.
    pub fn from_sqlx(op: Operation, err: sqlx::Error) -> Self {
        let connection_level = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| is_connection_sqlstate(&code));
        if connection_level {
            return Self::unavailable(op, err.to_string());
        }

        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => Self::unavailable(op, err.to_string()),
            other => match op {
                Operation::Ping => Self::unavailable(op, other.to_string()),
                Operation::Add => Self::Rejected {
                    reason: other.to_string(),
                },
                Operation::List => Self::ReadFailed {
                    reason: other.to_string(),
                },
            },
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// SQLSTATE classes meaning the server could not or would not give us a
/// working session: connection exceptions, authorization failures, unknown
/// database, insufficient resources and operator intervention.
const CONNECTION_SQLSTATE_PREFIXES: [&str; 5] = ["08", "28", "3D", "53", "57P"];

fn is_connection_sqlstate(code: &str) -> bool {
    CONNECTION_SQLSTATE_PREFIXES
        .iter()
        .any(|prefix| code.starts_with(prefix))
}

/// Lifecycle of a [`CommentStore`].
///
/// `Uninitialized → Ready → ShuttingDown → Closed`. Operations are only
/// served in `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StoreState {
    Uninitialized = 0,
    Ready = 1,
    ShuttingDown = 2,
    Closed = 3,
}

impl StoreState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::ShuttingDown => "shutting down",
            Self::Closed => "closed",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Ready,
            2 => Self::ShuttingDown,
            _ => Self::Closed,
        }
    }
}
