//! PostgreSQL-backed comment store

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{Instrument, Span};

use super::comment::{to_db_id, Comment, CommentRow};
use super::{CommentRepository, Operation, StoreError, StoreState};
use crate::config::StoreConfig;

/// Comment store over a shared `PgPool`.
///
/// Holds no connection between calls. The only mutable state is the
/// lifecycle flag, so concurrent callers need no locking.
pub struct CommentStore {
    pool: PgPool,
    timeout: Duration,
    state: AtomicU8,
    span: Span,
}

impl CommentStore {
    /// Check connectivity and return a store in `Ready`.
    ///
    /// The check runs under the same deadline as regular operations. An
    /// unreachable database yields `StoreError::Unavailable`; callers are
    /// expected to treat this as fatal during startup.
    pub async fn new(pool: PgPool, config: &StoreConfig, span: Span) -> Result<Self, StoreError> {
        let store = Self {
            pool,
            timeout: config.operation_timeout(),
            state: AtomicU8::new(StoreState::Uninitialized as u8),
            span,
        };

        store
            .bounded(Operation::Ping, async {
                sqlx::query("SELECT 1").execute(&store.pool).await.map(|_| ())
            })
            .instrument(store.span.clone())
            .await
            .inspect_err(|e| tracing::error!(parent: &store.span, error = %e, "connectivity check failed"))?;

        store.state.store(StoreState::Ready as u8, Ordering::Release);
        tracing::info!(parent: &store.span, "comment store ready");
        Ok(store)
    }

    /// Skip the connectivity check. Tests only.
    #[cfg(test)]
    pub(crate) fn ready_unchecked(pool: PgPool, config: &StoreConfig) -> Self {
        Self {
            pool,
            timeout: config.operation_timeout(),
            state: AtomicU8::new(StoreState::Ready as u8),
            span: Span::none(),
        }
    }

    pub fn state(&self) -> StoreState {
        StoreState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The underlying pool, for schema setup.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool and move to `Closed`.
    ///
    /// New calls fail with `Unavailable` as soon as this starts. Calls
    /// already holding a connection finish first; the pool waits for their
    /// connections to come back. Calling again is a no-op.
    pub async fn shutdown(&self) {
        let began = self.state.compare_exchange(
            StoreState::Ready as u8,
            StoreState::ShuttingDown as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if began.is_err() {
            tracing::debug!(parent: &self.span, state = ?self.state(), "shutdown already requested");
            return;
        }

        tracing::info!(parent: &self.span, "closing comment store pool");
        self.pool.close().await;
        self.state.store(StoreState::Closed as u8, Ordering::Release);
        tracing::info!(parent: &self.span, "comment store closed");
    }

    fn ensure_ready(&self, op: Operation) -> Result<(), StoreError> {
        match self.state() {
            StoreState::Ready => Ok(()),
            state => Err(StoreError::unavailable(
                op,
                format!("store is {}", state.as_str()),
            )),
        }
    }

    /// Run `fut` under the per-call deadline.
    ///
    /// On expiry the future is dropped, which cancels the statement and
    /// returns its connection to the pool.
    async fn bounded<T, F>(&self, op: Operation, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::from_sqlx(op, e)),
            Err(_) => Err(StoreError::unavailable(
                op,
                format!("deadline of {}ms exceeded", self.timeout.as_millis()),
            )),
        }
    }

    async fn insert(&self, news_id: u64, parent_id: Option<u64>, text: &str) -> Result<(), StoreError> {
        self.ensure_ready(Operation::Add)?;

        let news_id = to_db_id(news_id).ok_or_else(|| StoreError::Rejected {
            reason: format!("news_id {} is out of range", news_id),
        })?;
        let parent_id = parent_id
            .map(|parent| {
                to_db_id(parent).ok_or_else(|| StoreError::Rejected {
                    reason: format!("parent_id {} is out of range", parent),
                })
            })
            .transpose()?;

        let id: i64 = self
            .bounded(
                Operation::Add,
                sqlx::query_scalar(
                    r#"
                    INSERT INTO comments.comments (news_id, parent_id, text)
                    VALUES ($1, $2, $3)
                    RETURNING id
                    "#,
                )
                .bind(news_id)
                .bind(parent_id)
                .bind(text)
                .fetch_one(&self.pool),
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, "insert comment failed"))?;

        tracing::debug!(id, "comment added");
        Ok(())
    }

    async fn select_thread(&self, news_id: u64) -> Result<Vec<Comment>, StoreError> {
        self.ensure_ready(Operation::List)?;

        // No stored row can carry an id outside the BIGINT range
        let Some(news_id) = to_db_id(news_id) else {
            tracing::debug!("news_id out of range, thread is empty");
            return Ok(Vec::new());
        };

        let rows: Vec<CommentRow> = self
            .bounded(
                Operation::List,
                sqlx::query_as(
                    r#"
                    SELECT id, parent_id, text, pub_date
                    FROM comments.comments
                    WHERE news_id = $1
                    ORDER BY pub_date DESC, id DESC
                    "#,
                )
                .bind(news_id)
                .fetch_all(&self.pool),
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, "select comments failed"))?;

        let comments = rows
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| tracing::error!(error = %e, "decode comment row failed"))?;

        tracing::debug!(count = comments.len(), "comments listed");
        Ok(comments)
    }
}

#[async_trait]
impl CommentRepository for CommentStore {
    async fn add(&self, news_id: u64, parent_id: Option<u64>, text: &str) -> Result<(), StoreError> {
        let span = tracing::debug_span!(parent: &self.span, "add", news_id, parent_id = ?parent_id);
        self.insert(news_id, parent_id, text).instrument(span).await
    }

    async fn list(&self, news_id: u64) -> Result<Vec<Comment>, StoreError> {
        let span = tracing::debug_span!(parent: &self.span, "list", news_id);
        self.select_thread(news_id).instrument(span).await
    }

    fn is_ready(&self) -> bool {
        self.state() == StoreState::Ready
    }
}
