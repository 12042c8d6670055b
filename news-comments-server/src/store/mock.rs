//! In-memory comment repository for handler tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{Comment, CommentRepository, StoreError};

pub struct MockComments {
    comments: Mutex<Vec<(u64, Comment)>>,
    failure: Mutex<Option<StoreError>>,
    ready: AtomicBool,
}

impl Default for MockComments {
    fn default() -> Self {
        Self {
            comments: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            ready: AtomicBool::new(true),
        }
    }
}

impl MockComments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    /// Fail the next call with `err`.
    pub fn fail_next(&self, err: StoreError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn len(&self) -> usize {
        self.comments.lock().unwrap().len()
    }

    fn take_failure(&self) -> Option<StoreError> {
        self.failure.lock().unwrap().take()
    }
}

#[async_trait]
impl CommentRepository for MockComments {
    async fn add(&self, news_id: u64, parent_id: Option<u64>, text: &str) -> Result<(), StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut comments = self.comments.lock().unwrap();
        let id = comments.len() as u64 + 1;
        comments.push((
            news_id,
            Comment {
                id,
                parent_id,
                text: text.to_owned(),
                pub_date: Utc::now(),
            },
        ));
        Ok(())
    }

    async fn list(&self, news_id: u64) -> Result<Vec<Comment>, StoreError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut thread: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|(thread_id, _)| *thread_id == news_id)
            .map(|(_, comment)| comment.clone())
            .collect();
        thread.sort_by(|a, b| (b.pub_date, b.id).cmp(&(a.pub_date, a.id)));
        Ok(thread)
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Operation;

    #[tokio::test]
    async fn mock_orders_newest_first() {
        let mock = MockComments::new();
        mock.add(42, None, "first").await.unwrap();
        mock.add(42, None, "second").await.unwrap();
        mock.add(7, None, "elsewhere").await.unwrap();

        let texts: Vec<_> = mock
            .list(42)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, ["second", "first"]);
    }

    #[tokio::test]
    async fn mock_failure_is_one_shot() {
        let mock = MockComments::new();
        mock.fail_next(StoreError::unavailable(Operation::List, "down"));

        assert!(mock.list(1).await.is_err());
        assert!(mock.list(1).await.unwrap().is_empty());
    }
}
