//! Comment entity and its row mapping

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::StoreError;

/// A stored comment. `id` and `pub_date` are assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

/// Raw row from `comments.comments`. Postgres has no unsigned integers,
/// so ids come back as BIGINT and are checked on conversion.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = StoreError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let id = u64::try_from(row.id).map_err(|_| StoreError::ReadFailed {
            reason: format!("comment row has negative id {}", row.id),
        })?;

        let parent_id = row
            .parent_id
            .map(|parent| {
                u64::try_from(parent).map_err(|_| StoreError::ReadFailed {
                    reason: format!("comment {} has negative parent_id {}", row.id, parent),
                })
            })
            .transpose()?;

        Ok(Self {
            id,
            parent_id,
            text: row.text,
            pub_date: row.pub_date,
        })
    }
}

/// Convert a caller-supplied id into a BIGINT parameter.
///
/// `None` when the value is above `i64::MAX` and cannot be stored.
pub(crate) fn to_db_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}
