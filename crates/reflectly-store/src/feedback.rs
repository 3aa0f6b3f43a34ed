//! Feedback item persistence: submission, ranked listing and the atomic
//! popularity increment.

use chrono::Utc;
use reflectly_shared::{FeedbackId, ProjectId};
use rusqlite::{params, Connection};

use crate::database::{count_column, not_found, timestamp_column, uuid_column, Database};
use crate::error::{Result, StoreError};
use crate::models::FeedbackItem;
use crate::projects::project_exists;

const FEEDBACK_COLUMNS: &str = "id, project_id, content, upvotes, created_at";

impl Database {
    /// Persist a new feedback item with a zero counter.
    ///
    /// Content is trimmed first; blank content is rejected. Identical content
    /// submitted twice yields two distinct items.
    pub fn insert_feedback(&self, project_id: ProjectId, content: &str) -> Result<FeedbackItem> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::Validation("Content is required".to_string()));
        }

        let tx = self.conn().unchecked_transaction()?;
        if !project_exists(&tx, project_id)? {
            return Err(StoreError::NotFound("Project"));
        }

        let item = FeedbackItem {
            id: FeedbackId::new(),
            project_id,
            content: content.to_string(),
            upvotes: 0,
            created_at: Utc::now(),
        };

        tx.execute(
            "INSERT INTO feedback (id, project_id, content, upvotes, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![
                item.id.to_string(),
                item.project_id.to_string(),
                item.content,
                item.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        tracing::debug!(id = %item.id, project = %project_id, "feedback submitted");

        Ok(item)
    }

    pub fn get_feedback(&self, id: FeedbackId) -> Result<FeedbackItem> {
        fetch_feedback(self.conn(), id)
    }

    /// All items of a project, most upvoted first.
    ///
    /// Equal counters keep insertion order (oldest first), so repeated calls
    /// without intervening writes return the same sequence.
    pub fn list_ranked(&self, project_id: ProjectId) -> Result<Vec<FeedbackItem>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS}
             FROM feedback
             WHERE project_id = ?1
             ORDER BY upvotes DESC, rowid ASC"
        ))?;

        let rows = stmt.query_map(params![project_id.to_string()], row_to_feedback)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Add one to an item's counter and return the updated item.
    pub fn increment_popularity(&self, id: FeedbackId) -> Result<FeedbackItem> {
        increment_upvotes(self.conn(), id)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn fetch_feedback(conn: &Connection, id: FeedbackId) -> Result<FeedbackItem> {
    conn.query_row(
        &format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = ?1"),
        params![id.to_string()],
        row_to_feedback,
    )
    .map_err(not_found("Feedback"))
}

/// Single-statement increment: the addition happens inside SQLite, never as
/// a read-modify-write in Rust.
pub(crate) fn increment_upvotes(conn: &Connection, id: FeedbackId) -> Result<FeedbackItem> {
    conn.query_row(
        &format!(
            "UPDATE feedback SET upvotes = upvotes + 1
             WHERE id = ?1
             RETURNING {FEEDBACK_COLUMNS}"
        ),
        params![id.to_string()],
        row_to_feedback,
    )
    .map_err(not_found("Feedback"))
}

/// Map a `rusqlite::Row` to a [`FeedbackItem`].
fn row_to_feedback(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackItem> {
    Ok(FeedbackItem {
        id: FeedbackId(uuid_column(row, 0)?),
        project_id: ProjectId(uuid_column(row, 1)?),
        content: row.get(2)?,
        upvotes: count_column(row, 3)?,
        created_at: timestamp_column(row, 4)?,
    })
}
