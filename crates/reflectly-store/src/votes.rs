//! The durable `(feedback_id, voter_token)` set.
//!
//! A row here means the pair is in the VOTED state. Rows are only ever
//! inserted; there is no un-vote.

use chrono::Utc;
use reflectly_shared::{FeedbackId, ProjectId, VoterRecord, VoterToken};
use rusqlite::{params, Connection};

use crate::database::{is_unique_violation, uuid_column, Database};
use crate::error::{Result, StoreError};

impl Database {
    /// Whether `voter` has an accepted upvote on `feedback_id`.
    pub fn has_voted(&self, feedback_id: FeedbackId, voter: &VoterToken) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM votes WHERE feedback_id = ?1 AND voter_token = ?2",
            params![feedback_id.to_string(), voter.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Rebuild a voter's record for one project from the durable vote set.
    pub fn voted_items(&self, project_id: ProjectId, voter: &VoterToken) -> Result<VoterRecord> {
        let mut stmt = self.conn().prepare(
            "SELECT feedback_id FROM votes
             WHERE project_id = ?1 AND voter_token = ?2",
        )?;

        let rows = stmt.query_map(params![project_id.to_string(), voter.as_str()], |row| {
            uuid_column(row, 0).map(FeedbackId)
        })?;

        let mut record = VoterRecord::new();
        for row in rows {
            record.mark(row?);
        }
        Ok(record)
    }
}

/// Insert the pair, failing with [`StoreError::Conflict`] if it already
/// exists.
pub(crate) fn insert_vote(
    conn: &Connection,
    project_id: ProjectId,
    feedback_id: FeedbackId,
    voter: &VoterToken,
) -> Result<()> {
    conn.execute(
        "INSERT INTO votes (feedback_id, voter_token, project_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            feedback_id.to_string(),
            voter.as_str(),
            project_id.to_string(),
            Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| match e {
        e if is_unique_violation(&e) => {
            StoreError::Conflict(format!("Voter already upvoted feedback {feedback_id}"))
        }
        other => StoreError::Sqlite(other),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_conflicts() {
        let db = Database::open_in_memory().unwrap();
        let project = db.create_project("Acme", "acme", None).unwrap();
        let item = db.insert_feedback(project.id, "idea").unwrap();
        let voter = VoterToken::parse("v1").unwrap();

        insert_vote(db.conn(), project.id, item.id, &voter).unwrap();
        let err = insert_vote(db.conn(), project.id, item.id, &voter).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(db.has_voted(item.id, &voter).unwrap());
    }

    #[test]
    fn voted_items_are_scoped_per_project_and_voter() {
        let db = Database::open_in_memory().unwrap();
        let acme = db.create_project("Acme", "acme", None).unwrap();
        let other = db.create_project("Other", "other", None).unwrap();
        let a = db.insert_feedback(acme.id, "a").unwrap();
        let b = db.insert_feedback(acme.id, "b").unwrap();
        let c = db.insert_feedback(other.id, "c").unwrap();
        let v1 = VoterToken::parse("v1").unwrap();
        let v2 = VoterToken::parse("v2").unwrap();

        insert_vote(db.conn(), acme.id, a.id, &v1).unwrap();
        insert_vote(db.conn(), other.id, c.id, &v1).unwrap();
        insert_vote(db.conn(), acme.id, b.id, &v2).unwrap();

        let record = db.voted_items(acme.id, &v1).unwrap();
        assert_eq!(record.len(), 1);
        assert!(record.contains(&a.id));
        assert!(!record.contains(&b.id));

        let stranger = VoterToken::parse("v3").unwrap();
        assert!(db.voted_items(acme.id, &stranger).unwrap().is_empty());
    }
}
