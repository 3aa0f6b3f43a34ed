//! One upvote per voter per item.
//!
//! The voter token is client-held and unauthenticated, so this is a
//! deduplication guard, not Sybil resistance. The durable vote set is the
//! authoritative boundary: the vote row and the counter increment are
//! written in the same transaction, and the primary key on
//! `(feedback_id, voter_token)` makes concurrent duplicates collapse into a
//! single acceptance.

use reflectly_shared::{FeedbackId, ProjectId, VoterRecord, VoterToken};
use tracing::{debug, info};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::feedback::{fetch_feedback, increment_upvotes};
use crate::models::UpvoteOutcome;
use crate::store::FeedbackStore;
use crate::votes::insert_vote;

#[derive(Clone)]
pub struct UpvoteCoordinator {
    store: FeedbackStore,
}

impl UpvoteCoordinator {
    pub fn new(store: FeedbackStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &FeedbackStore {
        &self.store
    }

    /// Upvote `item_id` on behalf of `voter_token`.
    ///
    /// A repeat from the same token is not an error: it returns
    /// `accepted: false` with the item's current state and changes nothing.
    pub async fn upvote(&self, voter_token: &str, item_id: FeedbackId) -> Result<UpvoteOutcome> {
        let voter = VoterToken::parse(voter_token)?;
        self.store
            .with_db(move |db| cast_upvote(db, &voter, item_id))
            .await
    }

    /// Same as [`upvote`](Self::upvote), consulting the caller-held record
    /// first. The record belongs to `project_id`, so an item of any other
    /// project is [`StoreError::NotFound`]. An item already in the record is
    /// answered without a write, and the record gains the item whenever the
    /// pair ends up VOTED.
    pub async fn upvote_with_record(
        &self,
        record: &mut VoterRecord,
        project_id: ProjectId,
        voter_token: &str,
        item_id: FeedbackId,
    ) -> Result<UpvoteOutcome> {
        let voter = VoterToken::parse(voter_token)?;

        let item = self.store.get(item_id).await?;
        if item.project_id != project_id {
            return Err(StoreError::NotFound("Feedback"));
        }
        if record.contains(&item_id) {
            return Ok(UpvoteOutcome {
                accepted: false,
                item,
            });
        }

        let outcome = self
            .store
            .with_db(move |db| cast_upvote(db, &voter, item_id))
            .await?;
        record.mark(item_id);
        Ok(outcome)
    }
}

fn cast_upvote(db: &Database, voter: &VoterToken, item_id: FeedbackId) -> Result<UpvoteOutcome> {
    let tx = db.conn().unchecked_transaction()?;
    let item = fetch_feedback(&tx, item_id)?;

    match insert_vote(&tx, item.project_id, item_id, voter) {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => {
            debug!(item = %item_id, voter = voter.short(), "duplicate upvote ignored");
            return Ok(UpvoteOutcome {
                accepted: false,
                item,
            });
        }
        Err(e) => return Err(e),
    }

    let item = increment_upvotes(&tx, item_id)?;
    tx.commit()?;

    info!(item = %item_id, upvotes = item.upvotes, "upvote accepted");

    Ok(UpvoteOutcome {
        accepted: true,
        item,
    })
}
