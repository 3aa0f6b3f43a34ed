//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the HTTP layer. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use reflectly_shared::{FeedbackId, ProjectId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A named feedback board. Feedback items are always scoped to one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    /// URL-safe handle the public feedback page and widget refer to.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Display colour (CSS value).
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// A project together with the number of feedback items it holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub feedback_count: u64,
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// One submitted piece of free-text feedback.
///
/// Only `upvotes` ever changes after creation, and only upwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: FeedbackId,
    pub project_id: ProjectId,
    /// Trimmed, never empty.
    pub content: String,
    pub upvotes: u64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Upvote
// ---------------------------------------------------------------------------

/// Result of an upvote attempt.
///
/// `accepted == false` means the voter had already upvoted the item; `item`
/// then reflects the current, unchanged state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteOutcome {
    pub accepted: bool,
    pub item: FeedbackItem,
}
