//! The voter-side record of cast upvotes.
//!
//! A browser keeps one [`VoterRecord`] per project in local storage under
//! [`VoterRecord::storage_key`], serialised as a plain JSON array of item
//! ids. It only ever grows. The server can rebuild the same record from its
//! durable vote set so a client that lost its storage recovers its state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::VOTER_STORAGE_PREFIX;
use crate::types::FeedbackId;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct VoterRecord {
    items: BTreeSet<FeedbackId>,
}

impl VoterRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local-storage key under which the record for `slug` is persisted.
    pub fn storage_key(slug: &str) -> String {
        format!("{VOTER_STORAGE_PREFIX}{slug}")
    }

    pub fn contains(&self, id: &FeedbackId) -> bool {
        self.items.contains(id)
    }

    /// Record an accepted upvote. Returns `false` if it was already present.
    pub fn mark(&mut self, id: FeedbackId) -> bool {
        self.items.insert(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<FeedbackId> for VoterRecord {
    fn from_iter<I: IntoIterator<Item = FeedbackId>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_is_idempotent() {
        let mut record = VoterRecord::new();
        let id = FeedbackId::new();

        assert!(record.mark(id));
        assert!(!record.mark(id));
        assert_eq!(record.len(), 1);
        assert!(record.contains(&id));
    }

    #[test]
    fn serializes_as_json_array() {
        let id = FeedbackId::new();
        let record: VoterRecord = [id].into_iter().collect();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, format!("[\"{}\"]", id));

        let back: VoterRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn storage_key_uses_slug() {
        assert_eq!(VoterRecord::storage_key("acme"), "upvoted_acme");
    }
}
