//! # reflectly-shared
//!
//! Types shared between the Reflectly store and the HTTP server: strongly
//! typed identifiers, the voter token, and the voter-side record of cast
//! upvotes.

pub mod constants;
pub mod error;
pub mod types;
pub mod voter;

pub use error::SharedError;
pub use types::{FeedbackId, ProjectId, VoterToken};
pub use voter::VoterRecord;
