//! # reflectly-store
//!
//! Durable storage for Reflectly, backed by SQLite.
//!
//! The crate exposes two layers:
//! - [`Database`], a synchronous handle wrapping a `rusqlite::Connection`
//!   with typed CRUD helpers for projects, feedback items and votes.
//! - [`FeedbackStore`] and [`UpvoteCoordinator`], the async, cloneable
//!   handles request handlers share. Every operation runs as a single
//!   transaction on a blocking worker thread, so it is applied completely
//!   or not at all even when the caller stops waiting.

pub mod database;
pub mod feedback;
pub mod migrations;
pub mod models;
pub mod projects;
pub mod store;
pub mod upvote;
pub mod votes;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use store::FeedbackStore;
pub use upvote::UpvoteCoordinator;
