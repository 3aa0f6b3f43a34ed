use reflectly_shared::SharedError;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Caller-supplied data failed a precondition (e.g. empty content).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The referenced project or feedback item does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique insert collided with an existing row.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A thread panicked while holding the connection lock.
    #[error("Database lock poisoned")]
    LockPoisoned,

    /// The blocking worker running a store operation failed.
    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<SharedError> for StoreError {
    fn from(err: SharedError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
