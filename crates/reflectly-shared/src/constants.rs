/// Application name
pub const APP_NAME: &str = "Reflectly";

/// Colour assigned to a project created without one.
pub const DEFAULT_PROJECT_COLOR: &str = "#000000";

/// Prefix of the local-storage key holding a voter's upvoted item ids.
pub const VOTER_STORAGE_PREFIX: &str = "upvoted_";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Maximum accepted request body in bytes (64 KiB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;
