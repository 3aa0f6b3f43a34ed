//! v001 -- Initial schema creation.
//!
//! Creates the `projects` and `feedback` tables.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Projects
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS projects (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    slug       TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    color      TEXT NOT NULL,                 -- CSS colour, e.g. #6366f1
    created_at TEXT NOT NULL                  -- RFC-3339
);

-- ----------------------------------------------------------------
-- Feedback items
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS feedback (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    project_id TEXT NOT NULL,                 -- FK -> projects(id)
    content    TEXT NOT NULL CHECK (length(trim(content)) > 0),
    upvotes    INTEGER NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
    created_at TEXT NOT NULL,                 -- RFC-3339

    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_feedback_project_rank
    ON feedback(project_id, upvotes DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
