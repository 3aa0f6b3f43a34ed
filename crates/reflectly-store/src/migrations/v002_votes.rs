use rusqlite::Connection;

// One row per accepted upvote. The primary key is the dedup boundary: a
// second insert for the same (feedback_id, voter_token) fails.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS votes (
    feedback_id TEXT NOT NULL,             -- FK -> feedback(id)
    voter_token TEXT NOT NULL,             -- opaque client-held token
    project_id  TEXT NOT NULL,             -- FK -> projects(id)
    created_at  TEXT NOT NULL,             -- RFC-3339

    PRIMARY KEY (feedback_id, voter_token),
    FOREIGN KEY (feedback_id) REFERENCES feedback(id) ON DELETE CASCADE,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_votes_project_voter ON votes(project_id, voter_token);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
