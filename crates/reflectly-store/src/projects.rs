//! CRUD operations for [`Project`] records.

use chrono::Utc;
use reflectly_shared::constants::DEFAULT_PROJECT_COLOR;
use reflectly_shared::ProjectId;
use rusqlite::{params, Connection, OptionalExtension};

use crate::database::{
    count_column, is_unique_violation, not_found, timestamp_column, uuid_column, Database,
};
use crate::error::{Result, StoreError};
use crate::models::{Project, ProjectSummary};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Register a new project. The slug must not already be taken.
    pub fn create_project(&self, name: &str, slug: &str, color: Option<&str>) -> Result<Project> {
        let name = name.trim();
        let slug = slug.trim();
        if name.is_empty() || slug.is_empty() {
            return Err(StoreError::Validation(
                "Project name and slug are required".to_string(),
            ));
        }

        let color = color
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_PROJECT_COLOR);

        let project = Project {
            id: ProjectId::new(),
            slug: slug.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            created_at: Utc::now(),
        };

        self.conn()
            .execute(
                "INSERT INTO projects (id, slug, name, color, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    project.id.to_string(),
                    project.slug,
                    project.name,
                    project.color,
                    project.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| match e {
                e if is_unique_violation(&e) => {
                    StoreError::Conflict(format!("Slug '{slug}' already taken"))
                }
                other => StoreError::Sqlite(other),
            })?;

        tracing::info!(id = %project.id, slug = %project.slug, "project created");

        Ok(project)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_project(&self, id: ProjectId) -> Result<Project> {
        self.conn()
            .query_row(
                "SELECT id, slug, name, color, created_at FROM projects WHERE id = ?1",
                params![id.to_string()],
                row_to_project,
            )
            .map_err(not_found("Project"))
    }

    pub fn get_project_by_slug(&self, slug: &str) -> Result<Project> {
        self.conn()
            .query_row(
                "SELECT id, slug, name, color, created_at FROM projects WHERE slug = ?1",
                params![slug.trim()],
                row_to_project,
            )
            .map_err(not_found("Project"))
    }

    /// List all projects, newest first, each with its feedback count.
    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let mut stmt = self.conn().prepare(
            "SELECT p.id, p.slug, p.name, p.color, p.created_at, COUNT(f.id)
             FROM projects p
             LEFT JOIN feedback f ON f.project_id = p.id
             GROUP BY p.id
             ORDER BY p.created_at DESC, p.rowid DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ProjectSummary {
                project: row_to_project(row)?,
                feedback_count: count_column(row, 5)?,
            })
        })?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn project_exists(conn: &Connection, id: ProjectId) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM projects WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Map a `rusqlite::Row` to a [`Project`].
fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: ProjectId(uuid_column(row, 0)?),
        slug: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_lookup() {
        let db = Database::open_in_memory().unwrap();
        let project = db.create_project(" Acme ", "acme", Some("#6366f1")).unwrap();

        assert_eq!(project.name, "Acme");
        assert_eq!(db.get_project(project.id).unwrap(), project);
        assert_eq!(db.get_project_by_slug("acme").unwrap(), project);
    }

    #[test]
    fn color_defaults_to_black() {
        let db = Database::open_in_memory().unwrap();
        let project = db.create_project("Acme", "acme", None).unwrap();
        assert_eq!(project.color, DEFAULT_PROJECT_COLOR);

        let blank = db.create_project("Other", "other", Some("  ")).unwrap();
        assert_eq!(blank.color, DEFAULT_PROJECT_COLOR);
    }

    #[test]
    fn duplicate_slug_conflicts() {
        let db = Database::open_in_memory().unwrap();
        db.create_project("Acme", "acme", None).unwrap();

        let err = db.create_project("Acme 2", "acme", None).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn missing_fields_fail_validation() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.create_project("", "acme", None),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            db.create_project("Acme", "   ", None),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn unknown_project_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.get_project_by_slug("nope"),
            Err(StoreError::NotFound("Project"))
        ));
        assert!(!project_exists(db.conn(), ProjectId::new()).unwrap());
    }

    #[test]
    fn list_counts_feedback() {
        let db = Database::open_in_memory().unwrap();
        let first = db.create_project("First", "first", None).unwrap();
        let second = db.create_project("Second", "second", None).unwrap();
        db.insert_feedback(first.id, "one").unwrap();
        db.insert_feedback(first.id, "two").unwrap();

        let listed = db.list_projects().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].project.id, second.id);
        assert_eq!(listed[0].feedback_count, 0);
        assert_eq!(listed[1].project.id, first.id);
        assert_eq!(listed[1].feedback_count, 2);
    }
}
