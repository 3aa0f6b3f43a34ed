//! The async handle request handlers share.
//!
//! [`FeedbackStore`] wraps a single [`Database`] behind a mutex and runs each
//! operation on tokio's blocking pool. The work is owned by the blocking task,
//! so a caller that stops waiting cannot interrupt a transaction half way.

use std::sync::{Arc, Mutex};

use reflectly_shared::{FeedbackId, ProjectId, VoterRecord, VoterToken};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{FeedbackItem, Project, ProjectSummary};

#[derive(Clone)]
pub struct FeedbackStore {
    db: Arc<Mutex<Database>>,
}

impl FeedbackStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Convenience constructor for tests and ephemeral instances.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Run `f` against the database on the blocking pool.
    pub(crate) async fn with_db<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&*guard)
        })
        .await?
    }

    // ------------------------------------------------------------------
    // Feedback
    // ------------------------------------------------------------------

    /// Create a feedback item. Fails with [`StoreError::Validation`] when the
    /// trimmed content is empty.
    pub async fn submit(&self, project_id: ProjectId, content: &str) -> Result<FeedbackItem> {
        let content = content.to_string();
        self.with_db(move |db| db.insert_feedback(project_id, &content))
            .await
    }

    /// Items of a project, most upvoted first, ties oldest first.
    pub async fn list_ranked(&self, project_id: ProjectId) -> Result<Vec<FeedbackItem>> {
        self.with_db(move |db| db.list_ranked(project_id)).await
    }

    /// Atomically add one to the item's counter.
    pub async fn increment_popularity(&self, id: FeedbackId) -> Result<FeedbackItem> {
        self.with_db(move |db| db.increment_popularity(id)).await
    }

    pub async fn get(&self, id: FeedbackId) -> Result<FeedbackItem> {
        self.with_db(move |db| db.get_feedback(id)).await
    }

    pub async fn voted_items(
        &self,
        project_id: ProjectId,
        voter: VoterToken,
    ) -> Result<VoterRecord> {
        self.with_db(move |db| db.voted_items(project_id, &voter))
            .await
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    pub async fn create_project(
        &self,
        name: String,
        slug: String,
        color: Option<String>,
    ) -> Result<Project> {
        self.with_db(move |db| db.create_project(&name, &slug, color.as_deref()))
            .await
    }

    pub async fn project(&self, id: ProjectId) -> Result<Project> {
        self.with_db(move |db| db.get_project(id)).await
    }

    pub async fn project_by_slug(&self, slug: &str) -> Result<Project> {
        let slug = slug.to_string();
        self.with_db(move |db| db.get_project_by_slug(&slug)).await
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        self.with_db(|db| db.list_projects()).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let store = FeedbackStore::in_memory().unwrap();
        let project = store
            .create_project("Acme".into(), "acme".into(), None)
            .await
            .unwrap();
        let id = store.submit(project.id, "popular").await.unwrap().id;

        let tasks = (0..100).map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.increment_popularity(id).await })
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(store.get(id).await.unwrap().upvotes, 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_on_different_items() {
        let store = FeedbackStore::in_memory().unwrap();
        let project = store
            .create_project("Acme".into(), "acme".into(), None)
            .await
            .unwrap();
        let a = store.submit(project.id, "a").await.unwrap();
        let b = store.submit(project.id, "b").await.unwrap();

        let tasks = (0..60).map(|i| {
            let store = store.clone();
            let id = if i % 3 == 0 { b.id } else { a.id };
            tokio::spawn(async move { store.increment_popularity(id).await })
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let ranked = store.list_ranked(project.id).await.unwrap();
        assert_eq!(ranked[0].id, a.id);
        assert_eq!(ranked[0].upvotes, 40);
        assert_eq!(ranked[1].upvotes, 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_see_monotonic_counts_during_increments() {
        let store = FeedbackStore::in_memory().unwrap();
        let project = store
            .create_project("Acme".into(), "acme".into(), None)
            .await
            .unwrap();
        let id = store.submit(project.id, "popular").await.unwrap().id;
        for _ in 0..5 {
            store.increment_popularity(id).await.unwrap();
        }

        let project_id = project.id;
        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                let mut last = 5;
                let mut reads = 0usize;
                while last < 105 {
                    let ranked = store.list_ranked(project_id).await.unwrap();
                    let seen = ranked[0].upvotes;
                    assert!((last..=105).contains(&seen), "saw {seen} after {last}");
                    last = seen;
                    reads += 1;
                }
                reads
            })
        };

        let tasks = (0..100).map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.increment_popularity(id).await })
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert!(reader.await.unwrap() >= 1);
        assert_eq!(store.get(id).await.unwrap().upvotes, 105);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn abandoned_submit_still_lands_whole() {
        let store = FeedbackStore::in_memory().unwrap();
        let project = store
            .create_project("Acme".into(), "acme".into(), None)
            .await
            .unwrap();

        // The first poll hands the insert to the blocking pool; the caller
        // then gives up on it.
        let fut = store.submit(project.id, "fire and forget");
        let _ = tokio::time::timeout(Duration::from_nanos(1), fut).await;

        let deadline = Instant::now() + Duration::from_secs(5);
        let items = loop {
            let items = store.list_ranked(project.id).await.unwrap();
            if !items.is_empty() {
                break items;
            }
            assert!(Instant::now() < deadline, "submit never landed");
            tokio::time::sleep(Duration::from_millis(10)).await;
        };

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "fire and forget");
        assert_eq!(items[0].upvotes, 0);
    }

    #[tokio::test]
    async fn project_lookup_by_slug() {
        let store = FeedbackStore::in_memory().unwrap();
        let created = store
            .create_project("Acme".into(), "acme".into(), Some("#ff0000".into()))
            .await
            .unwrap();

        assert_eq!(store.project_by_slug("acme").await.unwrap(), created);
        assert_eq!(store.project(created.id).await.unwrap(), created);
        assert!(matches!(
            store.project_by_slug("missing").await,
            Err(StoreError::NotFound("Project"))
        ));
        assert_eq!(store.list_projects().await.unwrap().len(), 1);
    }
}
