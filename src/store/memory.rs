use super::TaskStore;
use crate::{error::StoreError, matcher::BatchMatcher, ExportTask};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory task store
///
/// Tasks are held behind a read-write lock; a query clones the matching
/// tasks under the read lock and releases it before returning.
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<ExportTask>>,
}

impl MemoryTaskStore {
    pub fn with_tasks(tasks: Vec<ExportTask>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks(&self, matcher: &BatchMatcher) -> Result<Vec<ExportTask>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut matched: Vec<ExportTask> = tasks.iter().filter(|t| matcher.matches(t)).cloned().collect();
        matched.sort_by_key(|t| t.pk);
        Ok(matched)
    }
}
