//! Export Task Store Module
//! 
//! This module provides read access to the export task records the batch
//! report is computed from:
//! - SqliteTaskStore: persistent store backed by sqlx/SQLite
//! - MemoryTaskStore: in-process store for tests and fixtures

mod memory;
mod sqlite;

pub use memory::MemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::{error::StoreError, matcher::BatchMatcher, ExportTask};
use async_trait::async_trait;

/// Query interface over the export task records
///
/// Implementations must answer each call from one consistent view of the
/// data and must not hold locks once the call returns.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks accepted by `matcher`, in store key order
    async fn list_tasks(&self, matcher: &BatchMatcher) -> Result<Vec<ExportTask>, StoreError>;
}
