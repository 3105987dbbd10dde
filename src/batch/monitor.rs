//! Export Monitor Module
//!
//! Query service behind the batch endpoint. It connects the pieces of the
//! report path for one request:
//!
//! 1. Fetch the tasks matching the query's predicates from the `TaskStore`
//! 2. Group them into batches via `BatchAggregator`
//! 3. Order the batches and cut the requested page
//!
//! Nothing is cached between calls; every request sees the store as it is
//! at query time.

use crate::{
    batch::BatchAggregator,
    error::MonitorError,
    store::TaskStore,
    validation::BatchQuery,
    ExportBatch,
};
use std::sync::Arc;
use tracing::{debug, error};

/// Read-only export batch query service
#[derive(Clone)]
pub struct ExportMonitor {
    /// Task store the batches are computed from
    store: Arc<dyn TaskStore>,
    aggregator: BatchAggregator,
    /// Cap applied when a request carries no `limit`; `None` returns every match
    default_limit: Option<usize>,
}

impl ExportMonitor {
    /// Creates a new monitor over `store`
    ///
    /// # Arguments
    /// * `store` - Shared task store handle
    /// * `default_limit` - Page size used when the request omits `limit`
    pub fn new(store: Arc<dyn TaskStore>, default_limit: Option<usize>) -> Self {
        Self {
            store,
            aggregator: BatchAggregator::new(),
            default_limit,
        }
    }

    /// List the export batches selected by `query`
    ///
    /// # Returns
    /// * `Ok(batches)` ordered and paginated, possibly empty
    /// * `Err(MonitorError::StoreUnavailable)` if the store could not be queried
    pub async fn list_export_batches(&self, query: &BatchQuery) -> Result<Vec<ExportBatch>, MonitorError> {
        let tasks = self.store.list_tasks(&query.matcher).await.map_err(|e| {
            error!("Failed to query export tasks: {}", e);
            MonitorError::StoreUnavailable(e)
        })?;
        debug!("Store returned {} matching export tasks", tasks.len());

        let batches = self.aggregator.aggregate(tasks);
        let limit = query.limit.or(self.default_limit);
        let page = self.aggregator.page(batches, query.order, query.offset, limit);

        debug!(
            "Returning {} batches (order={}, offset={}, limit={:?})",
            page.len(),
            query.order,
            query.offset,
            limit
        );
        Ok(page)
    }
}
