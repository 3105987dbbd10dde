//! Batch Aggregator Module
//!
//! Groups matched export tasks into batches and computes the per-batch
//! summary: status counts, device/exporter sets and timestamp ranges.
//!
//! # Grouping Rules
//! - Tasks sharing a non-empty batch id form one batch
//! - A task without batch id (or with an empty one) forms its own batch

use crate::{order::BatchOrder, ExportBatch, ExportTask};
use std::collections::HashMap;
use tracing::debug;

/// Stateless grouping, ordering and pagination of export tasks
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchAggregator;

impl BatchAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Group tasks into batches in a single pass
    ///
    /// Batches are returned in order of first appearance; call [`page`](Self::page)
    /// to apply the requested order.
    pub fn aggregate<I>(&self, tasks: I) -> Vec<ExportBatch>
    where
        I: IntoIterator<Item = ExportTask>,
    {
        let mut batches: Vec<ExportBatch> = Vec::new();
        // batch id -> index into `batches`
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut task_count = 0usize;

        for task in tasks {
            task_count += 1;
            let slot = match task.batch_key() {
                Some(id) => match index.get(id) {
                    Some(&slot) => slot,
                    None => {
                        index.insert(id.to_string(), batches.len());
                        batches.push(ExportBatch::new(Some(id.to_string()), task.pk));
                        batches.len() - 1
                    }
                },
                None => {
                    batches.push(ExportBatch::new(None, task.pk));
                    batches.len() - 1
                }
            };
            batches[slot].add(&task);
        }

        debug!("Aggregated {} tasks into {} batches", task_count, batches.len());
        batches
    }

    /// Order batches, then keep the slice `[offset, offset + limit)`
    ///
    /// A `None` limit keeps everything after `offset`.
    pub fn page(
        &self,
        mut batches: Vec<ExportBatch>,
        order: BatchOrder,
        offset: usize,
        limit: Option<usize>,
    ) -> Vec<ExportBatch> {
        order.sort(&mut batches);
        batches
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }
}
