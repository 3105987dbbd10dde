//! Export Batch Module
//! 
//! This module turns stored export tasks into the batch report:
//! - BatchAggregator: groups tasks into batches, orders and paginates them
//! - ExportMonitor: runs a validated query against a task store

mod aggregator;
pub mod monitor;

pub use aggregator::BatchAggregator;
pub use monitor::ExportMonitor;
