//! This crate implements a monitoring endpoint over an export task pipeline.
//! It groups scheduled export tasks into batches and reports per-batch status
//! counts and time ranges, filterable, ordered and paginated.

pub mod types; // Export tasks, statuses and the derived batch summary.
pub mod error; // Error types of the report path.
pub mod validation; // Turns raw query parameters into a typed batch query.
pub mod matcher; // Queue and export predicates selecting tasks.
pub mod order; // Closed set of batch sort keys.
pub mod batch; // Grouping, ordering and pagination of tasks into batches.
pub mod store; // Read access to stored export tasks.
pub mod report; // Streaming report renderers.
pub mod api; // HTTP endpoint.
pub mod config; // Defines and loads service configuration.

#[cfg(test)]
mod testing;

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use batch::ExportMonitor;
