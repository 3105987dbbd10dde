//! Batch Matching Module
//! 
//! This module holds the two filter predicates that select export tasks:
//! - QueuePredicate: attributes shared by all queued work (device, status)
//! - ExportPredicate: export-specific attributes (exporter, device, time ranges)
//! 
//! A task is aggregated only when it satisfies both.

mod predicate;

pub use predicate::{BatchMatcher, ExportPredicate, QueuePredicate};
