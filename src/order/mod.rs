//! Batch Ordering Module
//! 
//! This module defines the closed set of sort keys for the batch report:
//! - createdTime / -createdTime: by the latest task creation time in a batch
//! - updatedTime / -updatedTime: by the latest task update time in a batch
//! 
//! The default is `-updatedTime`, most recently updated batch first.

mod batch_order;


pub use batch_order::{BatchOrder, UnknownOrder};
