//! API Module
//! 
//! This module handles the HTTP API of the export batch monitor.
//! It provides the read-only endpoint that reports export batches.

mod server;
pub use server::{AppState, Server, EXPORT_BATCH_PATH};
