//! Query Validation Module
//! 
//! This module turns raw query parameters into a typed batch query.
//! Performs status parsing, time-range parsing, order and pagination checks.

mod validator;
pub mod range;

#[cfg(test)]
mod tests;

pub use range::DateTimeRange;
pub use validator::{BatchQuery, BatchQueryParams, QueryValidator};
