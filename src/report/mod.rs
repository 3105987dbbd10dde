//! Report Rendering Module
//! 
//! This module renders aggregated batches into a response body.
//! Renderers produce a chunked byte stream so the full report is never
//! materialized as one document:
//! - JsonReportRenderer: JSON array, one chunk per batch
//! 
//! New output formats are added as new `ReportRenderer` implementations.

mod json;

pub use json::JsonReportRenderer;

use crate::{error::ReportError, ExportBatch};
use axum::body::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};

/// Chunked report body
pub type ReportStream = BoxStream<'static, Result<Bytes, ReportError>>;

/// Output format of the batch report
pub trait ReportRenderer: Send + Sync {
    /// MIME type of the rendered body
    fn content_type(&self) -> &'static str;

    /// Render batches, in the given order, as a byte stream
    fn render(&self, batches: Vec<ExportBatch>) -> ReportStream;
}

/// End the stream right after its first error
///
/// The error itself is still yielded so the transport aborts the response
/// instead of sending a well-formed but incomplete document.
pub fn truncate_on_error<S>(chunks: S) -> impl Stream<Item = Result<Bytes, ReportError>> + Send
where
    S: Stream<Item = Result<Bytes, ReportError>> + Send,
{
    chunks.scan(false, |failed, chunk| {
        if *failed {
            return std::future::ready(None);
        }
        *failed = chunk.is_err();
        std::future::ready(Some(chunk))
    })
}
