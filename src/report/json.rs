use super::{truncate_on_error, ReportRenderer, ReportStream};
use crate::{error::ReportError, ExportBatch, StatusCounts, TimeRange};
use axum::body::Bytes;
use chrono::SecondsFormat;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::error;

/// Renders the batch report as a JSON array
///
/// Each batch becomes one object; empty sets, absent ranges and a missing
/// batch id are left out, while all six task counters are always written.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportRenderer;

impl JsonReportRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for JsonReportRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, batches: Vec<ExportBatch>) -> ReportStream {
        let records = stream::iter(batches.into_iter().enumerate()).map(|(i, batch)| {
            let mut chunk = Vec::with_capacity(512);
            if i > 0 {
                chunk.push(b',');
            }
            serde_json::to_writer(&mut chunk, &BatchRecord::from(&batch)).map_err(|e| {
                error!("Failed to render export batch {:?}: {}", batch.batch_id, e);
                ReportError::from(e)
            })?;
            Ok::<_, ReportError>(Bytes::from(chunk))
        });

        let body = stream::once(async { Ok::<_, ReportError>(Bytes::from_static(b"[")) })
            .chain(records)
            .chain(stream::once(async { Ok::<_, ReportError>(Bytes::from_static(b"]")) }));

        truncate_on_error(body).boxed()
    }
}

/// Wire shape of one batch
#[derive(Serialize)]
struct BatchRecord<'a> {
    #[serde(rename = "batchID", skip_serializing_if = "Option::is_none")]
    batch_id: Option<&'a str>,
    tasks: TaskCounts,
    #[serde(rename = "dicomDeviceName", skip_serializing_if = "is_empty")]
    device_names: &'a BTreeSet<String>,
    #[serde(rename = "ExporterID", skip_serializing_if = "is_empty")]
    exporter_ids: &'a BTreeSet<String>,
    #[serde(rename = "createdTimeRange", skip_serializing_if = "Option::is_none")]
    created_time_range: Option<[String; 2]>,
    #[serde(rename = "updatedTimeRange", skip_serializing_if = "Option::is_none")]
    updated_time_range: Option<[String; 2]>,
    #[serde(rename = "scheduledTimeRange", skip_serializing_if = "Option::is_none")]
    scheduled_time_range: Option<[String; 2]>,
    #[serde(rename = "processingStartTimeRange", skip_serializing_if = "Option::is_none")]
    processing_start_time_range: Option<[String; 2]>,
    #[serde(rename = "processingEndTimeRange", skip_serializing_if = "Option::is_none")]
    processing_end_time_range: Option<[String; 2]>,
}

#[derive(Serialize)]
struct TaskCounts {
    scheduled: u64,
    #[serde(rename = "in-process")]
    in_process: u64,
    warning: u64,
    failed: u64,
    canceled: u64,
    completed: u64,
}

fn is_empty(set: &&BTreeSet<String>) -> bool {
    set.is_empty()
}

fn range(range: Option<TimeRange>) -> Option<[String; 2]> {
    range.map(|r| {
        [
            r.lo.to_rfc3339_opts(SecondsFormat::Millis, true),
            r.hi.to_rfc3339_opts(SecondsFormat::Millis, true),
        ]
    })
}

impl From<StatusCounts> for TaskCounts {
    fn from(counts: StatusCounts) -> Self {
        Self {
            scheduled: counts.scheduled,
            in_process: counts.in_process,
            warning: counts.warning,
            failed: counts.failed,
            canceled: counts.canceled,
            completed: counts.completed,
        }
    }
}

impl<'a> From<&'a ExportBatch> for BatchRecord<'a> {
    fn from(batch: &'a ExportBatch) -> Self {
        Self {
            batch_id: batch.batch_id.as_deref().filter(|id| !id.is_empty()),
            tasks: batch.counts.into(),
            device_names: &batch.device_names,
            exporter_ids: &batch.exporter_ids,
            created_time_range: range(batch.created_time_range),
            updated_time_range: range(batch.updated_time_range),
            scheduled_time_range: range(batch.scheduled_time_range),
            processing_start_time_range: range(batch.processing_start_time_range),
            processing_end_time_range: range(batch.processing_end_time_range),
        }
    }
}
