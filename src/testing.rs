//! Shared fixtures for unit tests

use crate::{ExportTask, TaskStatus};
use chrono::{DateTime, TimeZone, Utc};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Export task with created == updated and no optional timestamps
pub fn task(pk: i64, batch_id: Option<&str>, status: TaskStatus, updated: i64) -> ExportTask {
    ExportTask {
        pk,
        batch_id: batch_id.map(str::to_string),
        device_name: "dcm4chee-arc".to_string(),
        exporter_id: "STORESCU".to_string(),
        status,
        created_time: at(updated),
        updated_time: at(updated),
        scheduled_time: None,
        processing_start_time: None,
        processing_end_time: None,
    }
}
