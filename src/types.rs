use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a queued export task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Scheduled,
    InProcess,
    Completed,
    Warning,
    Failed,
    Canceled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Scheduled,
        TaskStatus::InProcess,
        TaskStatus::Completed,
        TaskStatus::Warning,
        TaskStatus::Failed,
        TaskStatus::Canceled,
    ];

    /// Wire name as accepted by the `status` query parameter and stored in the task table
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Scheduled => "SCHEDULED",
            TaskStatus::InProcess => "IN PROCESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Warning => "WARNING",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the six wire names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown task status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    // Exact match only; "in process" and "IN_PROCESS" are unknown.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Export task as recorded by the task store
///
/// Read-only from the point of view of this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTask {
    /// Store key, used only to keep batch ordering deterministic
    pub pk: i64,
    pub batch_id: Option<String>,
    pub device_name: String,
    pub exporter_id: String,
    pub status: TaskStatus,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub processing_start_time: Option<DateTime<Utc>>,
    pub processing_end_time: Option<DateTime<Utc>>,
}

impl ExportTask {
    /// Grouping key; an empty batch id counts as no batch id
    pub fn batch_key(&self) -> Option<&str> {
        self.batch_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Inclusive `[lo, hi]` pair of instants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub lo: DateTime<Utc>,
    pub hi: DateTime<Utc>,
}

impl TimeRange {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { lo: instant, hi: instant }
    }

    /// Widen `range` so that it covers `instant`, creating it on first use
    pub fn accumulate(range: &mut Option<TimeRange>, instant: Option<DateTime<Utc>>) {
        let Some(instant) = instant else {
            return;
        };
        match range {
            Some(r) => {
                r.lo = r.lo.min(instant);
                r.hi = r.hi.max(instant);
            }
            None => *range = Some(TimeRange::at(instant)),
        }
    }
}

/// Per-status task tally of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub scheduled: u64,
    pub in_process: u64,
    pub completed: u64,
    pub warning: u64,
    pub failed: u64,
    pub canceled: u64,
}

impl StatusCounts {
    pub fn record(&mut self, status: TaskStatus) {
        let slot = match status {
            TaskStatus::Scheduled => &mut self.scheduled,
            TaskStatus::InProcess => &mut self.in_process,
            TaskStatus::Completed => &mut self.completed,
            TaskStatus::Warning => &mut self.warning,
            TaskStatus::Failed => &mut self.failed,
            TaskStatus::Canceled => &mut self.canceled,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.scheduled + self.in_process + self.completed + self.warning + self.failed + self.canceled
    }
}

/// Aggregate view over the export tasks sharing one batch id
///
/// Built fresh for every request and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBatch {
    /// `None` for a singleton batch formed by a task without batch id
    pub batch_id: Option<String>,
    pub device_names: BTreeSet<String>,
    pub exporter_ids: BTreeSet<String>,
    pub counts: StatusCounts,
    pub created_time_range: Option<TimeRange>,
    pub updated_time_range: Option<TimeRange>,
    pub scheduled_time_range: Option<TimeRange>,
    pub processing_start_time_range: Option<TimeRange>,
    pub processing_end_time_range: Option<TimeRange>,
    /// Smallest member task key
    pub first_pk: i64,
}

impl ExportBatch {
    pub fn new(batch_id: Option<String>, first_pk: i64) -> Self {
        Self {
            batch_id,
            device_names: BTreeSet::new(),
            exporter_ids: BTreeSet::new(),
            counts: StatusCounts::default(),
            created_time_range: None,
            updated_time_range: None,
            scheduled_time_range: None,
            processing_start_time_range: None,
            processing_end_time_range: None,
            first_pk,
        }
    }

    /// Fold one member task into the batch
    pub fn add(&mut self, task: &ExportTask) {
        self.counts.record(task.status);
        // Avoid an allocation when the name is already known.
        if !self.device_names.contains(&task.device_name) {
            self.device_names.insert(task.device_name.clone());
        }
        if !self.exporter_ids.contains(&task.exporter_id) {
            self.exporter_ids.insert(task.exporter_id.clone());
        }
        TimeRange::accumulate(&mut self.created_time_range, Some(task.created_time));
        TimeRange::accumulate(&mut self.updated_time_range, Some(task.updated_time));
        TimeRange::accumulate(&mut self.scheduled_time_range, task.scheduled_time);
        TimeRange::accumulate(&mut self.processing_start_time_range, task.processing_start_time);
        TimeRange::accumulate(&mut self.processing_end_time_range, task.processing_end_time);
        self.first_pk = self.first_pk.min(task.pk);
    }

    pub fn task_count(&self) -> u64 {
        self.counts.total()
    }

    /// Latest creation time among member tasks
    pub fn max_created_time(&self) -> Option<DateTime<Utc>> {
        self.created_time_range.map(|r| r.hi)
    }

    /// Latest update time among member tasks
    pub fn max_updated_time(&self) -> Option<DateTime<Utc>> {
        self.updated_time_range.map(|r| r.hi)
    }
}
