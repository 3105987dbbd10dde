use crate::{validation::DateTimeRange, ExportTask, TaskStatus};
use sqlx::{QueryBuilder, Sqlite};

/// Filter over the generic task-queue attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueuePredicate {
    pub device_name: Option<String>,
    pub status: Option<TaskStatus>,
}

impl QueuePredicate {
    pub fn matches(&self, task: &ExportTask) -> bool {
        self.device_name.as_ref().map_or(true, |name| &task.device_name == name)
            && self.status.map_or(true, |status| task.status == status)
    }

    /// Append `AND ...` conditions for this predicate
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>) {
        if let Some(name) = &self.device_name {
            qb.push(" AND device_name = ").push_bind(name.clone());
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
    }
}

/// Filter over the export-specific task attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPredicate {
    pub exporter_id: Option<String>,
    pub device_name: Option<String>,
    pub created_time: Option<DateTimeRange>,
    pub updated_time: Option<DateTimeRange>,
}

impl ExportPredicate {
    pub fn matches(&self, task: &ExportTask) -> bool {
        self.exporter_id.as_ref().map_or(true, |id| &task.exporter_id == id)
            && self.device_name.as_ref().map_or(true, |name| &task.device_name == name)
            && self.created_time.map_or(true, |range| range.contains(task.created_time))
            && self.updated_time.map_or(true, |range| range.contains(task.updated_time))
    }

    /// Append `AND ...` conditions for this predicate
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>) {
        if let Some(id) = &self.exporter_id {
            qb.push(" AND exporter_id = ").push_bind(id.clone());
        }
        if let Some(name) = &self.device_name {
            qb.push(" AND device_name = ").push_bind(name.clone());
        }
        if let Some(range) = &self.created_time {
            push_range(qb, "created_time", range);
        }
        if let Some(range) = &self.updated_time {
            push_range(qb, "updated_time", range);
        }
    }
}

// Timestamp columns hold epoch milliseconds; sub-millisecond bounds are
// rounded so that the SQL filter selects the same rows as `matches`.
fn push_range<'args>(qb: &mut QueryBuilder<'args, Sqlite>, column: &'static str, range: &DateTimeRange) {
    if let Some(start) = range.start {
        let millis = start.timestamp_millis() + i64::from(start.timestamp_subsec_micros() % 1000 != 0);
        qb.push(format!(" AND {column} >= ")).push_bind(millis);
    }
    if let Some(end) = range.end {
        qb.push(format!(" AND {column} <= ")).push_bind(end.timestamp_millis());
    }
}

/// Conjunction of the queue and export predicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchMatcher {
    pub queue: QueuePredicate,
    pub export: ExportPredicate,
}

impl BatchMatcher {
    pub fn new(queue: QueuePredicate, export: ExportPredicate) -> Self {
        Self { queue, export }
    }

    /// Matcher that accepts every task
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, task: &ExportTask) -> bool {
        self.queue.matches(task) && self.export.matches(task)
    }

    /// Append the conditions of both predicates after an existing `WHERE` clause
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Sqlite>) {
        self.queue.push_sql(qb);
        self.export.push_sql(qb);
    }
}
