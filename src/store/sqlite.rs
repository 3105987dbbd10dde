//! SQLite Task Store Module
//!
//! Persistent export task store backed by sqlx. Filters are pushed down into
//! the `WHERE` clause; grouping happens in `BatchAggregator`.
//!
//! # Storage
//! One row per export task in `export_task`. Timestamps are stored as epoch
//! milliseconds so range filters compare numerically.

use super::TaskStore;
use crate::{config::DatabaseConfig, error::StoreError, matcher::BatchMatcher, ExportTask, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use tracing::{debug, info};

const SELECT_TASKS: &str = r#"
    SELECT pk, batch_id, device_name, exporter_id, status,
           created_time, updated_time, scheduled_time,
           processing_start_time, processing_end_time
    FROM export_task
    WHERE 1 = 1"#;

/// Raw `export_task` row
#[derive(Debug, FromRow)]
struct TaskRow {
    pk: i64,
    batch_id: Option<String>,
    device_name: String,
    exporter_id: String,
    status: String,
    created_time: i64,
    updated_time: i64,
    scheduled_time: Option<i64>,
    processing_start_time: Option<i64>,
    processing_end_time: Option<i64>,
}

impl TryFrom<TaskRow> for ExportTask {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let pk = row.pk;
        let corrupt = |reason: String| StoreError::CorruptRow { pk, reason };
        let instant = |millis: i64| {
            DateTime::<Utc>::from_timestamp_millis(millis)
                .ok_or_else(|| corrupt(format!("timestamp {millis} out of range")))
        };
        let optional = |millis: Option<i64>| millis.map(instant).transpose();

        Ok(ExportTask {
            pk,
            batch_id: row.batch_id,
            device_name: row.device_name,
            exporter_id: row.exporter_id,
            status: row.status.parse::<TaskStatus>().map_err(|e| corrupt(e.to_string()))?,
            created_time: instant(row.created_time)?,
            updated_time: instant(row.updated_time)?,
            scheduled_time: optional(row.scheduled_time)?,
            processing_start_time: optional(row.processing_start_time)?,
            processing_end_time: optional(row.processing_end_time)?,
        })
    }
}

/// Export task store on a SQLite connection pool
#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    /// Open the pool described by `config` and make sure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        info!("Opening export task store at {}", config.url);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        let store = Self { pool };
        store.initialize_tables().await?;
        Ok(store)
    }

    async fn initialize_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS export_task (
                pk INTEGER PRIMARY KEY,
                batch_id TEXT,
                device_name TEXT NOT NULL,
                exporter_id TEXT NOT NULL,
                status TEXT NOT NULL,
                created_time INTEGER NOT NULL,
                updated_time INTEGER NOT NULL,
                scheduled_time INTEGER,
                processing_start_time INTEGER,
                processing_end_time INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_export_task_batch ON export_task (batch_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a task row; timestamps are truncated to milliseconds
    pub async fn insert_task(&self, task: &ExportTask) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO export_task (pk, batch_id, device_name, exporter_id, status,
                created_time, updated_time, scheduled_time,
                processing_start_time, processing_end_time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(task.pk)
        .bind(&task.batch_id)
        .bind(&task.device_name)
        .bind(&task.exporter_id)
        .bind(task.status.as_str())
        .bind(task.created_time.timestamp_millis())
        .bind(task.updated_time.timestamp_millis())
        .bind(task.scheduled_time.map(|t| t.timestamp_millis()))
        .bind(task.processing_start_time.map(|t| t.timestamp_millis()))
        .bind(task.processing_end_time.map(|t| t.timestamp_millis()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list_tasks(&self, matcher: &BatchMatcher) -> Result<Vec<ExportTask>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_TASKS);
        matcher.push_sql(&mut qb);
        qb.push(" ORDER BY pk");

        // One statement inside a read transaction: a single consistent snapshot.
        let mut tx = self.pool.begin().await?;
        let rows: Vec<TaskRow> = qb.build_query_as::<TaskRow>().fetch_all(&mut *tx).await?;
        tx.commit().await?;

        debug!("Fetched {} export task rows", rows.len());
        rows.into_iter().map(ExportTask::try_from).collect()
    }
}
