use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::domain::{now_timestamp, KanbanError, OperationMetric};

/// Metrics kept in the database; older rows are trimmed on insert.
pub const METRICS_RETENTION: i64 = 1000;
pub const SLOW_OPERATION: Duration = Duration::from_millis(1000);
const SLOWEST_SHOWN: i64 = 10;

/// Times console operations and persists the timings so they can be
/// reported across invocations.
#[derive(Clone, Debug)]
pub struct MetricsCollector {
    pool: SqlitePool,
}

impl MetricsCollector {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs `operation`, records how long it took and whether it failed, and
    /// hands back its result untouched.
    pub async fn measure<T, E, F>(&self, name: &str, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let started = Instant::now();
        let result = operation.await;
        let elapsed = started.elapsed();

        let recorded = match &result {
            Ok(_) => self.record(name, elapsed, true, "").await,
            Err(e) => {
                self.record(&format!("{} (error)", name), elapsed, false, &e.to_string())
                    .await
            }
        };
        if let Err(e) = recorded {
            tracing::warn!("Failed to record metric for {}: {}", name, e);
        }

        result
    }

    pub async fn record(
        &self,
        operation: &str,
        elapsed: Duration,
        succeeded: bool,
        details: &str,
    ) -> Result<(), KanbanError> {
        let duration_ms = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);

        if elapsed > SLOW_OPERATION {
            tracing::warn!("Slow operation detected: {} - {}ms", operation, duration_ms);
        } else {
            tracing::debug!("Metric recorded: {} - {}ms", operation, duration_ms);
        }

        sqlx::query(
            "INSERT INTO operation_metrics (operation, duration_ms, succeeded, details, recorded_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(operation)
        .bind(duration_ms)
        .bind(succeeded)
        .bind(details)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "DELETE FROM operation_metrics WHERE id IN (SELECT id FROM operation_metrics ORDER BY id DESC LIMIT -1 OFFSET ?)",
        )
        .bind(METRICS_RETENTION)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn report(&self) -> Result<MetricsReport, KanbanError> {
        let totals: MetricTotals = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total_operations,
                COALESCE(AVG(duration_ms), 0.0) AS average_ms,
                COALESCE(MAX(duration_ms), 0) AS max_ms,
                COALESCE(MIN(duration_ms), 0) AS min_ms,
                COALESCE(SUM(CASE WHEN succeeded = 0 THEN 1 ELSE 0 END), 0) AS failed_operations
            FROM operation_metrics
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let operations: Vec<OperationStats> = sqlx::query_as(
            r#"
            SELECT
                operation,
                COUNT(*) AS count,
                AVG(duration_ms) AS average_ms,
                MAX(duration_ms) AS max_ms,
                MIN(duration_ms) AS min_ms
            FROM operation_metrics
            GROUP BY operation
            ORDER BY operation ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let slowest: Vec<OperationMetric> = sqlx::query_as(
            "SELECT id, operation, duration_ms, succeeded, details, recorded_at FROM operation_metrics ORDER BY duration_ms DESC, id DESC LIMIT ?",
        )
        .bind(SLOWEST_SHOWN)
        .fetch_all(&self.pool)
        .await?;

        Ok(MetricsReport {
            generated_at: Utc::now(),
            total_operations: totals.total_operations,
            failed_operations: totals.failed_operations,
            average_ms: totals.average_ms,
            max_ms: totals.max_ms,
            min_ms: totals.min_ms,
            operations,
            slowest,
        })
    }

    pub async fn clear(&self) -> Result<u64, KanbanError> {
        let result = sqlx::query("DELETE FROM operation_metrics")
            .execute(&self.pool)
            .await?;

        tracing::info!("Cleared {} metrics", result.rows_affected());
        Ok(result.rows_affected())
    }
}

#[derive(Debug, FromRow)]
struct MetricTotals {
    total_operations: i64,
    average_ms: f64,
    max_ms: i64,
    min_ms: i64,
    failed_operations: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OperationStats {
    pub operation: String,
    pub count: i64,
    pub average_ms: f64,
    pub max_ms: i64,
    pub min_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub generated_at: DateTime<Utc>,
    pub total_operations: i64,
    pub failed_operations: i64,
    pub average_ms: f64,
    pub max_ms: i64,
    pub min_ms: i64,
    pub operations: Vec<OperationStats>,
    pub slowest: Vec<OperationMetric>,
}
