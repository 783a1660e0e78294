use {async_trait::async_trait, sqlx::SqlitePool};

use crate::{TelemetryEvent, TelemetrySink};

/// SQLite-backed telemetry sink.
pub struct SqliteTelemetrySink {
    pool: SqlitePool,
}

impl SqliteTelemetrySink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the telemetry_logs table schema.
    pub async fn init(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS telemetry_logs (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT    NOT NULL,
                event_type TEXT    NOT NULL,
                payload    TEXT    NOT NULL,
                metadata   TEXT,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_telemetry_logs_session_created
             ON telemetry_logs (session_id, created_at DESC)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TelemetrySink for SqliteTelemetrySink {
    async fn append(&self, event: TelemetryEvent) -> anyhow::Result<()> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        sqlx::query(
            "INSERT INTO telemetry_logs (session_id, event_type, payload, metadata, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&event.session_id)
        .bind(event.event_type.as_str())
        .bind(event.payload.to_string())
        .bind(event.metadata.as_ref().map(ToString::to_string))
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
