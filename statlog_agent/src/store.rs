//! SQLite persistence: one append-only `stats` table.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Row};
use tracing::{debug, info};

use crate::error::{Result, StatError};
use crate::types::Sample;

pub const DEFAULT_STORE_PATH: &str = "./stats.db";

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS stats (
        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
        cpu_usage REAL,
        memory_used REAL,
        memory_total REAL
    )";

// COALESCE keeps the column default when the sample carries no time
const INSERT_SQL: &str = "
    INSERT INTO stats (timestamp, cpu_usage, memory_used, memory_total)
    VALUES (COALESCE(?, CURRENT_TIMESTAMP), ?, ?, ?)";

const COLUMNS: [&str; 4] = ["timestamp", "cpu_usage", "memory_used", "memory_total"];

// Same text layout SQLite uses for CURRENT_TIMESTAMP
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sink for samples. One call per successful tick.
#[allow(async_fn_in_trait)]
pub trait Recorder {
    async fn append(&mut self, sample: &Sample) -> Result<()>;
}

pub struct SqliteRecorder {
    conn: SqliteConnection,
}

impl SqliteRecorder {
    /// Open (or create) the database at `path` and make sure `stats` exists
    /// with the expected columns. Safe to call again on the same file.
    pub async fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let conn = SqliteConnection::connect_with(&opts)
            .await
            .map_err(|source| StatError::StoreUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), "store opened");
        Self::with_schema(conn).await
    }

    /// Same schema on a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let opts: SqliteConnectOptions = "sqlite::memory:"
            .parse()
            .map_err(|source| StatError::StoreUnavailable {
                path: ":memory:".into(),
                source,
            })?;
        let conn = SqliteConnection::connect_with(&opts)
            .await
            .map_err(|source| StatError::StoreUnavailable {
                path: ":memory:".into(),
                source,
            })?;
        Self::with_schema(conn).await
    }

    async fn with_schema(mut conn: SqliteConnection) -> Result<Self> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&mut conn)
            .await
            .map_err(|e| StatError::SchemaError(format!("failed to create table: {e}")))?;

        let rows = sqlx::query("SELECT name FROM pragma_table_info('stats')")
            .fetch_all(&mut conn)
            .await
            .map_err(|e| StatError::SchemaError(format!("failed to inspect table: {e}")))?;
        let mut found = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| StatError::SchemaError(format!("failed to inspect table: {e}")))?;
            found.push(name);
        }
        check_columns(&found)?;
        debug!("stats table ready");

        Ok(Self { conn })
    }

    pub async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

impl Recorder for SqliteRecorder {
    async fn append(&mut self, sample: &Sample) -> Result<()> {
        let ts = sample
            .timestamp
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string());
        sqlx::query(INSERT_SQL)
            .bind(ts)
            .bind(sample.cpu_usage)
            .bind(sample.memory_used)
            .bind(sample.memory_total)
            .execute(&mut self.conn)
            .await
            .map_err(StatError::WriteFailure)?;
        Ok(())
    }
}

// Declared types are not compared: SQLite affinity lets an older table with
// INTEGER memory columns take REAL values.
fn check_columns(found: &[String]) -> Result<()> {
    let mut have: Vec<&str> = found.iter().map(String::as_str).collect();
    have.sort_unstable();
    let mut want = COLUMNS.to_vec();
    want.sort_unstable();
    if have != want {
        return Err(StatError::SchemaError(format!(
            "existing stats table has columns [{}], expected [{}]",
            found.join(", "),
            COLUMNS.join(", ")
        )));
    }
    Ok(())
}
