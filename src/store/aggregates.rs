//! SQLite-backed aggregate store: one row per closed window, append-only.
//! No update or delete path; retention is an external concern.

use crate::window::AggregateRecord;
use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

pub struct AggregateStore {
    conn: Mutex<Connection>,
    table: String,
}

// The table name is spliced into SQL text; only identifier characters pass.
fn valid_table_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl AggregateStore {
    /// Open or create the DB at path. Table creation is idempotent, so
    /// re-opening an existing store is benign. The table name comes from
    /// deployment config, not runtime input; a malformed one fails here
    /// rather than producing broken SQL later.
    pub fn open(path: &Path, table: &str) -> Result<Self, rusqlite::Error> {
        if !valid_table_name(table) {
            return Err(rusqlite::Error::InvalidParameterName(format!(
                "invalid table name: {table}"
            )));
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                trip_count INTEGER NOT NULL,
                window_end INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_window_end ON {table}(window_end);
            "#,
        ))?;
        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    /// Append one aggregate row. Fire-and-forget from the aggregator's view;
    /// the caller logs failures and moves on.
    pub fn append(&self, record: &AggregateRecord) -> Result<(), rusqlite::Error> {
        self.conn.lock().unwrap().execute(
            &format!(
                "INSERT INTO {} (trip_count, window_end) VALUES (?1, ?2)",
                self.table
            ),
            params![record.count as i64, record.window_end.timestamp_millis()],
        )?;
        Ok(())
    }

    /// Most recently closed window's aggregate, if any row exists.
    pub fn latest(&self) -> Result<Option<AggregateRecord>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT trip_count, window_end FROM {} ORDER BY window_end DESC LIMIT 1",
            self.table
        ))?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            let count: i64 = row.get(0)?;
            let end_ms: i64 = row.get(1)?;
            let window_end = Utc
                .timestamp_millis_opt(end_ms)
                .single()
                .unwrap_or_else(Utc::now);
            return Ok(Some(AggregateRecord {
                count: count.max(0) as u64,
                window_end,
            }));
        }
        Ok(None)
    }

    pub fn len(&self) -> Result<u64, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(n.max(0) as u64)
    }

    pub fn is_empty(&self) -> Result<bool, rusqlite::Error> {
        Ok(self.len()? == 0)
    }
}
