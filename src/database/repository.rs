/*!
 * Repository layer for the audit log.
 *
 * `AuditLog` is the only way the rest of the crate touches the database.
 * It offers append and read operations and nothing else: there is no
 * update or delete path.
 */

use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{params, Connection, Params};
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::{format_timestamp, parse_timestamp, LogEntry, LogStatus, NewLogEntry};
use crate::errors::PersistenceError;

const SELECT_COLUMNS: &str = "SELECT id, original_text, translated_text, source_lang, target_lang, \
     timestamp, is_bulk, status, latency_ms, batch_id FROM audit_log";

/// Append-only store of translation attempts
#[derive(Clone, Debug)]
pub struct AuditLog {
    /// Database connection
    db: DatabaseConnection,
}

/// Raw row as read from SQLite, before decoding
struct StoredRow {
    id: i64,
    original_text: String,
    translated_text: Option<String>,
    source_lang: Option<String>,
    target_lang: String,
    timestamp: String,
    is_bulk: bool,
    status: String,
    latency_ms: i64,
    batch_id: Option<String>,
}

impl StoredRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            original_text: row.get(1)?,
            translated_text: row.get(2)?,
            source_lang: row.get(3)?,
            target_lang: row.get(4)?,
            timestamp: row.get(5)?,
            is_bulk: row.get(6)?,
            status: row.get(7)?,
            latency_ms: row.get(8)?,
            batch_id: row.get(9)?,
        })
    }

    fn decode(self) -> Result<LogEntry, PersistenceError> {
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| {
            PersistenceError::CorruptRecord {
                id: self.id,
                reason: format!("invalid timestamp '{}'", self.timestamp),
            }
        })?;

        let status: LogStatus =
            self.status
                .parse()
                .map_err(|_| PersistenceError::CorruptRecord {
                    id: self.id,
                    reason: format!("invalid status '{}'", self.status),
                })?;

        Ok(LogEntry {
            id: self.id,
            original_text: self.original_text,
            translated_text: self.translated_text,
            source_lang: self.source_lang,
            target_lang: self.target_lang,
            timestamp,
            is_bulk: self.is_bulk,
            status,
            latency_ms: self.latency_ms.max(0) as u64,
            batch_id: self.batch_id,
        })
    }
}

impl AuditLog {
    /// Create a new audit log over the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open the audit log at `path`, or at the default location when `None`
    pub fn open(path: Option<&Path>) -> Result<Self, PersistenceError> {
        let db = match path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        Ok(Self::new(db))
    }

    /// Create an audit log backed by an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Location of the backing database
    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Append one completed attempt and return it with its assigned id
    pub async fn append(&self, entry: NewLogEntry) -> Result<LogEntry, PersistenceError> {
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO audit_log (
                        original_text, translated_text, source_lang, target_lang,
                        timestamp, is_bulk, status, latency_ms, batch_id
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                    params![
                        entry.original_text,
                        entry.translated_text,
                        entry.source_lang,
                        entry.target_lang,
                        format_timestamp(&entry.timestamp),
                        entry.is_bulk,
                        entry.status.to_string(),
                        entry.latency_ms as i64,
                        entry.batch_id,
                    ],
                )?;

                let id = conn.last_insert_rowid();
                debug!("Appended audit entry {} ({})", id, entry.status);
                Ok(entry.into_entry(id))
            })
            .await
    }

    /// Most recent entries, newest first
    pub async fn recent(&self, limit: usize, offset: usize) -> Result<Vec<LogEntry>, PersistenceError> {
        self.db
            .execute_async(move |conn| {
                let sql = format!("{} ORDER BY id DESC LIMIT ?1 OFFSET ?2", SELECT_COLUMNS);
                Self::query_entries(conn, &sql, params![limit as i64, offset as i64])
            })
            .await
    }

    /// Entries whose timestamp lies in `[start, end]`, oldest first
    pub async fn range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LogEntry>, PersistenceError> {
        let start = format_timestamp(&start);
        let end = format_timestamp(&end);

        self.db
            .execute_async(move |conn| {
                let sql = format!(
                    "{} WHERE timestamp >= ?1 AND timestamp <= ?2 ORDER BY id ASC",
                    SELECT_COLUMNS
                );
                Self::query_entries(conn, &sql, params![start, end])
            })
            .await
    }

    /// Number of stored entries
    pub async fn count(&self) -> Result<u64, PersistenceError> {
        self.db
            .execute_async(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?;
                Ok(count.max(0) as u64)
            })
            .await
    }

    fn query_entries<P: Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<LogEntry>, PersistenceError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, StoredRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredRow::decode).collect()
    }
}
