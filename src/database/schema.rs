/*!
 * Audit database schema definitions.
 *
 * This module contains the SQL schema for the audit log
 * and tracks its version in `schema_version`.
 */

use log::{debug, info, warn};
use rusqlite::Connection;

use crate::errors::PersistenceError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<(), PersistenceError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing audit schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        // Written by a newer build; the table layout is only ever extended
        warn!(
            "Audit schema v{} is newer than v{}, continuing",
            current_version, SCHEMA_VERSION
        );
    } else {
        debug!("Audit schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32, PersistenceError> {
    let table_exists: bool = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), PersistenceError> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<(), PersistenceError> {
    // WAL lets readers proceed while an append is in progress
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            original_text TEXT NOT NULL,
            translated_text TEXT,
            source_lang TEXT,
            target_lang TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            is_bulk INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('success', 'failure')),
            latency_ms INTEGER NOT NULL,
            batch_id TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
        CREATE INDEX IF NOT EXISTS idx_audit_target ON audit_log(target_lang);
        "#,
    )?;

    // Rows are write-once
    conn.execute_batch(
        r#"
        CREATE TRIGGER IF NOT EXISTS audit_log_no_update
        BEFORE UPDATE ON audit_log
        BEGIN
            SELECT RAISE(ABORT, 'audit_log is append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS audit_log_no_delete
        BEFORE DELETE ON audit_log
        BEGIN
            SELECT RAISE(ABORT, 'audit_log is append-only');
        END;
        "#,
    )?;

    info!("Audit schema created successfully");
    Ok(())
}
