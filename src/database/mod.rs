/*!
 * Database module for the persistent audit log.
 *
 * This module provides SQLite-based persistence for every completed
 * translation attempt, single or bulk. The log is append-only and is the
 * sole data source of the statistics aggregator.
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{LogEntry, LogStatus, NewLogEntry};
pub use repository::AuditLog;
