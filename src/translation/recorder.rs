/*!
 * Best-effort audit recording.
 *
 * Append failures never reach the caller of a translation. They are
 * reported on the `error!` log channel and counted, and the count is
 * surfaced by the service health report.
 */

use log::error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::database::{AuditLog, LogEntry, NewLogEntry};

/// Writes completed attempts to the audit log
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    log: AuditLog,
    /// Appends that failed, shared between clones
    failures: Arc<AtomicU64>,
}

impl AuditRecorder {
    pub fn new(log: AuditLog) -> Self {
        Self {
            log,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Append one entry, returning the stored record on success
    pub async fn record(&self, entry: NewLogEntry) -> Option<LogEntry> {
        match self.log.append(entry).await {
            Ok(stored) => Some(stored),
            Err(e) => {
                let total = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                error!("Failed to write audit entry ({} failures so far): {}", total, e);
                None
            }
        }
    }

    /// Number of appends that failed since startup
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// The underlying store
    pub fn log(&self) -> &AuditLog {
        &self.log
    }
}
