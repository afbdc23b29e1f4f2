/*!
 * Audit log entity models.
 *
 * These structures map directly to the `audit_log` table and provide
 * type-safe access to persisted translation attempts.
 */

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a logged translation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    /// The engine returned a translation
    Success,
    /// The engine failed or timed out
    Failure,
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStatus::Success => write!(f, "success"),
            LogStatus::Failure => write!(f, "failure"),
        }
    }
}

impl std::str::FromStr for LogStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(LogStatus::Success),
            "failure" => Ok(LogStatus::Failure),
            _ => Err(anyhow::anyhow!("Invalid log status: {}", s)),
        }
    }
}

/// A persisted, immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Monotonically increasing identifier assigned by the store
    pub id: i64,
    /// Text submitted for translation
    pub original_text: String,
    /// Translation, absent on failure
    pub translated_text: Option<String>,
    /// Source language, when given or detected
    pub source_lang: Option<String>,
    /// Target language code
    pub target_lang: String,
    /// Completion time of the attempt
    pub timestamp: DateTime<Utc>,
    /// Whether the attempt was part of a bulk request
    pub is_bulk: bool,
    /// Outcome
    pub status: LogStatus,
    /// Engine call duration in milliseconds
    pub latency_ms: u64,
    /// Shared by every item of one bulk request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

/// An attempt waiting to be appended; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub original_text: String,
    pub translated_text: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub timestamp: DateTime<Utc>,
    pub is_bulk: bool,
    pub status: LogStatus,
    pub latency_ms: u64,
    pub batch_id: Option<String>,
}

impl NewLogEntry {
    /// Record of a successful attempt, stamped now
    pub fn success(
        original_text: String,
        translated_text: String,
        source_lang: Option<String>,
        target_lang: String,
        latency_ms: u64,
    ) -> Self {
        Self {
            original_text,
            translated_text: Some(translated_text),
            source_lang,
            target_lang,
            timestamp: Utc::now(),
            is_bulk: false,
            status: LogStatus::Success,
            latency_ms,
            batch_id: None,
        }
    }

    /// Record of a failed attempt, stamped now
    pub fn failure(
        original_text: String,
        source_lang: Option<String>,
        target_lang: String,
        latency_ms: u64,
    ) -> Self {
        Self {
            original_text,
            translated_text: None,
            source_lang,
            target_lang,
            timestamp: Utc::now(),
            is_bulk: false,
            status: LogStatus::Failure,
            latency_ms,
            batch_id: None,
        }
    }

    /// Mark the record as one item of the given bulk request
    pub fn in_batch(mut self, batch_id: &str) -> Self {
        self.is_bulk = true;
        self.batch_id = Some(batch_id.to_string());
        self
    }

    /// Override the completion time
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub(crate) fn into_entry(self, id: i64) -> LogEntry {
        LogEntry {
            id,
            original_text: self.original_text,
            translated_text: self.translated_text,
            source_lang: self.source_lang,
            target_lang: self.target_lang,
            // Stored at millisecond precision; keep the returned value identical to a re-read
            timestamp: truncate_to_millis(self.timestamp),
            is_bulk: self.is_bulk,
            status: self.status,
            latency_ms: self.latency_ms,
            batch_id: self.batch_id,
        }
    }
}

/// Fixed-width RFC 3339 form used in the database, so range scans can compare strings
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp.timestamp_millis()).unwrap_or(timestamp)
}
