/*!
 * Usage statistics computed from the audit log.
 *
 * Nothing here is persisted: every `StatsWindow` is derived by scanning the
 * log entries whose timestamp falls inside `[now - days, now]`.
 */

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::database::{AuditLog, LogEntry, LogStatus};
use crate::errors::StatsError;

/// Counters for one request category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub requests: u64,
    pub successful: u64,
    pub failed: u64,
    /// Percentage, two decimals; 0 when nothing was attempted
    pub success_rate: f64,
    /// Two decimals; 0 when nothing was attempted
    pub average_latency_ms: f64,
}

/// Bulk counters; success and latency figures are per item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkStats {
    #[serde(flatten)]
    pub summary: CategoryStats,
    pub items_processed: u64,
}

/// How often a target language was requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageUsage {
    pub language: String,
    pub count: u64,
}

/// Aggregated usage over a day range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsWindow {
    pub days: u32,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Logged attempts, single and bulk items together
    pub total_translations: u64,
    pub single: CategoryStats,
    pub bulk: BulkStats,
    pub top_languages: Vec<LanguageUsage>,
}

#[derive(Default)]
struct Tally {
    attempts: u64,
    successful: u64,
    latency_total: u64,
}

impl Tally {
    fn add(&mut self, entry: &LogEntry) {
        self.attempts += 1;
        if entry.status == LogStatus::Success {
            self.successful += 1;
        }
        self.latency_total += entry.latency_ms;
    }

    fn summarize(&self, requests: u64) -> CategoryStats {
        CategoryStats {
            requests,
            successful: self.successful,
            failed: self.attempts - self.successful,
            success_rate: percentage(self.successful, self.attempts),
            average_latency_ms: if self.attempts == 0 {
                0.0
            } else {
                round2(self.latency_total as f64 / self.attempts as f64)
            },
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 * 100.0 / whole as f64)
    }
}

/// Computes `StatsWindow`s from the audit log
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    log: AuditLog,
    top_languages: usize,
}

impl StatsAggregator {
    pub fn new(log: AuditLog, top_languages: usize) -> Self {
        Self { log, top_languages }
    }

    /// Statistics for the last `days` days
    pub async fn stats(&self, days: u32) -> Result<StatsWindow, StatsError> {
        if days == 0 {
            return Err(StatsError::InvalidWindow(days));
        }

        let window_end = Utc::now();
        let window_start = window_end - Duration::days(i64::from(days));
        let entries = self.log.range(window_start, window_end).await?;

        Ok(Self::aggregate(
            &entries,
            days,
            window_start,
            window_end,
            self.top_languages,
        ))
    }

    /// Pure aggregation over entries already filtered to the window
    pub fn aggregate(
        entries: &[LogEntry],
        days: u32,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        top_n: usize,
    ) -> StatsWindow {
        let mut single = Tally::default();
        let mut bulk = Tally::default();
        let mut batches: BTreeSet<&str> = BTreeSet::new();
        let mut unbatched_bulk = 0u64;
        let mut languages: HashMap<&str, u64> = HashMap::new();

        for entry in entries {
            if entry.is_bulk {
                bulk.add(entry);
                match entry.batch_id.as_deref() {
                    Some(batch_id) => {
                        batches.insert(batch_id);
                    }
                    None => unbatched_bulk += 1,
                }
            } else {
                single.add(entry);
            }
            *languages.entry(entry.target_lang.as_str()).or_insert(0) += 1;
        }

        let mut ranking: Vec<LanguageUsage> = languages
            .into_iter()
            .map(|(language, count)| LanguageUsage {
                language: language.to_string(),
                count,
            })
            .collect();
        ranking.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.language.cmp(&b.language)));
        ranking.truncate(top_n);

        StatsWindow {
            days,
            window_start,
            window_end,
            total_translations: entries.len() as u64,
            single: single.summarize(single.attempts),
            bulk: BulkStats {
                summary: bulk.summarize(batches.len() as u64 + unbatched_bulk),
                items_processed: bulk.attempts,
            },
            top_languages: ranking,
        }
    }
}
