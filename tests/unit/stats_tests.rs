/*!
 * Tests for usage statistics
 */

use chrono::{Duration, Utc};

use udaan::database::{AuditLog, LogEntry, LogStatus, NewLogEntry};
use udaan::errors::StatsError;
use udaan::stats::StatsAggregator;

fn entry(id: i64, target: &str, ok: bool, latency_ms: u64, batch: Option<&str>) -> LogEntry {
    LogEntry {
        id,
        original_text: format!("text {}", id),
        translated_text: ok.then(|| format!("translated {}", id)),
        source_lang: None,
        target_lang: target.to_string(),
        timestamp: Utc::now(),
        is_bulk: batch.is_some(),
        status: if ok { LogStatus::Success } else { LogStatus::Failure },
        latency_ms,
        batch_id: batch.map(str::to_string),
    }
}

fn aggregate(entries: &[LogEntry], top_n: usize) -> udaan::stats::StatsWindow {
    let end = Utc::now();
    StatsAggregator::aggregate(entries, 7, end - Duration::days(7), end, top_n)
}

#[test]
fn test_aggregate_withNoEntries_shouldReportZeros() {
    let window = aggregate(&[], 5);

    assert_eq!(window.total_translations, 0);
    assert_eq!(window.single.requests, 0);
    assert_eq!(window.single.success_rate, 0.0);
    assert_eq!(window.single.average_latency_ms, 0.0);
    assert_eq!(window.bulk.summary.requests, 0);
    assert_eq!(window.bulk.items_processed, 0);
    assert!(window.top_languages.is_empty());
}

#[test]
fn test_aggregate_shouldSeparateSingleAndBulk() {
    let entries = vec![
        entry(1, "hi", true, 10, None),
        entry(2, "hi", false, 30, None),
        entry(3, "es", true, 5, Some("b1")),
        entry(4, "es", true, 15, Some("b1")),
        entry(5, "es", false, 40, Some("b2")),
    ];

    let window = aggregate(&entries, 5);

    assert_eq!(window.total_translations, 5);
    assert_eq!(window.single.requests, 2);
    assert_eq!(window.single.successful, 1);
    assert_eq!(window.single.failed, 1);
    assert_eq!(window.single.success_rate, 50.0);
    assert_eq!(window.single.average_latency_ms, 20.0);

    assert_eq!(window.bulk.summary.requests, 2);
    assert_eq!(window.bulk.items_processed, 3);
    assert_eq!(window.bulk.summary.successful, 2);
    assert_eq!(window.bulk.summary.success_rate, 66.67);
    assert_eq!(window.bulk.summary.average_latency_ms, 20.0);
}

#[test]
fn test_aggregate_topLanguages_shouldRankAndBreakTiesByCode() {
    let entries = vec![
        entry(1, "ta", true, 1, None),
        entry(2, "es", true, 1, None),
        entry(3, "hi", true, 1, None),
        entry(4, "hi", false, 1, None),
        entry(5, "bn", true, 1, None),
    ];

    let window = aggregate(&entries, 3);
    let ranking: Vec<(&str, u64)> = window
        .top_languages
        .iter()
        .map(|usage| (usage.language.as_str(), usage.count))
        .collect();

    assert_eq!(ranking, vec![("hi", 2), ("bn", 1), ("es", 1)]);
}

#[test]
fn test_statsWindow_serialization_shouldFlattenBulkSummary() {
    let window = aggregate(&[entry(1, "es", true, 8, Some("b1"))], 5);
    let json = serde_json::to_value(&window).unwrap();

    assert_eq!(json["bulk"]["requests"], 1);
    assert_eq!(json["bulk"]["items_processed"], 1);
    assert_eq!(json["days"], 7);
}

#[tokio::test]
async fn test_stats_withZeroDays_shouldFail() {
    let aggregator = StatsAggregator::new(AuditLog::new_in_memory().unwrap(), 5);

    let error = aggregator.stats(0).await.unwrap_err();
    assert!(matches!(error, StatsError::InvalidWindow(0)));
}

#[tokio::test]
async fn test_stats_shouldIgnoreEntriesOutsideWindow() {
    let log = AuditLog::new_in_memory().unwrap();
    let old = NewLogEntry::success(
        "old".to_string(),
        "viejo".to_string(),
        Some("en".to_string()),
        "es".to_string(),
        10,
    )
    .at(Utc::now() - Duration::days(3));
    let recent = NewLogEntry::failure("new".to_string(), None, "hi".to_string(), 20);
    log.append(old).await.unwrap();
    log.append(recent).await.unwrap();

    let aggregator = StatsAggregator::new(log, 5);

    let one_day = aggregator.stats(1).await.unwrap();
    assert_eq!(one_day.total_translations, 1);
    assert_eq!(one_day.single.failed, 1);
    assert_eq!(one_day.top_languages[0].language, "hi");

    let week = aggregator.stats(7).await.unwrap();
    assert_eq!(week.total_translations, 2);
    assert_eq!(week.single.success_rate, 50.0);
}
