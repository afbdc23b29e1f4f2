/*!
 * Integration tests for bulk dispatch: ordering, concurrency bounds and timeouts
 */

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use udaan::database::{AuditLog, LogStatus};
use udaan::errors::EngineErrorKind;
use udaan::providers::MockEngine;
use udaan::translation::{AuditRecorder, BulkDispatcher, TranslationRequest};

use crate::common;
use crate::common::mock_providers::{
    ConcurrencyTrackingEngine, ReverseDelayEngine, SelectiveHangEngine,
};

#[tokio::test]
async fn test_dispatch_withEarlyItemsFinishingLast_shouldPreserveOrder() {
    let mut config = common::test_config();
    config.limits.concurrency = 10;
    let service = common::service_with_engine(&config, Arc::new(ReverseDelayEngine::new(10, 15)));

    let texts: Vec<String> = (0..10).map(|i| i.to_string()).collect();
    let result = service.bulk_translate_texts(texts, "es").await.unwrap();

    assert_eq!(result.success_count(), 10);
    for (index, item) in result.items().iter().enumerate() {
        let success = item.as_success().unwrap();
        assert_eq!(success.original_text, index.to_string());
        assert_eq!(success.translated_text, format!("translated-{}", index));
    }

    // Audit entries are written in request order after the batch settles
    let mut logs = service.recent_logs(10, 0).await.unwrap();
    logs.reverse();
    let logged: Vec<String> = logs.into_iter().map(|entry| entry.original_text).collect();
    let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
    assert_eq!(logged, expected);
}

#[tokio::test]
async fn test_dispatch_shouldNeverExceedConcurrencyLimit() {
    let engine = ConcurrencyTrackingEngine::new(40);
    let tracker = engine.tracker();
    let config = common::test_config();
    let service = common::service_with_engine(&config, Arc::new(engine));

    let texts: Vec<String> = (0..20).map(|i| format!("item {}", i)).collect();
    let result = service.bulk_translate_texts(texts, "hi").await.unwrap();

    assert_eq!(result.success_count(), 20);
    assert_eq!(tracker.total_calls(), 20);
    assert!(tracker.max_in_flight() <= config.limits.concurrency);
    assert!(tracker.max_in_flight() > 1, "items should run concurrently");
}

#[tokio::test]
async fn test_dispatch_withConcurrencyOne_shouldRunSequentially() {
    let engine = ConcurrencyTrackingEngine::new(5);
    let tracker = engine.tracker();
    let log = AuditLog::new_in_memory().unwrap();
    let dispatcher = BulkDispatcher::new(
        Arc::new(engine),
        AuditRecorder::new(log),
        1,
        Duration::from_secs(1),
    );

    let items: Vec<TranslationRequest> = (0..5)
        .map(|i| TranslationRequest::new(format!("item {}", i), "ta"))
        .collect();
    dispatcher.dispatch(&items).await;

    assert_eq!(tracker.max_in_flight(), 1);
}

#[tokio::test]
async fn test_dispatch_insideSpawnedTask_shouldComplete() {
    let log = AuditLog::new_in_memory().unwrap();
    let dispatcher = BulkDispatcher::new(
        Arc::new(MockEngine::new()),
        AuditRecorder::new(log.clone()),
        2,
        Duration::from_secs(1),
    );

    let items = vec![
        TranslationRequest::new("hello", "es"),
        TranslationRequest::new("world", "es"),
    ];
    let handle = tokio::spawn(async move { dispatcher.dispatch(&items).await });
    let result = handle.await.unwrap();

    assert_eq!(result.success_count(), 2);
    assert_eq!(result.get(1).unwrap().as_success().unwrap().translated_text, "mundo");
    assert_eq!(log.recent(10, 0).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_dispatch_withHangingItem_shouldTimeOutOnlyThatItem() {
    common::init_logging();
    let log = AuditLog::new_in_memory().unwrap();
    let dispatcher = BulkDispatcher::new(
        Arc::new(SelectiveHangEngine),
        AuditRecorder::new(log.clone()),
        2,
        Duration::from_millis(100),
    );

    let items = vec![
        TranslationRequest::new("first", "es"),
        TranslationRequest::new("please hang", "es"),
        TranslationRequest::new("third", "es"),
    ];
    let result = dispatcher.dispatch(&items).await;

    assert_eq!(result.len(), 3);
    assert_eq!(result.get(0).unwrap().as_success().unwrap().translated_text, "FIRST");
    assert_eq!(result.get(2).unwrap().as_success().unwrap().translated_text, "THIRD");

    let failure = result.get(1).unwrap().as_failure().unwrap();
    assert_eq!(failure.index, 1);
    assert_eq!(failure.error_kind, EngineErrorKind::Timeout);

    let logs = log.recent(10, 0).await.unwrap();
    assert_eq!(logs.len(), 3);
    let batch_ids: HashSet<_> = logs.iter().map(|entry| entry.batch_id.clone()).collect();
    assert_eq!(batch_ids.len(), 1);
    let timed_out = logs.iter().find(|entry| entry.original_text == "please hang").unwrap();
    assert_eq!(timed_out.status, LogStatus::Failure);
    assert!(timed_out.latency_ms >= 100);
}

#[tokio::test]
async fn test_dispatch_withAllItemsFailing_shouldStillReturnEveryIndex() {
    let service = common::service_with_engine(
        &common::test_config(),
        Arc::new(MockEngine::failing(EngineErrorKind::RateLimited)),
    );

    let result = service.bulk_translate_texts(["a", "b", "c", "d"], "fr").await.unwrap();

    assert_eq!(result.failure_count(), 4);
    for (index, item) in result.items().iter().enumerate() {
        let failure = item.as_failure().unwrap();
        assert_eq!(failure.index, index);
        assert_eq!(failure.error_kind, EngineErrorKind::RateLimited);
    }
}

#[tokio::test]
async fn test_bulkResult_serialization_shouldBeOrderedTaggedArray() {
    let service = common::service_with_engine(
        &common::test_config(),
        Arc::new(MockEngine::failing_on("world")),
    );

    let result = service.bulk_translate_texts(["hello", "world"], "hi").await.unwrap();
    let json = serde_json::to_value(&result).unwrap();

    let items = json.as_array().unwrap();
    assert_eq!(items[0]["status"], "success");
    assert_eq!(items[0]["translated_text"], "नमस्ते");
    assert_eq!(items[1]["status"], "failure");
    assert_eq!(items[1]["error_kind"], "backend_unavailable");
}

#[tokio::test]
async fn test_concurrentBulkRequests_shouldLogDistinctBatches() {
    let service = common::mock_service();

    let handles: Vec<_> = (0..3)
        .map(|batch| {
            let service = service.clone();
            tokio::spawn(async move {
                let texts: Vec<String> = (0..5).map(|i| format!("batch {} item {}", batch, i)).collect();
                service.bulk_translate_texts(texts, "es").await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().success_count(), 5);
    }

    let logs = service.recent_logs(100, 0).await.unwrap();
    assert_eq!(logs.len(), 15);
    let ids: HashSet<i64> = logs.iter().map(|entry| entry.id).collect();
    assert_eq!(ids.len(), 15);
    let batches: HashSet<Option<String>> = logs.iter().map(|entry| entry.batch_id.clone()).collect();
    assert_eq!(batches.len(), 3);

    let window = service.stats(1).await.unwrap();
    assert_eq!(window.bulk.summary.requests, 3);
    assert_eq!(window.bulk.items_processed, 15);
    assert_eq!(window.bulk.summary.success_rate, 100.0);
}
