/*!
 * Integration tests for the file-backed audit log
 */

use std::sync::Arc;

use rusqlite::Connection;

use udaan::database::LogStatus;
use udaan::providers::MockEngine;
use udaan::translation::{HealthStatus, TranslationRequest};

use crate::common;

#[tokio::test]
async fn test_auditLog_shouldSurviveServiceRestart() {
    let dir = common::create_temp_dir().unwrap();
    let db_path = dir.path().join("nested").join("audit.db");
    let config = common::test_config();

    let last_id = {
        let service = common::file_backed_service(&config, Arc::new(MockEngine::new()), &db_path);
        service.translate(TranslationRequest::new("hello", "hi")).await.unwrap();
        service.bulk_translate_texts(["hello", "world"], "ta").await.unwrap();
        service.recent_logs(1, 0).await.unwrap()[0].id
    };

    let restarted = common::file_backed_service(&config, Arc::new(MockEngine::new()), &db_path);
    let logs = restarted.recent_logs(10, 0).await.unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].id, last_id);
    assert_eq!(logs[2].original_text, "hello");
    assert_eq!(logs[2].target_lang, "hi");

    restarted.translate(TranslationRequest::new("world", "ta")).await.unwrap();
    let newest = restarted.recent_logs(1, 0).await.unwrap();
    assert!(newest[0].id > last_id);

    let window = restarted.stats(1).await.unwrap();
    assert_eq!(window.total_translations, 4);
    assert_eq!(window.single.requests, 2);
    assert_eq!(window.bulk.summary.requests, 1);
}

#[tokio::test]
async fn test_concurrentSingleTranslations_shouldAppendUniqueIds() {
    let dir = common::create_temp_dir().unwrap();
    let db_path = dir.path().join("audit.db");
    let service = common::file_backed_service(&common::test_config(), Arc::new(MockEngine::new()), &db_path);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .translate(TranslationRequest::new(format!("text {}", i), "es"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let logs = service.recent_logs(100, 0).await.unwrap();
    assert_eq!(logs.len(), 16);
    let mut ids: Vec<i64> = logs.iter().map(|entry| entry.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 16);
    assert!(logs.iter().all(|entry| entry.status == LogStatus::Success));
}

#[tokio::test]
async fn test_auditWriteFailure_shouldNotFailTranslationButDegradeHealth() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let db_path = dir.path().join("audit.db");
    let service = common::file_backed_service(&common::test_config(), Arc::new(MockEngine::new()), &db_path);

    service.translate(TranslationRequest::new("hello", "es")).await.unwrap();
    assert_eq!(service.health().status, HealthStatus::Ok);

    // Break the store underneath the running service
    let raw = Connection::open(&db_path).unwrap();
    raw.execute_batch("DROP TABLE audit_log;").unwrap();
    drop(raw);

    let result = service.translate(TranslationRequest::new("world", "es")).await.unwrap();
    assert_eq!(result.translated_text, "mundo");

    let report = service.health();
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.audit_failures, 1);

    let bulk = service.bulk_translate_texts(["hello", "world"], "fr").await.unwrap();
    assert_eq!(bulk.success_count(), 2);
    assert_eq!(service.health().audit_failures, 3);
}
