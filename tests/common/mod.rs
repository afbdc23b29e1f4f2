/*!
 * Common test utilities for the udaan test suite
 */

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use udaan::app_config::Config;
use udaan::database::AuditLog;
use udaan::providers::{MockEngine, TranslationEngine};
use udaan::translation::TranslationService;

// Re-export the instrumented engines
pub mod mock_providers;

/// Route library logs to the test output; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Configuration with small limits that keep tests fast
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.limits.max_text_length = 100;
    config.limits.max_bulk_items = 20;
    config.limits.concurrency = 3;
    config.limits.request_timeout_secs = 2;
    config
}

/// Service with the given engine and an in-memory audit log
pub fn service_with_engine(config: &Config, engine: Arc<dyn TranslationEngine>) -> TranslationService {
    let audit = AuditLog::new_in_memory().expect("Failed to create in-memory audit log");
    TranslationService::new(config, engine, audit)
}

/// Service backed by a working mock engine
pub fn mock_service() -> TranslationService {
    service_with_engine(&test_config(), Arc::new(MockEngine::new()))
}

/// Service whose audit log lives in a file
pub fn file_backed_service(config: &Config, engine: Arc<dyn TranslationEngine>, db_path: &Path) -> TranslationService {
    let audit = AuditLog::open(Some(db_path)).expect("Failed to open audit log");
    TranslationService::new(config, engine, audit)
}
