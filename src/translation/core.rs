/*!
 * Core translation service implementation.
 *
 * `TranslationService` is the boundary of the crate: it owns the engine
 * bound at startup, the validator, the bulk dispatcher, the audit recorder
 * and the statistics aggregator, and exposes every operation the CLI (or
 * any other transport) needs. It holds no per-request mutable state and can
 * be shared behind an `Arc`.
 */

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::database::{AuditLog, LogEntry};
use crate::errors::{AppError, EngineError, PersistenceError, StatsError, TranslateError, ValidationError};
use crate::language_utils;
use crate::providers::{build_engine, TranslationEngine};
use crate::stats::{StatsAggregator, StatsWindow};
use crate::validation::RequestValidator;

use super::batch::{timed_call, BulkDispatcher};
use super::recorder::AuditRecorder;
use super::types::{BulkRequest, BulkResult, DetectedLanguage, TranslationRequest, TranslationResult};

/// A supported language with its English name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguage {
    pub code: String,
    pub name: String,
}

/// Overall service condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    /// Serving, but some audit writes were lost
    Degraded,
}

/// Result of `health()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    /// `HH:MM:SS`; hours keep counting past 24
    pub uptime: String,
    pub uptime_secs: u64,
    pub engine: String,
    pub supported_languages: Vec<String>,
    pub audit_failures: u64,
}

/// Format a duration as `HH:MM:SS`
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Translation service facade
#[derive(Debug, Clone)]
pub struct TranslationService {
    engine: Arc<dyn TranslationEngine>,
    validator: RequestValidator,
    dispatcher: BulkDispatcher,
    recorder: AuditRecorder,
    aggregator: StatsAggregator,
    call_timeout: Duration,
    started_at: Instant,
}

impl TranslationService {
    /// Create a service around an already bound engine and audit log
    pub fn new(config: &Config, engine: Arc<dyn TranslationEngine>, audit: AuditLog) -> Self {
        let recorder = AuditRecorder::new(audit.clone());

        Self {
            dispatcher: BulkDispatcher::from_limits(engine.clone(), recorder.clone(), &config.limits),
            validator: RequestValidator::from_config(config),
            aggregator: StatsAggregator::new(audit, config.stats.top_languages),
            call_timeout: config.limits.request_timeout(),
            started_at: Instant::now(),
            recorder,
            engine,
        }
    }

    /// Validate the configuration, bind the engine and open the audit log
    ///
    /// Any configuration problem, including missing engine credentials,
    /// is returned here so the process refuses to start.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        config.validate()?;
        let engine = build_engine(config)?;
        let audit = AuditLog::open(config.audit.database_path.as_deref())?;

        info!(
            "Translation service ready (engine: {}, audit log: {:?})",
            engine.name(),
            audit.path()
        );
        Ok(Self::new(config, engine, audit))
    }

    /// Translate a single text
    ///
    /// Validation failures are returned without calling the engine and are
    /// not logged. Engine failures are logged and then returned.
    pub async fn translate(&self, request: TranslationRequest) -> Result<TranslationResult, TranslateError> {
        self.validator.validate(&request)?;

        let attempt = timed_call(self.engine.as_ref(), &request, self.call_timeout).await;
        self.recorder.record(attempt.to_log_entry(&request)).await;

        match attempt.outcome {
            Ok(result) => {
                debug!("Translated to {} in {} ms", result.target_lang, attempt.latency_ms);
                Ok(result)
            }
            Err(e) => Err(TranslateError::Engine(e)),
        }
    }

    /// Translate a bulk request
    ///
    /// Only structural problems fail the call; engine failures become
    /// `TranslationFailure` items at their index.
    pub async fn bulk_translate(&self, bulk: BulkRequest) -> Result<BulkResult, ValidationError> {
        self.validator.validate_bulk(&bulk)?;
        Ok(self.dispatcher.dispatch(&bulk.items).await)
    }

    /// Translate an ordered list of texts into one target language
    pub async fn bulk_translate_texts<I, S>(
        &self,
        texts: I,
        target_lang: &str,
    ) -> Result<BulkResult, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bulk_translate(BulkRequest::from_texts(texts, target_lang)).await
    }

    /// Supported languages, ordered by code
    pub fn supported_languages(&self) -> Vec<SupportedLanguage> {
        self.validator
            .supported_languages()
            .map(|code| SupportedLanguage {
                code: code.to_string(),
                name: language_utils::display_name(code),
            })
            .collect()
    }

    /// Detect the language of `text`; detections are not logged
    pub async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, TranslateError> {
        self.validator.validate_text(text, None)?;

        match tokio::time::timeout(self.call_timeout, self.engine.detect_language(text)).await {
            Ok(detected) => Ok(detected?),
            Err(_) => Err(TranslateError::Engine(EngineError::Timeout {
                after_ms: self.call_timeout.as_millis() as u64,
            })),
        }
    }

    /// Usage statistics over the last `days` days
    pub async fn stats(&self, days: u32) -> Result<StatsWindow, StatsError> {
        self.aggregator.stats(days).await
    }

    /// Most recent audit entries, newest first
    pub async fn recent_logs(&self, limit: usize, offset: usize) -> Result<Vec<LogEntry>, PersistenceError> {
        self.recorder.log().recent(limit, offset).await
    }

    /// Service health
    pub fn health(&self) -> HealthReport {
        let elapsed = self.started_at.elapsed();
        let audit_failures = self.recorder.failure_count();

        HealthReport {
            status: if audit_failures == 0 {
                HealthStatus::Ok
            } else {
                HealthStatus::Degraded
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime: format_uptime(elapsed),
            uptime_secs: elapsed.as_secs(),
            engine: self.engine.name().to_string(),
            supported_languages: self
                .validator
                .supported_languages()
                .map(str::to_string)
                .collect(),
            audit_failures,
        }
    }

    /// Name of the bound engine
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }
}
