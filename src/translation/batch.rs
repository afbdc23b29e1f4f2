/*!
 * Bulk translation dispatch.
 *
 * Fans a bulk request out to the engine with at most `concurrency` calls
 * in flight, each under its own timeout. A failed item never aborts the
 * batch. Results are placed by index, so their order always matches the
 * request regardless of completion order.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::app_config::LimitsConfig;
use crate::database::NewLogEntry;
use crate::errors::EngineError;
use crate::providers::TranslationEngine;

use super::recorder::AuditRecorder;
use super::types::{BulkItem, BulkResult, TranslationFailure, TranslationRequest, TranslationResult};

/// Outcome of one engine call with its duration
#[derive(Debug, Clone)]
pub struct Attempt {
    pub outcome: Result<TranslationResult, EngineError>,
    pub latency_ms: u64,
}

impl Attempt {
    /// Audit record for this attempt
    pub fn to_log_entry(&self, request: &TranslationRequest) -> NewLogEntry {
        match &self.outcome {
            Ok(result) => NewLogEntry::success(
                request.text.clone(),
                result.translated_text.clone(),
                Some(result.source_lang.clone()),
                request.target_lang.clone(),
                self.latency_ms,
            ),
            Err(_) => NewLogEntry::failure(
                request.text.clone(),
                request.source_lang.clone(),
                request.target_lang.clone(),
                self.latency_ms,
            ),
        }
    }
}

/// Run one engine call under `timeout`
///
/// An expired timeout is reported as `EngineError::Timeout` like any other
/// engine failure.
pub async fn timed_call(
    engine: &dyn TranslationEngine,
    request: &TranslationRequest,
    timeout: Duration,
) -> Attempt {
    let start = Instant::now();
    let call = engine.translate(
        &request.text,
        &request.target_lang,
        request.source_lang.as_deref(),
    );

    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(EngineError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }),
    };

    Attempt {
        outcome,
        latency_ms: start.elapsed().as_millis() as u64,
    }
}

/// Dispatcher for bulk translation requests
#[derive(Debug, Clone)]
pub struct BulkDispatcher {
    /// The engine bound at startup
    engine: Arc<dyn TranslationEngine>,

    /// Audit sink, written once per item after the batch settles
    recorder: AuditRecorder,

    /// Maximum number of concurrent engine calls
    concurrency: usize,

    /// Timeout of each engine call
    call_timeout: Duration,
}

impl BulkDispatcher {
    /// Create a new dispatcher
    pub fn new(
        engine: Arc<dyn TranslationEngine>,
        recorder: AuditRecorder,
        concurrency: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            recorder,
            concurrency: concurrency.max(1),
            call_timeout,
        }
    }

    /// Create a dispatcher using the configured limits
    pub fn from_limits(
        engine: Arc<dyn TranslationEngine>,
        recorder: AuditRecorder,
        limits: &LimitsConfig,
    ) -> Self {
        Self::new(engine, recorder, limits.concurrency, limits.request_timeout())
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Translate every item, preserving order and tolerating per-item failures
    ///
    /// Items are assumed to be validated already.
    pub async fn dispatch(&self, items: &[TranslationRequest]) -> BulkResult {
        let batch_id = Uuid::new_v4().to_string();
        let total = items.len();
        debug!(
            "Dispatching batch {} with {} items (concurrency {})",
            batch_id, total, self.concurrency
        );

        let started = Instant::now();
        let mut attempts: Vec<Option<Attempt>> = vec![None; total];

        // Futures own their request; dispatch must stay spawnable
        let completed = stream::iter(items.iter().cloned().enumerate())
            .map(|(index, request)| {
                let engine = self.engine.clone();
                let timeout = self.call_timeout;

                async move { (index, timed_call(engine.as_ref(), &request, timeout).await) }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        for (index, attempt) in completed {
            attempts[index] = Some(attempt);
        }

        let mut results = Vec::with_capacity(total);
        for (index, (request, attempt)) in items.iter().zip(attempts).enumerate() {
            let attempt = attempt.unwrap_or_else(|| Attempt {
                outcome: Err(EngineError::BackendUnavailable(
                    "engine call did not complete".to_string(),
                )),
                latency_ms: 0,
            });

            self.recorder
                .record(attempt.to_log_entry(request).in_batch(&batch_id))
                .await;

            results.push(match attempt.outcome {
                Ok(result) => BulkItem::Success(result),
                Err(e) => {
                    warn!("Bulk item {} failed: {}", index, e);
                    BulkItem::Failure(TranslationFailure::from_error(index, &e))
                }
            });
        }

        let result = BulkResult::new(results);
        info!(
            "Batch {} completed in {:?}: {} succeeded, {} failed",
            batch_id,
            started.elapsed(),
            result.success_count(),
            result.failure_count()
        );
        result
    }
}
