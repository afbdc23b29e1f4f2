/*!
 * Instrumented engine implementations for testing
 *
 * These engines implement `TranslationEngine` and record how the
 * dispatcher drives them, so ordering and concurrency guarantees can be
 * checked without any external API call.
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use udaan::errors::EngineError;
use udaan::providers::TranslationEngine;
use udaan::translation::{DetectedLanguage, TranslationResult};

/// Tracks how many calls are in flight at the same time
#[derive(Debug, Default)]
pub struct InFlightTracker {
    current: AtomicUsize,
    max: AtomicUsize,
    total: AtomicUsize,
}

impl InFlightTracker {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    /// Highest number of simultaneous calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }

    /// Number of calls received
    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// Engine that sleeps on every call and records concurrency
#[derive(Debug)]
pub struct ConcurrencyTrackingEngine {
    delay: Duration,
    tracker: Arc<InFlightTracker>,
}

impl ConcurrencyTrackingEngine {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            tracker: Arc::new(InFlightTracker::default()),
        }
    }

    pub fn tracker(&self) -> Arc<InFlightTracker> {
        self.tracker.clone()
    }
}

#[async_trait]
impl TranslationEngine for ConcurrencyTrackingEngine {
    fn name(&self) -> &str {
        "tracking"
    }

    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<TranslationResult, EngineError> {
        self.tracker.enter();
        tokio::time::sleep(self.delay).await;
        self.tracker.leave();

        Ok(TranslationResult::new(
            text,
            format!("{}:{}", target_lang, text),
            source_lang.unwrap_or("en"),
            target_lang,
        ))
    }

    async fn detect_language(&self, _text: &str) -> Result<DetectedLanguage, EngineError> {
        Ok(DetectedLanguage::unknown())
    }
}

/// Engine whose texts are numbers; lower numbers take longer
///
/// With texts `"0".."n"`, the first items finish last, which exposes any
/// dispatcher that returns results in completion order.
#[derive(Debug)]
pub struct ReverseDelayEngine {
    items: u64,
    step_ms: u64,
}

impl ReverseDelayEngine {
    pub fn new(items: u64, step_ms: u64) -> Self {
        Self { items, step_ms }
    }
}

#[async_trait]
impl TranslationEngine for ReverseDelayEngine {
    fn name(&self) -> &str {
        "reverse-delay"
    }

    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        _source_lang: Option<&str>,
    ) -> Result<TranslationResult, EngineError> {
        let position: u64 = text
            .parse()
            .map_err(|_| EngineError::BackendUnavailable(format!("not a number: {}", text)))?;
        let delay = self.items.saturating_sub(position) * self.step_ms;
        tokio::time::sleep(Duration::from_millis(delay)).await;

        Ok(TranslationResult::new(
            text,
            format!("translated-{}", text),
            "en",
            target_lang,
        ))
    }

    async fn detect_language(&self, _text: &str) -> Result<DetectedLanguage, EngineError> {
        Ok(DetectedLanguage::unknown())
    }
}

/// Engine that hangs on texts containing "hang" and answers the rest at once
#[derive(Debug, Default)]
pub struct SelectiveHangEngine;

#[async_trait]
impl TranslationEngine for SelectiveHangEngine {
    fn name(&self) -> &str {
        "selective-hang"
    }

    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        _source_lang: Option<&str>,
    ) -> Result<TranslationResult, EngineError> {
        if text.contains("hang") {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(TranslationResult::new(text, text.to_uppercase(), "en", target_lang))
    }

    async fn detect_language(&self, _text: &str) -> Result<DetectedLanguage, EngineError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(DetectedLanguage::unknown())
    }
}
