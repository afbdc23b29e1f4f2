/*!
 * Deterministic mock engine.
 *
 * Needs no network and always yields the same output for the same input.
 * It is the default engine and the workhorse of the test suite:
 * - `MockEngine::new()` - Translates with a small word table
 * - `MockEngine::failing(kind)` - Always fails with the given error kind
 * - `MockEngine::slow(delay_ms)` - Sleeps before translating
 * - `MockEngine::failing_on(text)` - Fails only for one input text
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::{EngineError, EngineErrorKind};
use crate::providers::TranslationEngine;
use crate::translation::types::{DetectedLanguage, TranslationResult};

/// Word table per target language
const WORD_TABLE: &[(&str, &[(&str, &str)])] = &[
    ("hi", &[("hello", "नमस्ते"), ("world", "दुनिया")]),
    ("ta", &[("hello", "வணக்கம்"), ("world", "உலகம்")]),
    ("bn", &[("hello", "হ্যালো"), ("world", "বিশ্ব")]),
    ("es", &[("hello", "hola"), ("world", "mundo")]),
    ("fr", &[("hello", "bonjour"), ("world", "monde")]),
];

/// Unicode blocks recognized by the detector
const SCRIPTS: &[(u32, u32, &str)] = &[
    (0x0370, 0x03FF, "el"),
    (0x0400, 0x04FF, "ru"),
    (0x0590, 0x05FF, "he"),
    (0x0600, 0x06FF, "ar"),
    (0x0900, 0x097F, "hi"),
    (0x0980, 0x09FF, "bn"),
    (0x0B80, 0x0BFF, "ta"),
    (0x0C00, 0x0C7F, "te"),
    (0x0C80, 0x0CFF, "kn"),
    (0x0E00, 0x0E7F, "th"),
    (0x3040, 0x30FF, "ja"),
    (0x4E00, 0x9FFF, "zh"),
    (0xAC00, 0xD7AF, "ko"),
];

/// Behavior mode for the mock engine
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with the given kind
    Failing { kind: EngineErrorKind },
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
    /// Fails with `backend_unavailable` for exactly this text
    FailingOn { text: String },
}

/// Mock engine for offline use and testing
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// Behavior mode
    behavior: MockBehavior,
    /// Calls to `translate`, shared between clones
    request_count: Arc<AtomicUsize>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a working mock engine
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Working)
    }

    /// Create a mock engine with the specified behavior
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock engine that always fails
    pub fn failing(kind: EngineErrorKind) -> Self {
        Self::with_behavior(MockBehavior::Failing { kind })
    }

    /// Create a mock engine that waits before every translation
    pub fn slow(delay_ms: u64) -> Self {
        Self::with_behavior(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock engine that fails only for `text`
    pub fn failing_on(text: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::FailingOn { text: text.into() })
    }

    /// Number of `translate` calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Deterministic translation of `text`
    ///
    /// Known words are replaced from the table. When no word is known the
    /// text is tagged with the target code, so output never equals input.
    pub fn translate_text(text: &str, target_lang: &str) -> String {
        let table = WORD_TABLE
            .iter()
            .find(|(lang, _)| *lang == target_lang)
            .map(|(_, words)| *words)
            .unwrap_or(&[]);

        let mut matched = false;
        let words: Vec<String> = text
            .split_whitespace()
            .map(|word| {
                let lowered = word.to_lowercase();
                match table.iter().find(|(from, _)| *from == lowered) {
                    Some((_, to)) => {
                        matched = true;
                        to.to_string()
                    }
                    None => word.to_string(),
                }
            })
            .collect();

        if matched {
            words.join(" ")
        } else {
            format!("[{}] {}", target_lang, text)
        }
    }

    /// Detect the dominant script of `text`
    ///
    /// Confidence is the share of letters that belong to the dominant script.
    pub fn detect_script(text: &str) -> DetectedLanguage {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut letters = 0usize;

        for c in text.chars() {
            let language = classify(c);
            if language.is_none() && !c.is_alphabetic() {
                continue;
            }
            letters += 1;

            if let Some(language) = language {
                match counts.iter_mut().find(|(lang, _)| *lang == language) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((language, 1)),
                }
            }
        }

        // Earlier entries win ties so detection stays deterministic
        let dominant = counts
            .iter()
            .fold(None::<(&str, usize)>, |best, &(lang, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((lang, count)),
            });

        match dominant {
            Some((language, count)) if letters > 0 => DetectedLanguage {
                language: language.to_string(),
                confidence: ((count as f64 / letters as f64) * 100.0).round() / 100.0,
            },
            _ => DetectedLanguage::unknown(),
        }
    }
}

fn classify(c: char) -> Option<&'static str> {
    let code = c as u32;
    if c.is_ascii_alphabetic() || ((0x00C0..=0x024F).contains(&code) && c.is_alphabetic()) {
        return Some("en");
    }
    SCRIPTS
        .iter()
        .find(|(start, end, _)| (*start..=*end).contains(&code))
        .map(|(_, _, language)| *language)
}

#[async_trait]
impl TranslationEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<TranslationResult, EngineError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Working => {}
            MockBehavior::Failing { kind } => {
                return Err(EngineError::from_kind(*kind, "simulated engine failure"));
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
            }
            MockBehavior::FailingOn { text: failing } => {
                if failing == text {
                    return Err(EngineError::BackendUnavailable(format!(
                        "simulated failure for '{}'",
                        text
                    )));
                }
            }
        }

        let source = match source_lang {
            Some(source) => source.to_string(),
            None => Self::detect_script(text).language,
        };

        Ok(TranslationResult::new(
            text,
            Self::translate_text(text, target_lang),
            source,
            target_lang,
        ))
    }

    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, EngineError> {
        Ok(Self::detect_script(text))
    }
}
