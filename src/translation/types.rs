/*!
 * Request and result types shared by the engines, the dispatcher and the
 * service facade.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, EngineErrorKind};
use crate::language_utils::normalize_code;

/// A single text to translate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// ISO 639-1 target language
    pub target_lang: String,
    /// ISO 639-1 source language; detected by the engine when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_lang: Option<String>,
}

impl TranslationRequest {
    /// Create a request; language codes are trimmed and lowercased
    pub fn new(text: impl Into<String>, target_lang: &str) -> Self {
        Self {
            text: text.into(),
            target_lang: normalize_code(target_lang),
            source_lang: None,
        }
    }

    /// Set the source language
    pub fn with_source(mut self, source_lang: &str) -> Self {
        self.source_lang = Some(normalize_code(source_lang));
        self
    }
}

/// Outcome of a successful engine call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Globally unique identifier
    pub id: String,
    pub original_text: String,
    pub translated_text: String,
    /// Given, detected, or `auto` when the engine does not report it
    pub source_lang: String,
    pub target_lang: String,
    pub created_at: DateTime<Utc>,
}

impl TranslationResult {
    /// Create a result with a fresh id, stamped now
    pub fn new(
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            created_at: Utc::now(),
        }
    }
}

/// A bulk item the engine could not translate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationFailure {
    /// Position in the bulk request
    pub index: usize,
    pub error_kind: EngineErrorKind,
    pub message: String,
}

impl TranslationFailure {
    pub fn from_error(index: usize, error: &EngineError) -> Self {
        Self {
            index,
            error_kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Ordered items of one bulk call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub items: Vec<TranslationRequest>,
}

impl BulkRequest {
    pub fn new(items: Vec<TranslationRequest>) -> Self {
        Self { items }
    }

    /// Every text translated into the same target language
    pub fn from_texts<I, S>(texts: I, target_lang: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: texts
                .into_iter()
                .map(|text| TranslationRequest::new(text, target_lang))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One slot of a bulk result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkItem {
    Success(TranslationResult),
    Failure(TranslationFailure),
}

impl BulkItem {
    pub fn is_success(&self) -> bool {
        matches!(self, BulkItem::Success(_))
    }

    pub fn as_success(&self) -> Option<&TranslationResult> {
        match self {
            BulkItem::Success(result) => Some(result),
            BulkItem::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&TranslationFailure> {
        match self {
            BulkItem::Success(_) => None,
            BulkItem::Failure(failure) => Some(failure),
        }
    }
}

/// Results of a bulk call, index-aligned with the request
///
/// Serializes as a bare JSON array of tagged items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BulkResult {
    items: Vec<BulkItem>,
}

impl BulkResult {
    pub fn new(items: Vec<BulkItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[BulkItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&BulkItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }
}

/// Language reported by an engine's detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    /// ISO 639-1 code, or `unknown`
    pub language: String,
    /// Between 0.0 and 1.0
    pub confidence: f64,
}

impl DetectedLanguage {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn unknown() -> Self {
        Self {
            language: Self::UNKNOWN.to_string(),
            confidence: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.language == Self::UNKNOWN
    }
}
