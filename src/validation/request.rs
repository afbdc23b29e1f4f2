/*!
 * Request validator.
 *
 * Checks text length and language codes before any engine is invoked.
 * Validation is pure: it never touches the engine or the audit log.
 */

use log::debug;
use std::collections::BTreeSet;

use crate::app_config::Config;
use crate::errors::ValidationError;
use crate::language_utils::normalize_code;
use crate::translation::types::{BulkRequest, TranslationRequest};

/// Validator for single and bulk translation requests
#[derive(Debug, Clone)]
pub struct RequestValidator {
    /// Maximum characters per text
    max_text_length: usize,
    /// Maximum items per bulk request
    max_bulk_items: usize,
    /// Accepted language codes, normalized
    supported: BTreeSet<String>,
}

impl RequestValidator {
    /// Create a validator with explicit limits
    pub fn new<I, S>(max_text_length: usize, max_bulk_items: usize, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            max_text_length,
            max_bulk_items,
            supported: supported
                .into_iter()
                .map(|code| normalize_code(code.as_ref()))
                .collect(),
        }
    }

    /// Create a validator from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.limits.max_text_length,
            config.limits.max_bulk_items,
            config.supported_language_codes(),
        )
    }

    /// Whether `code` is in the supported set (exact match)
    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.contains(code)
    }

    /// Supported codes in ascending order
    pub fn supported_languages(&self) -> impl Iterator<Item = &str> {
        self.supported.iter().map(String::as_str)
    }

    pub fn max_text_length(&self) -> usize {
        self.max_text_length
    }

    /// Check a text on its own
    pub fn validate_text(&self, text: &str, index: Option<usize>) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText { index });
        }

        let length = text.chars().count();
        if length > self.max_text_length {
            return Err(ValidationError::TooLong {
                index,
                length,
                max: self.max_text_length,
            });
        }

        Ok(())
    }

    fn validate_language(&self, code: &str, index: Option<usize>) -> Result<(), ValidationError> {
        if self.is_supported(code) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedLanguage {
                index,
                code: code.to_string(),
            })
        }
    }

    fn validate_item(
        &self,
        request: &TranslationRequest,
        index: Option<usize>,
    ) -> Result<(), ValidationError> {
        self.validate_text(&request.text, index)?;
        self.validate_language(&request.target_lang, index)?;
        if let Some(source) = &request.source_lang {
            self.validate_language(source, index)?;
        }
        Ok(())
    }

    /// Validate a single request
    pub fn validate(&self, request: &TranslationRequest) -> Result<(), ValidationError> {
        self.validate_item(request, None).inspect_err(|e| {
            debug!("Rejected translation request: {}", e);
        })
    }

    /// Validate a bulk request; any invalid item rejects the whole request
    pub fn validate_bulk(&self, bulk: &BulkRequest) -> Result<(), ValidationError> {
        if bulk.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }

        if bulk.len() > self.max_bulk_items {
            return Err(ValidationError::BatchTooLarge {
                count: bulk.len(),
                max: self.max_bulk_items,
            });
        }

        for (index, item) in bulk.items.iter().enumerate() {
            self.validate_item(item, Some(index)).inspect_err(|e| {
                debug!("Rejected bulk request: {}", e);
            })?;
        }

        Ok(())
    }
}
