use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Language utilities for ISO 639-1 language code handling
///
/// This module provides functions for validating and normalizing
/// ISO 639-1 (2-letter) codes and looking up their English names.
static PART1_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2}$").expect("Invalid ISO 639-1 shape regex")
});

/// Codes the service accepts out of the box
pub const DEFAULT_SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh",
    "ar", "hi", "ta", "te", "bn", "ur", "th", "vi", "nl", "sv",
    "no", "da", "fi", "pl", "tr", "he", "id", "ms", "fa", "uk",
    "cs", "sk", "hu", "ro", "bg", "hr", "sr", "sl", "et", "lv",
    "lt", "el", "is", "mt", "ga", "cy", "eu", "ca", "gl", "af",
    "sw", "zu", "xh", "st", "tn", "ss", "ve", "ts", "nr", "nd",
];

/// Trim and lowercase a language code
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Check that a code has the ISO 639-1 shape (two lowercase ASCII letters)
pub fn has_part1_shape(code: &str) -> bool {
    PART1_SHAPE.is_match(code)
}

/// Validate if a language code is a known ISO 639-1 code
pub fn validate_language_code(code: &str) -> Result<()> {
    let normalized_code = normalize_code(code);

    if has_part1_shape(&normalized_code) && Language::from_639_1(&normalized_code).is_some() {
        return Ok(());
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Get the English name of a language from its ISO 639-1 code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized_code = normalize_code(code);

    Language::from_639_1(&normalized_code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Get the English name of a language, falling back to the uppercased code
pub fn display_name(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| code.to_uppercase())
}
