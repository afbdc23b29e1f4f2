/*!
 * Translation provider engine for LibreTranslate-compatible APIs.
 *
 * Uses `POST /translate` and `POST /detect`. Quota exhaustion (HTTP 456)
 * is reported as `rate_limited`, and language pairs the provider rejects
 * are reported as `unsupported_language`.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::ProviderApiConfig;
use crate::errors::{ConfigError, EngineError, ProviderError};
use crate::providers::TranslationEngine;
use crate::translation::types::{DetectedLanguage, TranslationResult};

/// Source value asking the provider to detect the language
const AUTO_SOURCE: &str = "auto";

/// Client for a LibreTranslate-compatible server
#[derive(Debug)]
pub struct LibreTranslate {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    api_key: &'a str,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    api_key: &'a str,
}

/// Response of `/translate`
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,

    /// Present when the source was `auto`
    #[serde(rename = "detectedLanguage", default)]
    pub detected_language: Option<Detection>,
}

/// One candidate of `/detect`; confidence is a percentage
#[derive(Debug, Deserialize)]
pub struct Detection {
    pub language: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl LibreTranslate {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Translate `text`; `source` may be `auto`
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TranslateResponse, ProviderError> {
        let body = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: &self.api_key,
        };

        let response = self.client.post(self.url("translate")).json(&body).send().await?;
        Self::read_json(response).await
    }

    /// Detection candidates, best first
    pub async fn detect(&self, text: &str) -> Result<Vec<Detection>, ProviderError> {
        let body = DetectRequest {
            q: text,
            api_key: &self.api_key,
        };

        let response = self.client.post(self.url("detect")).json(&body).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let raw = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            let message = serde_json::from_str::<ErrorBody>(&raw)
                .map(|body| body.error)
                .unwrap_or(raw);
            error!("Translation provider error ({}): {}", status, message);
            return Err(Self::status_error(status, message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn status_error(status: StatusCode, message: String) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthenticationError(message),
            429 => ProviderError::RateLimitExceeded(message),
            456 => ProviderError::QuotaExceeded(message),
            status_code => ProviderError::ApiError { status_code, message },
        }
    }
}

/// Translation engine backed by a dedicated provider API
#[derive(Debug)]
pub struct ProviderApiEngine {
    client: LibreTranslate,
}

impl ProviderApiEngine {
    /// Build the engine from its configuration section
    pub fn from_config(config: &ProviderApiConfig, timeout: Duration) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials {
                engine: "provider".to_string(),
            });
        }

        Ok(Self {
            client: LibreTranslate::new(config.api_key.clone(), config.endpoint.clone(), timeout),
        })
    }
}

fn to_engine_error(error: ProviderError) -> EngineError {
    debug!("Provider engine call failed: {}", error);
    match error {
        ProviderError::ApiError { status_code: 400, message }
            if message.to_lowercase().contains("not supported") =>
        {
            EngineError::UnsupportedLanguage(message)
        }
        other => EngineError::from(other),
    }
}

#[async_trait]
impl TranslationEngine for ProviderApiEngine {
    fn name(&self) -> &str {
        "provider"
    }

    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<TranslationResult, EngineError> {
        let response = self
            .client
            .translate(text, source_lang.unwrap_or(AUTO_SOURCE), target_lang)
            .await
            .map_err(to_engine_error)?;

        let source = match (source_lang, response.detected_language) {
            (Some(source), _) => source.to_string(),
            (None, Some(detected)) => detected.language,
            (None, None) => AUTO_SOURCE.to_string(),
        };

        Ok(TranslationResult::new(
            text,
            response.translated_text,
            source,
            target_lang,
        ))
    }

    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, EngineError> {
        let candidates = self.client.detect(text).await.map_err(to_engine_error)?;

        Ok(candidates
            .into_iter()
            .next()
            .map(|best| DetectedLanguage {
                language: best.language,
                confidence: (best.confidence / 100.0).clamp(0.0, 1.0),
            })
            .unwrap_or_else(DetectedLanguage::unknown))
    }
}
