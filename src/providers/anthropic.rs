/*!
 * Generative translation engine backed by the Anthropic Messages API.
 *
 * `Anthropic` is the raw HTTP client; `GenerativeEngine` turns translation
 * and detection calls into prompts and maps HTTP failures onto engine
 * error kinds.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::GenerativeConfig;
use crate::errors::{ConfigError, EngineError, ProviderError};
use crate::language_utils;
use crate::providers::TranslationEngine;
use crate::translation::types::{DetectedLanguage, TranslationResult};

/// Source language reported when the model was not told one
const AUTO_SOURCE: &str = "auto";

/// Confidence assigned to a well-formed model detection
const MODEL_DETECTION_CONFIDENCE: f64 = 0.9;

/// Anthropic client for interacting with Anthropic API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System prompt to guide the AI
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    pub content: Vec<AnthropicContent>,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The actual text content
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    /// Create a new Anthropic request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            temperature: None,
            max_tokens,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Anthropic {
    /// Create a new Anthropic client
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

    /// Complete a messages request
    pub async fn complete(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let api_url = format!("{}/v1/messages", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, error_text);
            return Err(Self::status_error(status, error_text));
        }

        response
            .json::<AnthropicResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn status_error(status: StatusCode, message: String) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthenticationError(message),
            429 => ProviderError::RateLimitExceeded(message),
            status_code => ProviderError::ApiError { status_code, message },
        }
    }

    /// Extract text from Anthropic response
    pub fn extract_text_from_response(response: &AnthropicResponse) -> String {
        response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect()
    }
}

/// Translation engine that prompts a large language model
#[derive(Debug)]
pub struct GenerativeEngine {
    client: Anthropic,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GenerativeEngine {
    /// Build the engine from its configuration section
    pub fn from_config(config: &GenerativeConfig, timeout: Duration) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials {
                engine: "generative".to_string(),
            });
        }

        Ok(Self {
            client: Anthropic::new(config.api_key.clone(), config.endpoint.clone(), timeout),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn translation_prompt(text: &str, target_lang: &str, source_lang: Option<&str>) -> String {
        let target_name = language_utils::display_name(target_lang);
        let source_line = match source_lang {
            Some(source) => format!(
                "The text is written in {} (ISO code: {}).\n",
                language_utils::display_name(source),
                source
            ),
            None => String::new(),
        };

        format!(
            "Translate the following text to {name} (ISO code: {code}).\n\
             {source_line}\
             Provide only the translated text without any explanations, quotes, or additional text.\n\n\
             Text to translate: \"{text}\"",
            name = target_name,
            code = target_lang,
            source_line = source_line,
            text = text
        )
    }

    fn detection_prompt(text: &str) -> String {
        format!(
            "Detect the language of the following text and respond with only the ISO 639-1 language code (2 letters).\n\
             If you cannot detect the language, respond with 'unknown'.\n\n\
             Text: \"{}\"",
            text
        )
    }

    async fn ask(&self, prompt: String) -> Result<String, EngineError> {
        let request = AnthropicRequest::new(&self.model, self.max_tokens)
            .system("You are a professional translator.")
            .temperature(self.temperature)
            .add_message("user", prompt);

        let response = self.client.complete(&request).await.map_err(map_provider_error)?;
        Ok(Anthropic::extract_text_from_response(&response))
    }
}

/// 5xx (including 529 overloaded) stays `backend_unavailable`; only transport timeouts become `timeout`
fn map_provider_error(error: ProviderError) -> EngineError {
    debug!("Generative engine call failed: {}", error);
    EngineError::from(error)
}

/// Trim the reply and drop one pair of surrounding double quotes
pub fn clean_reply(reply: &str) -> String {
    let trimmed = reply.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Interpret the model's answer to the detection prompt
pub fn parse_detection(reply: &str) -> DetectedLanguage {
    let code = clean_reply(reply).to_lowercase();
    if language_utils::has_part1_shape(&code) {
        DetectedLanguage {
            language: code,
            confidence: MODEL_DETECTION_CONFIDENCE,
        }
    } else {
        DetectedLanguage::unknown()
    }
}

#[async_trait]
impl TranslationEngine for GenerativeEngine {
    fn name(&self) -> &str {
        "generative"
    }

    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<TranslationResult, EngineError> {
        let reply = self
            .ask(Self::translation_prompt(text, target_lang, source_lang))
            .await?;

        let translated = clean_reply(&reply);
        if translated.is_empty() {
            return Err(EngineError::BackendUnavailable(
                "model returned an empty translation".to_string(),
            ));
        }

        Ok(TranslationResult::new(
            text,
            translated,
            source_lang.unwrap_or(AUTO_SOURCE),
            target_lang,
        ))
    }

    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, EngineError> {
        let reply = self.ask(Self::detection_prompt(text)).await?;
        Ok(parse_detection(&reply))
    }
}
