use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::errors::ConfigError;
use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Engine bound at startup
    #[serde(default)]
    pub engine: EngineKind,

    /// Per-engine settings
    #[serde(default)]
    pub engines: EnginesConfig,

    /// Request limits and dispatch tuning
    #[serde(default)]
    pub limits: LimitsConfig,

    /// ISO 639-1 codes accepted as source or target language
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,

    /// Audit log storage
    #[serde(default)]
    pub audit: AuditConfig,

    /// Statistics settings
    #[serde(default)]
    pub stats: StatsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation engine type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    // @engine: Deterministic offline engine
    #[default]
    Mock,
    // @engine: Large language model (Anthropic Messages API)
    Generative,
    // @engine: Dedicated translation provider (LibreTranslate-compatible API)
    Provider,
}

impl EngineKind {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Mock => "Mock",
            Self::Generative => "Generative",
            Self::Provider => "Provider API",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Mock => "mock".to_string(),
            Self::Generative => "generative".to_string(),
            Self::Provider => "provider".to_string(),
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

/// Settings for every engine; only the active one is read
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EnginesConfig {
    #[serde(default)]
    pub generative: GenerativeConfig,

    #[serde(default)]
    pub provider: ProviderApiConfig,
}

/// Generative engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerativeConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_generative_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_generative_model")]
    pub model: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_generative_endpoint(),
            model: default_generative_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Translation provider API configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderApiConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL
    #[serde(default = "default_provider_endpoint")]
    pub endpoint: String,
}

impl Default for ProviderApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_provider_endpoint(),
        }
    }
}

/// Request limits and concurrency settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Maximum characters per text
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Maximum items per bulk request
    #[serde(default = "default_max_bulk_items")]
    pub max_bulk_items: usize,

    /// Maximum engine calls in flight for one bulk request
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout of a single engine call in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_length: default_max_text_length(),
            max_bulk_items: default_max_bulk_items(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LimitsConfig {
    /// Per-call timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Audit log storage configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AuditConfig {
    /// Database file; the user data directory is used when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Statistics configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatsConfig {
    /// Number of target languages reported in the ranking
    #[serde(default = "default_top_languages")]
    pub top_languages: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_languages: default_top_languages(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_max_text_length() -> usize {
    1000
}

fn default_max_bulk_items() -> usize {
    10
}

fn default_concurrency() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_top_languages() -> usize {
    5
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_generative_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_generative_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_provider_endpoint() -> String {
    "https://libretranslate.com".to_string()
}

fn default_supported_languages() -> Vec<String> {
    language_utils::DEFAULT_SUPPORTED_LANGUAGES
        .iter()
        .map(|code| code.to_string())
        .collect()
}

impl Config {
    /// Load the configuration from a JSON file, writing a default one if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;

            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        for (field, value) in [
            ("limits.max_text_length", limits.max_text_length as u64),
            ("limits.max_bulk_items", limits.max_bulk_items as u64),
            ("limits.concurrency", limits.concurrency as u64),
            ("limits.request_timeout_secs", limits.request_timeout_secs),
            ("stats.top_languages", self.stats.top_languages as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if self.supported_languages.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "supported_languages".to_string(),
                reason: "at least one language is required".to_string(),
            });
        }

        for code in &self.supported_languages {
            if language_utils::validate_language_code(code).is_err() {
                return Err(ConfigError::UnsupportedLanguageCode(code.clone()));
            }
        }

        match self.engine {
            EngineKind::Mock => {}
            EngineKind::Generative => {
                check_endpoint("engines.generative.endpoint", &self.engines.generative.endpoint)?
            }
            EngineKind::Provider => {
                check_endpoint("engines.provider.endpoint", &self.engines.provider.endpoint)?
            }
        }

        Ok(())
    }

    /// Normalized supported language codes
    pub fn supported_language_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .supported_languages
            .iter()
            .map(|code| language_utils::normalize_code(code))
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

fn check_endpoint(field: &str, endpoint: &str) -> Result<(), ConfigError> {
    Url::parse(endpoint).map(|_| ()).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineKind::default(),
            engines: EnginesConfig::default(),
            limits: LimitsConfig::default(),
            supported_languages: default_supported_languages(),
            audit: AuditConfig::default(),
            stats: StatsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
