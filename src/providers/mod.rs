/*!
 * Translation engines.
 *
 * Every backend implements `TranslationEngine`, so the dispatcher and the
 * service never know which one is active:
 * - `mock`: deterministic offline engine, the default
 * - `anthropic`: generative engine backed by the Anthropic Messages API
 * - `libretranslate`: dedicated translation provider API
 *
 * `build_engine` resolves the configured engine once at startup.
 */

use async_trait::async_trait;
use log::info;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{Config, EngineKind};
use crate::errors::{ConfigError, EngineError};
use crate::translation::types::{DetectedLanguage, TranslationResult};

pub mod anthropic;
pub mod libretranslate;
pub mod mock;

pub use anthropic::GenerativeEngine;
pub use libretranslate::ProviderApiEngine;
pub use mock::MockEngine;

/// Common contract of all translation backends
#[async_trait]
pub trait TranslationEngine: Send + Sync + Debug {
    /// Short engine name, as reported by `health()`
    fn name(&self) -> &str;

    /// Translate one text
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `target_lang` - ISO 639-1 target code
    /// * `source_lang` - ISO 639-1 source code, detected by the engine when `None`
    ///
    /// # Returns
    /// * `Result<TranslationResult, EngineError>` - The translation or a typed failure
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<TranslationResult, EngineError>;

    /// Detect the language of a text
    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, EngineError>;
}

/// Build the engine selected by the configuration
///
/// Fails with `ConfigError::MissingCredentials` when the selected remote
/// engine has no API key, so a misconfigured deployment refuses to start.
pub fn build_engine(config: &Config) -> Result<Arc<dyn TranslationEngine>, ConfigError> {
    let engine: Arc<dyn TranslationEngine> = match config.engine {
        EngineKind::Mock => Arc::new(MockEngine::new()),
        EngineKind::Generative => Arc::new(GenerativeEngine::from_config(
            &config.engines.generative,
            config.limits.request_timeout(),
        )?),
        EngineKind::Provider => Arc::new(ProviderApiEngine::from_config(
            &config.engines.provider,
            config.limits.request_timeout(),
        )?),
    };

    info!("Using {} translation engine", config.engine.display_name());
    Ok(engine)
}
