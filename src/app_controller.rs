use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::app_config::Config;
use crate::translation::{TranslationRequest, TranslationService};

// @module: Application controller executing CLI commands against the service

/// A command understood by the controller, independent of the CLI parser
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Translate one text
    Translate {
        text: String,
        target_lang: String,
        source_lang: Option<String>,
    },
    /// Translate several texts into one language
    Bulk {
        texts: Vec<String>,
        target_lang: String,
    },
    /// List supported languages
    Languages,
    /// Detect the language of a text
    Detect { text: String },
    /// Usage statistics over the last `days` days
    Stats { days: u32 },
    /// Most recent audit entries
    Logs { limit: usize, offset: usize },
    /// Service health
    Health,
}

/// Main application controller
#[derive(Debug, Clone)]
pub struct Controller {
    // @field: Service bound at startup
    service: TranslationService,
}

impl Controller {
    // @method: Create a controller, refusing to start on configuration errors
    pub fn with_config(config: &Config) -> Result<Self> {
        let service =
            TranslationService::from_config(config).context("Failed to start translation service")?;
        info!("Translation service ready with the {} engine", service.engine_name());
        Ok(Self::with_service(service))
    }

    /// Create a controller around an existing service
    pub fn with_service(service: TranslationService) -> Self {
        Self { service }
    }

    /// The underlying service
    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    /// Execute a command and return its JSON output
    pub async fn run(&self, command: Command) -> Result<Value> {
        debug!("Running command: {:?}", command);

        match command {
            Command::Translate {
                text,
                target_lang,
                source_lang,
            } => {
                let mut request = TranslationRequest::new(text, &target_lang);
                if let Some(source) = source_lang {
                    request = request.with_source(&source);
                }
                let result = self.service.translate(request).await?;
                to_json(&result)
            }
            Command::Bulk { texts, target_lang } => {
                let result = self.service.bulk_translate_texts(texts, &target_lang).await?;
                info!(
                    "Bulk translation finished: {} of {} items succeeded",
                    result.success_count(),
                    result.len()
                );
                to_json(&result)
            }
            Command::Languages => to_json(&self.service.supported_languages()),
            Command::Detect { text } => {
                let detected = self.service.detect_language(&text).await?;
                to_json(&detected)
            }
            Command::Stats { days } => {
                let window = self.service.stats(days).await?;
                to_json(&window)
            }
            Command::Logs { limit, offset } => {
                let entries = self.service.recent_logs(limit, offset).await?;
                to_json(&entries)
            }
            Command::Health => to_json(&self.service.health()),
        }
    }

    /// Execute a command and render its output as pretty JSON
    pub async fn run_to_string(&self, command: Command) -> Result<String> {
        let value = self.run(command).await?;
        serde_json::to_string_pretty(&value).context("Failed to render command output")
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize command output")
}
