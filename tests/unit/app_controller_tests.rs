/*!
 * Tests for the application controller
 */

use std::sync::Arc;

use udaan::app_config::{Config, EngineKind};
use udaan::app_controller::{Command, Controller};
use udaan::errors::EngineErrorKind;
use udaan::providers::MockEngine;

use crate::common;

fn controller_with(engine: MockEngine) -> Controller {
    Controller::with_service(common::service_with_engine(&common::test_config(), Arc::new(engine)))
}

#[tokio::test]
async fn test_run_languages_shouldListCodesAndNames() {
    let controller = controller_with(MockEngine::new());

    let output = controller.run(Command::Languages).await.unwrap();
    let languages = output.as_array().unwrap();

    assert_eq!(languages.len(), 60);
    assert!(languages
        .iter()
        .any(|language| language["code"] == "hi" && language["name"] == "Hindi"));
}

#[tokio::test]
async fn test_run_detect_shouldReturnLanguageAndConfidence() {
    let controller = controller_with(MockEngine::new());

    let output = controller
        .run(Command::Detect {
            text: "வணக்கம்".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(output["language"], "ta");
    assert_eq!(output["confidence"], 1.0);
}

#[tokio::test]
async fn test_run_bulkWithFailingEngine_shouldReturnFailureItems() {
    let controller = controller_with(MockEngine::failing(EngineErrorKind::BackendUnavailable));

    let output = controller
        .run(Command::Bulk {
            texts: vec!["hello".to_string(), "world".to_string()],
            target_lang: "es".to_string(),
        })
        .await
        .unwrap();

    let items = output.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["status"], "failure");
    assert_eq!(items[1]["index"], 1);
    assert_eq!(items[1]["error_kind"], "backend_unavailable");
}

#[tokio::test]
async fn test_run_translateWithFailingEngine_shouldReturnError() {
    let controller = controller_with(MockEngine::failing(EngineErrorKind::Timeout));

    let result = controller
        .run(Command::Translate {
            text: "hello".to_string(),
            target_lang: "hi".to_string(),
            source_lang: None,
        })
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_statsWithZeroDays_shouldReturnError() {
    let controller = controller_with(MockEngine::new());
    assert!(controller.run(Command::Stats { days: 0 }).await.is_err());
}

#[test]
fn test_withConfig_missingCredentials_shouldRefuseToStart() {
    let mut config = Config::default();
    config.engine = EngineKind::Generative;

    let error = Controller::with_config(&config).unwrap_err();
    assert!(format!("{:#}", error).contains("requires an API key"));
}

#[test]
fn test_withConfig_invalidLimits_shouldRefuseToStart() {
    let mut config = Config::default();
    config.limits.max_bulk_items = 0;

    assert!(Controller::with_config(&config).is_err());
}
