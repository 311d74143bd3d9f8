/*!
 * Integration tests for application lifecycle
 *
 * The controller is exercised end to end with scripted collaborators:
 * request validation, document retrieval, translation and storage.
 */

use std::sync::Arc;

use anyhow::Result;
use booktrans::app_config::Config;
use booktrans::app_controller::{Controller, TranslateRequest};
use booktrans::errors::{AppError, ErrorKind, TranslationError};
use crate::common;
use crate::common::mock_providers::{CharTokenizer, MemoryBlobStore, MockErrorType, ScriptedClient, StaticDocumentSource};

const BOOK_URL: &str = "https://books.example.com/algebra.tex";

struct Harness {
    controller: Controller,
    client: Arc<ScriptedClient>,
    store: MemoryBlobStore,
}

fn harness(config: Config, client: ScriptedClient) -> Harness {
    common::init_test_logger();
    let client = Arc::new(client);
    let store = MemoryBlobStore::default();
    let source = StaticDocumentSource::default()
        .with_document(BOOK_URL, &common::sample_latex_document())
        .with_document("five.tex", &common::lettered_paragraphs(5, 4));

    let controller = Controller::with_collaborators(
        config,
        Arc::new(CharTokenizer),
        Box::new(source),
        Box::new(store.clone()),
        client.clone(),
    );

    Harness { controller, client, store }
}

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() {
    let controller = tokio_test::assert_ok!(Controller::with_config(Config::default()));
    assert_eq!(controller.config().translation.model, "gpt-4");
}

/// An inconsistent configuration is refused up front
#[test]
fn test_controller_initialization_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.translation.hard_max_len = 0;

    let result = Controller::with_config(config);

    assert!(matches!(result, Err(AppError::Config(_))));
}

/// A full request translates, stores and reports usage
#[tokio::test]
async fn test_translate_withValidRequest_shouldStoreAndReport() -> Result<()> {
    let h = harness(Config::default(), ScriptedClient::upper());
    let request = TranslateRequest::new(BOOK_URL, "en");

    let response = h.controller.translate(&request).await?;

    let objects = h.store.objects();
    assert_eq!(objects.len(), 1);
    let (key, body, content_type) = &objects[0];
    assert!(key.starts_with("translated_content_") && key.ends_with(".tex"));
    assert_eq!(body, &response.translated_text);
    assert_eq!(content_type, "application/x-tex");

    assert_eq!(response.message, "Translation completed successfully");
    assert_eq!(response.file_url.as_deref(), Some(format!("memory://{}", key).as_str()));
    assert_eq!(response.object_key.as_deref(), Some(key.as_str()));
    assert_eq!(response.translated_text, common::sample_latex_document().to_uppercase());
    assert_eq!(response.batches_translated, 1);
    assert!(response.total_input_tokens > 0);
    assert!(response.total_cost > 0.0);

    let calls = h.client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target.dest_language, "English");
    assert_eq!(calls[0].target.model, "gpt-4");
    Ok(())
}

/// Request overrides reach the pipeline
#[tokio::test]
async fn test_translate_withOverrides_shouldApplyModelCapAndOverlap() -> Result<()> {
    let h = harness(Config::default(), ScriptedClient::echo());
    let mut request = TranslateRequest::new("five.tex", "Spanish");
    request.max_len = Some(4);
    request.overlap_len = Some(0);
    request.model = Some("claude-3-haiku".to_string());
    request.num_pages = Some(2);

    let response = h.controller.translate(&request).await?;

    assert_eq!(response.translated_text, "aaaa\n\nbbbb");
    assert_eq!(response.batches_translated, 2);
    let calls = h.client.calls();
    assert!(calls.iter().all(|c| c.target.model == "claude-3-haiku" && c.overlap.is_none()));
    assert_eq!(calls[0].target.dest_language, "Spanish");
    Ok(())
}

/// Ceilings left out of the request come from the configuration
#[tokio::test]
async fn test_translate_withoutRequestCeilings_shouldUseConfiguredCeilings() -> Result<()> {
    let mut config = Config::default();
    config.translation.max_len = 4;
    config.translation.overlap_len = 0;
    let h = harness(config, ScriptedClient::echo());
    let request: TranslateRequest = serde_json::from_str(r#"{"file_url":"five.tex","dest_language":"en"}"#)?;

    let response = h.controller.translate(&request).await?;

    assert_eq!(response.batches_translated, 5);
    assert_eq!(h.client.call_count(), 5);
    assert_eq!(response.translated_text, common::lettered_paragraphs(5, 4));
    Ok(())
}

/// A configured hard ceiling too small for the text is applied as well
#[tokio::test]
async fn test_translate_withConfiguredHardCeiling_shouldSplitParagraphs() -> Result<()> {
    let mut config = Config::default();
    config.translation.max_len = 2;
    config.translation.hard_max_len = 2;
    config.translation.overlap_len = 0;
    let h = harness(config, ScriptedClient::echo());

    let response = h.controller.translate(&TranslateRequest::new("five.tex", "en")).await?;

    assert_eq!(response.batches_translated, 10);
    assert!(h.client.calls().iter().all(|c| c.content.chars().count() <= 2));
    Ok(())
}

/// Invalid requests never reach the client
#[tokio::test]
async fn test_translate_withInvalidRequest_shouldRejectWithoutCalls() {
    let h = harness(Config::default(), ScriptedClient::echo());
    let mut request = TranslateRequest::new(BOOK_URL, "English");
    request.hard_max_len = Some(0);

    let error = h.controller.translate(&request).await.unwrap_err();

    assert!(matches!(error, AppError::InvalidRequest(_)));
    assert_eq!(error.kind(), ErrorKind::Input);
    assert_eq!(h.client.call_count(), 0);
    assert!(h.store.objects().is_empty());
}

/// An unreachable document is an input error
#[tokio::test]
async fn test_translate_withMissingDocument_shouldReportDocumentUnavailable() {
    let h = harness(Config::default(), ScriptedClient::echo());

    let error = h.controller
        .translate(&TranslateRequest::new("https://books.example.com/missing.tex", "English"))
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::DocumentUnavailable(_)));
    assert!(error.is_client_error());
    assert_eq!(h.client.call_count(), 0);
}

/// A failing call aborts the request and nothing is stored
#[tokio::test]
async fn test_translate_withFailingClient_shouldNotStorePartialOutput() {
    let h = harness(Config::default(), ScriptedClient::echo().failing_on(2, MockErrorType::Api));
    let mut request = TranslateRequest::new("five.tex", "French");
    request.max_len = Some(4);

    let error = h.controller.translate(&request).await.unwrap_err();

    assert!(matches!(
        error,
        AppError::Translation(TranslationError::BatchFailed { index: 2, total: 5, .. })
    ));
    assert_eq!(error.kind(), ErrorKind::Collaborator);
    assert!(h.store.objects().is_empty());
}

/// Storage can be skipped entirely
#[tokio::test]
async fn test_translate_withStorageDisabled_shouldReturnTextOnly() -> Result<()> {
    let mut h = harness(Config::default(), ScriptedClient::echo());
    h.controller = h.controller.store_output(false);

    let response = h.controller.translate(&TranslateRequest::new(BOOK_URL, "de")).await?;

    assert!(response.file_url.is_none());
    assert!(response.object_key.is_none());
    assert!(h.store.objects().is_empty());
    assert_eq!(response.translated_text, common::sample_latex_document());

    let json = serde_json::to_value(&response)?;
    assert!(json.get("file_url").is_none());
    assert_eq!(json["batches_translated"], 1);
    Ok(())
}
