/*!
 * Tests for prompt construction and the chat-backed translation client
 */

use std::sync::Arc;

use booktrans::app_config::{Config, TranslationConfig, TranslationProvider};
use booktrans::errors::ProviderError;
use booktrans::providers::anthropic::{Anthropic, AnthropicResponse};
use booktrans::providers::openai::{OpenAI, OpenAIResponse};
use booktrans::providers::Provider;
use booktrans::translation::prompts::{clean_response, PromptTemplate, TranslationPromptBuilder};
use booktrans::translation::{ChatTranslator, OverlapStitcher, TranslationClient, TranslationTarget, Unit};
use crate::common::mock_providers::CharTokenizer;

/// The default prompt keeps markup untouched and carries the sample pair
#[test]
fn test_promptBuilder_withDefaultConfig_shouldBuildFewShotPrompt() {
    let builder = TranslationPromptBuilder::from_config(&TranslationConfig::default());

    let prompt = builder.build("English", r"\chapter{Hola}");

    assert_eq!(
        prompt.system,
        "Translate the following LaTeX document into English, translating only the plain text and leaving LaTeX commands unchanged. Reply with the translated document only."
    );
    assert_eq!(
        prompt.examples,
        vec![(
            r"\section{Introducción a la Álgebra} \label{introAlg}".to_string(),
            r"\section{Introduction to Algebra} \label{introAlg}".to_string(),
        )]
    );
    assert_eq!(prompt.user, r"\chapter{Hola}");
}

/// Custom templates and markup names are honored
#[test]
fn test_promptBuilder_withCustomTemplate_shouldRenderPlaceholders() {
    let builder = TranslationPromptBuilder::new(PromptTemplate::new("{markup} to {dest_language}"), "Markdown")
        .with_example("# Hola", "# Hello");

    let prompt = builder.build("German", "Text");

    assert_eq!(prompt.system, "Markdown to German");
    assert_eq!(prompt.examples.len(), 1);
}

/// Replies are trimmed and stripped of fences and triple quotes
#[test]
fn test_cleanResponse_withWrappedReplies_shouldReturnBareText() {
    assert_eq!(clean_response("\n  Hello world  \n"), "Hello world");
    assert_eq!(clean_response("\"\"\"Hello\"\"\""), "Hello");
    assert_eq!(clean_response("```\n\\item One\n```"), "\\item One");
    assert_eq!(clean_response("```tex\n\\item One\n\n\\item Two\n```\n"), "\\item One\n\n\\item Two");
}

/// Provider responses decode and expose their text
#[test]
fn test_providerResponses_shouldExtractText() {
    let openai: OpenAIResponse = serde_json::from_str(
        r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"\\section{Hello}"},"finish_reason":"stop"}]}"#,
    ).unwrap();
    assert_eq!(OpenAI::extract_text(&openai), "\\section{Hello}");
    assert!(openai.usage.is_none());

    let anthropic: AnthropicResponse = serde_json::from_str(
        r#"{"content":[{"type":"text","text":"Bonjour"}],"usage":{"input_tokens":3,"output_tokens":1}}"#,
    ).unwrap();
    assert_eq!(Anthropic::extract_text(&anthropic), "Bonjour");
}

/// An unreachable backend surfaces as a connection error, with no retry
#[tokio::test]
async fn test_chatTranslator_withUnreachableEndpoint_shouldReturnConnectionError() {
    let mut config = Config::default();
    for provider in config.providers.iter_mut() {
        provider.endpoint = "http://127.0.0.1:9".to_string();
        provider.timeout_secs = 2;
    }
    assert_eq!(config.get_endpoint(&TranslationProvider::OpenAI), "http://127.0.0.1:9");

    let tokenizer = CharTokenizer;
    let translator = ChatTranslator::from_config(&config, Arc::new(CharTokenizer));
    let batches = OverlapStitcher::new(&tokenizer, 100, 0, "\n\n")
        .stitch(&[Unit::new("Hola", 4)])
        .unwrap();
    let batch = batches.into_iter().next().unwrap();

    for model in ["gpt-4", "claude-3-haiku"] {
        let target = TranslationTarget::new("English", model);
        let result = translator.translate(batch.clone(), &target).await;
        assert!(matches!(result, Err(ProviderError::ConnectionError(_))), "model {}", model);
    }
}
