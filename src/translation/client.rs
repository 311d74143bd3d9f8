/*!
 * Translation client: one batch in, translated text and token usage out.
 *
 * `TranslationClient` is the seam the pipeline drives. `ChatTranslator` is the
 * production implementation; it renders the few-shot prompt and forwards it to
 * the chat backend serving the requested model.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::app_config::{Config, TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;
use crate::tokenizer::Tokenizer;
use crate::translation::prompts::{clean_response, ChatPrompt, TranslationPromptBuilder};
use crate::translation::stitcher::Batch;

/// Where a batch is translated to, and by which model
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTarget {
    pub dest_language: String,
    pub model: String,
}

impl TranslationTarget {
    pub fn new(dest_language: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            dest_language: dest_language.into(),
            model: model.into(),
        }
    }
}

/// The translation of one batch
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    /// Cleaned translated text
    pub text: String,

    /// Tokens in the cleaned text
    pub output_tokens: usize,
}

/// Translates a single batch, preserving embedded markup commands.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    async fn translate(&self, batch: Batch, target: &TranslationTarget) -> Result<TranslationResult, ProviderError>;
}

/// Decoding settings shared by every call
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 1500,
        }
    }
}

impl From<&TranslationConfig> for SamplingOptions {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }
}

/// Chat service clients available to the translator
#[derive(Debug)]
pub struct ChatBackend {
    openai: OpenAI,
    anthropic: Anthropic,
}

impl ChatBackend {
    pub fn new(openai: OpenAI, anthropic: Anthropic) -> Self {
        Self { openai, anthropic }
    }

    /// Build both clients from the provider section of the configuration
    pub fn from_config(config: &Config) -> Self {
        let openai = TranslationProvider::OpenAI;
        let anthropic = TranslationProvider::Anthropic;

        Self::new(
            OpenAI::new(
                config.get_api_key(&openai),
                config.get_endpoint(&openai),
                config.get_timeout_secs(&openai),
            ),
            Anthropic::new(
                config.get_api_key(&anthropic),
                config.get_endpoint(&anthropic),
                config.get_timeout_secs(&anthropic),
            ),
        )
    }

    /// Send a prompt to the service serving `model` and return the raw reply text
    pub async fn complete(&self, model: &str, prompt: ChatPrompt, sampling: &SamplingOptions) -> Result<String, ProviderError> {
        match TranslationProvider::for_model(model) {
            TranslationProvider::OpenAI => {
                let mut request = OpenAIRequest::new(model).add_message("system", prompt.system);
                for (input, output) in prompt.examples {
                    request = request.add_message("user", input).add_message("assistant", output);
                }
                let request = request
                    .add_message("user", prompt.user)
                    .temperature(sampling.temperature)
                    .top_p(sampling.top_p)
                    .max_tokens(sampling.max_tokens);

                let response = self.openai.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            TranslationProvider::Anthropic => {
                let mut request = AnthropicRequest::new(model, sampling.max_tokens).system(prompt.system);
                for (input, output) in prompt.examples {
                    request = request.add_message("user", input).add_message("assistant", output);
                }
                let request = request
                    .add_message("user", prompt.user)
                    .temperature(sampling.temperature)
                    .top_p(sampling.top_p);

                let response = self.anthropic.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            }
        }
    }
}

/// Production translation client backed by a chat model
pub struct ChatTranslator {
    backend: ChatBackend,
    tokenizer: Arc<dyn Tokenizer>,
    prompts: TranslationPromptBuilder,
    sampling: SamplingOptions,
}

impl ChatTranslator {
    pub fn new(
        backend: ChatBackend,
        tokenizer: Arc<dyn Tokenizer>,
        prompts: TranslationPromptBuilder,
        sampling: SamplingOptions,
    ) -> Self {
        Self {
            backend,
            tokenizer,
            prompts,
            sampling,
        }
    }

    /// Build a translator from configuration
    pub fn from_config(config: &Config, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self::new(
            ChatBackend::from_config(config),
            tokenizer,
            TranslationPromptBuilder::from_config(&config.translation),
            SamplingOptions::from(&config.translation),
        )
    }

    /// Chat prompt for one batch; the user message is the full batch text, overlap included
    pub fn prompt_for(&self, batch: &Batch, target: &TranslationTarget) -> ChatPrompt {
        self.prompts.build(&target.dest_language, &batch.text())
    }
}

#[async_trait]
impl TranslationClient for ChatTranslator {
    async fn translate(&self, batch: Batch, target: &TranslationTarget) -> Result<TranslationResult, ProviderError> {
        let prompt = self.prompt_for(&batch, target);
        debug!(
            "Sending batch {} ({} tokens) to {} via {}",
            batch.index,
            batch.token_count,
            target.model,
            TranslationProvider::for_model(&target.model).display_name()
        );

        let raw = self.backend.complete(&target.model, prompt, &self.sampling).await?;
        let text = clean_response(&raw);
        let output_tokens = self.tokenizer.count_tokens(&text)
            .map_err(|e| ProviderError::ParseError(format!("Failed to count output tokens: {}", e)))?;

        Ok(TranslationResult { text, output_tokens })
    }
}
