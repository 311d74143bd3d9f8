use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::document_source::{DefaultDocumentSource, DocumentSource};
use crate::errors::{AppError, TranslationError};
use crate::language_utils;
use crate::storage::{self, BlobStore, LocalBlobStore};
use crate::tokenizer::{BpeTokenizer, Tokenizer};
use crate::translation::{ChatTranslator, ChunkingOptions, TranslationClient, TranslationJob, TranslationPipeline};

// @module: Application controller for document translation

/// A request to translate one document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslateRequest {
    /// HTTP(S) URL, `file://` URL or local path of the source document
    pub file_url: String,

    /// Soft token ceiling per batch; the configured value when absent
    #[serde(default)]
    pub max_len: Option<usize>,

    /// Hard token ceiling per unit; the configured value when absent
    #[serde(default)]
    pub hard_max_len: Option<usize>,

    /// Overlap tokens; the configured value when absent
    #[serde(default)]
    pub overlap_len: Option<usize>,

    /// Destination language name or ISO code
    pub dest_language: String,

    /// Model name; the configured default when absent
    #[serde(default)]
    pub model: Option<String>,

    /// Translate at most this many batches
    #[serde(default)]
    pub num_pages: Option<usize>,
}

impl TranslateRequest {
    /// Create a request that takes every tunable from the configuration
    pub fn new(file_url: impl Into<String>, dest_language: impl Into<String>) -> Self {
        Self {
            file_url: file_url.into(),
            max_len: None,
            hard_max_len: None,
            overlap_len: None,
            dest_language: dest_language.into(),
            model: None,
            num_pages: None,
        }
    }

    /// Check the request fields, before anything is fetched
    pub fn validate(&self) -> Result<(), AppError> {
        if self.file_url.trim().is_empty() {
            return Err(AppError::InvalidRequest("file_url is required".to_string()));
        }
        if self.dest_language.trim().is_empty() {
            return Err(AppError::InvalidRequest("dest_language is required".to_string()));
        }
        if self.max_len == Some(0) {
            return Err(AppError::InvalidRequest("max_len must be greater than zero".to_string()));
        }
        if self.hard_max_len == Some(0) {
            return Err(AppError::InvalidRequest("hard_max_len must be greater than zero".to_string()));
        }
        if self.num_pages == Some(0) {
            return Err(AppError::InvalidRequest("num_pages must be greater than zero".to_string()));
        }
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(AppError::InvalidRequest("model cannot be blank".to_string()));
        }
        Ok(())
    }
}

/// Result of a successful translation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslateResponse {
    pub message: String,

    /// Location of the stored document, when it was stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,

    pub translated_text: String,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,

    /// USD
    pub total_cost: f64,
    pub batches_translated: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    tokenizer: Arc<dyn Tokenizer>,
    source: Box<dyn DocumentSource>,
    store: Box<dyn BlobStore>,
    client: Arc<dyn TranslationClient>,
    store_output: bool,
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with production collaborators built from the configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config.validate().map_err(|e| AppError::Config(format!("{:#}", e)))?;

        let tokenizer: Arc<dyn Tokenizer> = Arc::new(
            BpeTokenizer::new(config.translation.tokenizer).map_err(TranslationError::from)?,
        );
        let client: Arc<dyn TranslationClient> = Arc::new(ChatTranslator::from_config(&config, tokenizer.clone()));
        let source = Box::new(DefaultDocumentSource::default());
        let store = Box::new(LocalBlobStore::from_config(&config.storage));

        Ok(Self::with_collaborators(config, tokenizer, source, store, client))
    }

    // @method: Create a controller around explicit collaborators
    pub fn with_collaborators(
        config: Config,
        tokenizer: Arc<dyn Tokenizer>,
        source: Box<dyn DocumentSource>,
        store: Box<dyn BlobStore>,
        client: Arc<dyn TranslationClient>,
    ) -> Self {
        Self {
            config,
            tokenizer,
            source,
            store,
            client,
            store_output: true,
            show_progress: false,
        }
    }

    /// Whether the translated document is handed to the blob store
    pub fn store_output(mut self, enabled: bool) -> Self {
        self.store_output = enabled;
        self
    }

    /// Whether a progress bar is drawn on stderr
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate a document end to end
    ///
    /// Failures are logged here once and returned to the caller.
    pub async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResponse, AppError> {
        match self.run_translation(request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!("Translation request failed ({:?}): {}", e.kind(), e);
                Err(e)
            }
        }
    }

    async fn run_translation(&self, request: &TranslateRequest) -> Result<TranslateResponse, AppError> {
        let start_time = Instant::now();

        request.validate()?;
        let dest_language = language_utils::resolve_language_name(&request.dest_language)
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
        let model = request.model.as_deref()
            .map(str::trim)
            .unwrap_or(self.config.translation.model.as_str())
            .to_string();

        let document = self.source.fetch(&request.file_url).await?;
        info!("Fetched document from {} ({} bytes)", request.file_url, document.len());

        let options = ChunkingOptions {
            max_len: request.max_len.unwrap_or(self.config.translation.max_len),
            hard_max_len: request.hard_max_len.unwrap_or(self.config.translation.hard_max_len),
            overlap_len: request.overlap_len.unwrap_or(self.config.translation.overlap_len),
            delimiter: self.config.translation.delimiter.clone(),
        };
        let job = TranslationJob {
            dest_language,
            model,
            num_pages: request.num_pages,
        };

        let pipeline = TranslationPipeline::new(
            self.tokenizer.as_ref(),
            self.client.as_ref(),
            &self.config.pricing,
            options,
        );

        let progress_bar = self.create_progress_bar();
        let outcome = pipeline.run(&document, &job, |done, total| {
            progress_bar.set_length(total as u64);
            progress_bar.set_position(done as u64);
        }).await;
        progress_bar.finish_and_clear();
        let outcome = outcome?;

        debug!("{}", outcome.usage.summary());

        let stored = if self.store_output {
            let key = storage::object_key(&self.config.storage);
            let content_type = Self::content_type(&self.config.storage.extension);
            Some(self.store.put(&key, &outcome.translated_text, content_type).await?)
        } else {
            None
        };

        info!(
            "Translation completed in {}. Total cost: {}",
            Self::format_duration(start_time.elapsed()),
            outcome.usage.formatted_cost()
        );

        Ok(TranslateResponse {
            message: "Translation completed successfully".to_string(),
            file_url: stored.as_ref().map(|s| s.location.clone()),
            object_key: stored.map(|s| s.key),
            translated_text: outcome.translated_text,
            total_input_tokens: outcome.usage.input_tokens,
            total_output_tokens: outcome.usage.output_tokens,
            total_cost: outcome.usage.cost,
            batches_translated: outcome.usage.batches,
        })
    }

    fn create_progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    fn content_type(extension: &str) -> &'static str {
        match extension.trim_start_matches('.') {
            "tex" => "application/x-tex",
            "md" => "text/markdown",
            "html" | "htm" => "text/html",
            _ => "text/plain",
        }
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
