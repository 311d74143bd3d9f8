use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::tokenizer::TokenizerEncoding;
use crate::translation::cost::PriceTable;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Chunking and prompting settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Available translation providers
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    /// Per-model prices in USD per million tokens
    #[serde(default)]
    pub pricing: PriceTable,

    /// Where translated documents are written
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI (and OpenAI-compatible servers)
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
}

impl TranslationProvider {
    /// Backend serving a model name
    pub fn for_model(model: &str) -> Self {
        if model.trim().to_lowercase().starts_with("claude") {
            Self::Anthropic
        } else {
            Self::OpenAI
        }
    }

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Chunking, prompting and decoding settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub model: String,

    /// Soft token ceiling per batch
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Hard token ceiling per unit
    #[serde(default = "default_hard_max_len")]
    pub hard_max_len: usize,

    /// Trailing tokens of the previous batch repeated in front of the next one
    #[serde(default = "default_overlap_len")]
    pub overlap_len: usize,

    /// Paragraph delimiter used to split and reassemble documents
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// BPE vocabulary used for counting
    #[serde(default)]
    pub tokenizer: TokenizerEncoding,

    /// Temperature parameter for text generation
    /// Zero keeps repeated calls on the same batch stable
    #[serde(default)]
    pub temperature: f32,

    /// Nucleus sampling mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Completion token budget per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System prompt template
    /// Placeholders: {dest_language}, {markup}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Name of the markup language whose commands must survive translation
    #[serde(default = "default_markup")]
    pub markup: String,

    /// Few-shot example source
    #[serde(default = "default_sample_input")]
    pub sample_input: String,

    /// Few-shot example translation
    #[serde(default = "default_sample_output")]
    pub sample_output: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_len: default_max_len(),
            hard_max_len: default_hard_max_len(),
            overlap_len: default_overlap_len(),
            delimiter: default_delimiter(),
            tokenizer: TokenizerEncoding::default(),
            temperature: 0.0,
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            markup: default_markup(),
            sample_input: default_sample_input(),
            sample_output: default_sample_output(),
        }
    }
}

/// Blob storage settings for translated documents
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory receiving translated documents
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Object key prefix
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Object key extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Base URL under which stored objects are published, if any
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            key_prefix: default_key_prefix(),
            extension: default_extension(),
            public_base_url: None,
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

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_len() -> usize {
    1000
}

fn default_hard_max_len() -> usize {
    1000
}

fn default_overlap_len() -> usize {
    100
}

fn default_delimiter() -> String {
    "\n\n".to_string()
}

fn default_top_p() -> f32 {
    1.0
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(TranslationProvider::OpenAI),
        ProviderConfig::new(TranslationProvider::Anthropic),
    ]
}

fn default_system_prompt() -> String {
    "Translate the following {markup} document into {dest_language}, translating only the plain text and leaving {markup} commands unchanged. Reply with the translated document only.".to_string()
}

fn default_markup() -> String {
    "LaTeX".to_string()
}

fn default_sample_input() -> String {
    r"\section{Introducción a la Álgebra} \label{introAlg}".to_string()
}

fn default_sample_output() -> String {
    r"\section{Introduction to Algebra} \label{introAlg}".to_string()
}

fn default_output_dir() -> String {
    "translations".to_string()
}

fn default_key_prefix() -> String {
    "translated_content".to_string()
}

fn default_extension() -> String {
    "tex".to_string()
}

impl Config {
    /// Load a configuration file, or write the defaults to it if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::from_file(path);
        }

        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .context(format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .context(format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let t = &self.translation;

        if t.model.trim().is_empty() {
            return Err(anyhow!("Default model cannot be empty"));
        }
        if t.max_len == 0 || t.hard_max_len == 0 {
            return Err(anyhow!("Token ceilings must be greater than zero"));
        }
        if t.delimiter.is_empty() {
            return Err(anyhow!("Paragraph delimiter cannot be empty"));
        }
        if !(0.0..=2.0).contains(&t.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", t.temperature));
        }
        if !(0.0..=1.0).contains(&t.top_p) {
            return Err(anyhow!("top_p must be between 0.0 and 1.0, got {}", t.top_p));
        }
        if t.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be greater than zero"));
        }

        let invalid = self.pricing.invalid_rows();
        if !invalid.is_empty() {
            return Err(anyhow!("Prices must be finite and non-negative: {}", invalid.join(", ")));
        }

        for provider in &self.providers {
            provider.provider_type.parse::<TranslationProvider>()?;
        }

        if self.storage.key_prefix.trim().is_empty() {
            return Err(anyhow!("Storage key prefix cannot be empty"));
        }

        Ok(())
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the API key for a provider
    pub fn get_api_key(&self, provider_type: &TranslationProvider) -> String {
        self.get_provider_config(provider_type)
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Set the API key for a provider, adding its entry if missing
    pub fn set_api_key(&mut self, provider_type: &TranslationProvider, api_key: impl Into<String>) {
        let provider_str = provider_type.to_lowercase_string();
        match self.providers.iter_mut().find(|p| p.provider_type == provider_str) {
            Some(provider) => provider.api_key = api_key.into(),
            None => {
                let mut provider = ProviderConfig::new(provider_type.clone());
                provider.api_key = api_key.into();
                self.providers.push(provider);
            }
        }
    }

    /// Get the endpoint for a provider
    pub fn get_endpoint(&self, provider_type: &TranslationProvider) -> String {
        if let Some(provider_config) = self.get_provider_config(provider_type) {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match provider_type {
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Anthropic => default_anthropic_endpoint(),
        }
    }

    /// Get the request timeout for a provider
    pub fn get_timeout_secs(&self, provider_type: &TranslationProvider) -> u64 {
        self.get_provider_config(provider_type)
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            translation: TranslationConfig::default(),
            providers: default_providers(),
            pricing: PriceTable::default(),
            storage: StorageConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
