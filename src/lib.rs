/*!
 * # booktrans - Markup-preserving book translation with language models
 *
 * A Rust library for translating large structured documents (LaTeX books by
 * default) with a stateless chat model while leaving markup commands intact.
 *
 * ## Features
 *
 * - Token-bounded splitting of documents into units
 * - Overlapping batches so each call sees where the previous one left off
 * - Translation through OpenAI or Anthropic chat models
 * - Token usage and cost accounting per model
 * - Documents fetched over HTTP(S) or from disk, results stored as files
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `tokenizer`: Token counting and tail extraction
 * - `translation`: The chunking and translation pipeline:
 *   - `translation::splitter`: Hard-ceiling splitting into units
 *   - `translation::stitcher`: Overlapping batch construction
 *   - `translation::client`: Per-batch translation interface
 *   - `translation::cost`: Usage ledger and prices
 *   - `translation::core`: Pipeline orchestration
 * - `providers`: Client implementations for chat services:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 * - `document_source`: Document retrieval
 * - `storage`: Persistence of translated documents
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document_source;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod storage;
pub mod tokenizer;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, TranslateRequest, TranslateResponse};
pub use errors::{AppError, ErrorKind, ProviderError, TranslationError};
pub use language_utils::{get_language_name, resolve_language_name};
pub use tokenizer::{BpeTokenizer, Tokenizer, TokenizerEncoding};
pub use translation::{TranslationClient, TranslationPipeline};
