/*!
 * Document translation pipeline.
 *
 * This module contains the core functionality for translating large
 * structured documents with a stateless language model. It is split into
 * several submodules:
 *
 * - `splitter`: Token-bounded splitting of raw text into units
 * - `stitcher`: Regrouping of units into overlapping batches
 * - `prompts`: Prompt templates and reply cleanup
 * - `client`: The per-batch translation interface and its chat implementation
 * - `assembler`: Reassembly of translated batches
 * - `cost`: Token usage ledger and pricing
 * - `core`: The orchestrating pipeline
 */

// Re-export main types for easier usage
pub use self::assembler::Assembler;
pub use self::client::{ChatBackend, ChatTranslator, SamplingOptions, TranslationClient, TranslationResult, TranslationTarget};
pub use self::core::{ChunkingOptions, TranslationJob, TranslationOutcome, TranslationPipeline};
pub use self::cost::{ModelPrice, PriceTable, UsageLedger, UsageReport};
pub use self::splitter::{ChunkSplitter, Unit};
pub use self::stitcher::{Batch, OverlapStitcher};

// Re-export prompt types
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

// Submodules
pub mod assembler;
pub mod client;
pub mod core;
pub mod cost;
pub mod prompts;
pub mod splitter;
pub mod stitcher;
