/*!
 * Prompt construction for markup-preserving translation.
 *
 * This module provides:
 * - The system prompt template with `{dest_language}` and `{markup}` placeholders
 * - A builder assembling the few-shot conversation sent for each batch
 * - Post-processing of raw model replies
 */

pub mod templates;

// Re-export main types
pub use templates::{clean_response, ChatPrompt, PromptTemplate, TranslationPromptBuilder};
