/*!
 * Prompt templates for document translation.
 *
 * A prompt is a system instruction, one example exchange showing that markup
 * commands pass through unchanged, and the batch text itself.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::TranslationConfig;

/// Matches a reply wrapped in a single markdown code fence
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n?```\z").unwrap()
});

/// System prompt template for markup-preserving translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt.
    pub const MARKUP_TRANSLATOR: &'static str = "Translate the following {markup} document into {dest_language}, translating only the plain text and leaving {markup} commands unchanged. Reply with the translated document only.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template with the given variables.
    pub fn render(&self, dest_language: &str, markup: &str) -> String {
        self.template
            .replace("{dest_language}", dest_language)
            .replace("{markup}", markup)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(Self::MARKUP_TRANSLATOR)
    }
}

/// A rendered chat conversation, independent of any backend wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    /// System instruction
    pub system: String,

    /// Few-shot exchanges as (user, assistant) pairs
    pub examples: Vec<(String, String)>,

    /// The text to translate
    pub user: String,
}

/// Builder for constructing translation prompts.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    template: PromptTemplate,
    markup: String,
    examples: Vec<(String, String)>,
}

impl TranslationPromptBuilder {
    /// Create a builder with the given template and markup name and no examples.
    pub fn new(template: PromptTemplate, markup: &str) -> Self {
        Self {
            template,
            markup: markup.to_string(),
            examples: Vec::new(),
        }
    }

    /// Create a builder from the translation section of the configuration.
    pub fn from_config(config: &TranslationConfig) -> Self {
        let builder = Self::new(PromptTemplate::new(&config.system_prompt), &config.markup);
        if config.sample_input.is_empty() {
            builder
        } else {
            builder.with_example(&config.sample_input, &config.sample_output)
        }
    }

    /// Add a few-shot example exchange.
    pub fn with_example(mut self, input: &str, output: &str) -> Self {
        self.examples.push((input.to_string(), output.to_string()));
        self
    }

    /// Build the prompt for one batch.
    pub fn build(&self, dest_language: &str, text: &str) -> ChatPrompt {
        ChatPrompt {
            system: self.template.render(dest_language, &self.markup),
            examples: self.examples.clone(),
            user: text.to_string(),
        }
    }
}

/// Normalize a raw model reply into the translated text.
///
/// Trims surrounding whitespace, unwraps a reply that is entirely one code
/// fence, and removes literal `"""` sequences.
pub fn clean_response(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = match CODE_FENCE.captures(trimmed) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => trimmed,
    };

    unfenced.replace("\"\"\"", "").trim().to_string()
}
