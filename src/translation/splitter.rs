/*!
 * Splitting of raw documents into token-bounded units.
 *
 * The document is first cut on the paragraph delimiter. Any paragraph above
 * the hard token ceiling is then bisected at its character midpoint, and each
 * half is re-measured, until every fragment fits. The midpoint cut ignores
 * word and markup boundaries.
 */

use log::warn;

use crate::errors::TranslationError;
use crate::tokenizer::Tokenizer;

/// A contiguous span of the document with its measured token count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// The text of the span
    pub text: String,

    /// Token count of `text`
    pub token_count: usize,
}

impl Unit {
    pub fn new(text: impl Into<String>, token_count: usize) -> Self {
        Self {
            text: text.into(),
            token_count,
        }
    }
}

/// Splits documents into units no larger than a hard token ceiling
pub struct ChunkSplitter<'a> {
    tokenizer: &'a dyn Tokenizer,
    hard_max_len: usize,
    delimiter: &'a str,
}

impl<'a> ChunkSplitter<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer, hard_max_len: usize, delimiter: &'a str) -> Self {
        Self {
            tokenizer,
            hard_max_len,
            delimiter,
        }
    }

    /// Split a document into ordered units, each within the hard ceiling
    pub fn split(&self, document: &str) -> Result<Vec<Unit>, TranslationError> {
        let mut units = Vec::new();

        for segment in document.split(self.delimiter) {
            let tokens = self.tokenizer.count_tokens(segment)?;
            self.push_bounded(segment, tokens, &mut units)?;
        }

        Ok(units)
    }

    fn push_bounded(&self, fragment: &str, tokens: usize, units: &mut Vec<Unit>) -> Result<(), TranslationError> {
        if tokens <= self.hard_max_len {
            units.push(Unit::new(fragment, tokens));
            return Ok(());
        }

        let char_count = fragment.chars().count();
        if char_count < 2 {
            return Err(TranslationError::FragmentTooLarge {
                tokens,
                limit: self.hard_max_len,
            });
        }

        warn!(
            "Splitting chunk due to excessive length ({} tokens > {} token limit). Preview: '{}...'",
            tokens,
            self.hard_max_len,
            preview(fragment, 50)
        );

        let (left, right) = split_at_char_midpoint(fragment, char_count);

        let left_tokens = self.tokenizer.count_tokens(left)?;
        self.push_bounded(left, left_tokens, units)?;

        let right_tokens = self.tokenizer.count_tokens(right)?;
        self.push_bounded(right, right_tokens, units)
    }
}

/// Cut `text` in two at its middle character
fn split_at_char_midpoint(text: &str, char_count: usize) -> (&str, &str) {
    let mid = text
        .char_indices()
        .nth(char_count / 2)
        .map(|(byte_index, _)| byte_index)
        .unwrap_or(text.len());
    text.split_at(mid)
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
