/*!
 * Token counting for length ceilings and pricing.
 *
 * The pipeline only ever needs two things from a tokenizer: how many tokens a
 * text holds, and the text of its last N tokens (used as overlap context).
 * `BpeTokenizer` provides both on top of the tiktoken BPE tables.
 */

use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;

use crate::errors::TokenizerError;

/// Narrow tokenizer interface used by the chunking pipeline
pub trait Tokenizer: Send + Sync {
    /// Number of tokens in `text`
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError>;

    /// The last `n` tokens of `text`, decoded back to a string
    fn tail(&self, text: &str, n: usize) -> Result<String, TokenizerError>;
}

/// BPE vocabulary to load
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerEncoding {
    /// GPT-2 vocabulary (`r50k_base`)
    #[default]
    Gpt2,
    /// GPT-3.5 / GPT-4 vocabulary
    Cl100k,
    /// GPT-4o vocabulary
    O200k,
}

impl TokenizerEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gpt2 => "r50k_base",
            Self::Cl100k => "cl100k_base",
            Self::O200k => "o200k_base",
        }
    }
}

impl std::fmt::Display for TokenizerEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tokenizer backed by a tiktoken BPE table
pub struct BpeTokenizer {
    bpe: CoreBPE,
    encoding: TokenizerEncoding,
}

impl BpeTokenizer {
    /// Load the BPE ranks for the given encoding
    pub fn new(encoding: TokenizerEncoding) -> Result<Self, TokenizerError> {
        let loaded = match encoding {
            TokenizerEncoding::Gpt2 => tiktoken_rs::r50k_base(),
            TokenizerEncoding::Cl100k => tiktoken_rs::cl100k_base(),
            TokenizerEncoding::O200k => tiktoken_rs::o200k_base(),
        };

        let bpe = loaded.map_err(|e| TokenizerError::Load {
            encoding: encoding.name().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { bpe, encoding })
    }

    pub fn encoding(&self) -> TokenizerEncoding {
        self.encoding
    }
}

impl std::fmt::Debug for BpeTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenizer")
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl Tokenizer for BpeTokenizer {
    fn count_tokens(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.bpe.encode_ordinary(text).len())
    }

    fn tail(&self, text: &str, n: usize) -> Result<String, TokenizerError> {
        if n == 0 || text.is_empty() {
            return Ok(String::new());
        }

        let tokens = self.bpe.encode_ordinary(text);
        let mut start = tokens.len().saturating_sub(n);

        // A byte-level BPE cut can land inside a multi-byte character;
        // drop leading tokens until the slice decodes cleanly.
        while start < tokens.len() {
            if let Ok(decoded) = self.bpe.decode(tokens[start..].to_vec()) {
                return Ok(decoded);
            }
            start += 1;
        }

        Ok(String::new())
    }
}
