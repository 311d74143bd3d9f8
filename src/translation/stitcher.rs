/*!
 * Regrouping of units into translation batches with overlap context.
 *
 * Units are packed greedily into batches under a soft token ceiling. Every
 * batch after the first is prefixed with the trailing tokens of the batch
 * emitted before it, so a stateless model sees where the previous call left
 * off. Only the batch's own content counts against the ceiling.
 */

use log::debug;

use crate::errors::TranslationError;
use crate::tokenizer::Tokenizer;

use super::splitter::Unit;

/// A translation-call-sized group of units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 0-based position in the emitted sequence
    pub index: usize,

    /// Trailing context copied from the previous batch
    pub overlap: Option<String>,

    /// The units of this batch joined with the delimiter
    pub content: String,

    /// Sum of the unit token counts (overlap excluded)
    pub token_count: usize,

    /// Number of units packed into this batch
    pub unit_count: usize,

    delimiter: String,
}

impl Batch {
    /// Full text to translate: overlap prefix followed by the content
    pub fn text(&self) -> String {
        match &self.overlap {
            Some(overlap) => format!("{}{}{}", overlap, self.delimiter, self.content),
            None => self.content.clone(),
        }
    }

    /// Whether there is nothing but whitespace to translate
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty() && self.overlap.as_deref().is_none_or(|o| o.trim().is_empty())
    }
}

/// Batch under construction
#[derive(Default)]
struct RunningBatch {
    content: String,
    token_count: usize,
    unit_count: usize,
}

impl RunningBatch {
    fn is_empty(&self) -> bool {
        self.unit_count == 0
    }

    fn push(&mut self, unit: &Unit, delimiter: &str) {
        if !self.is_empty() {
            self.content.push_str(delimiter);
        }
        self.content.push_str(&unit.text);
        self.token_count += unit.token_count;
        self.unit_count += 1;
    }
}

/// Packs units into overlapping batches
pub struct OverlapStitcher<'a> {
    tokenizer: &'a dyn Tokenizer,
    max_len: usize,
    overlap_len: usize,
    delimiter: &'a str,
}

impl<'a> OverlapStitcher<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer, max_len: usize, overlap_len: usize, delimiter: &'a str) -> Self {
        Self {
            tokenizer,
            max_len,
            overlap_len,
            delimiter,
        }
    }

    /// Group units into batches, in order
    pub fn stitch(&self, units: &[Unit]) -> Result<Vec<Batch>, TranslationError> {
        let mut batches: Vec<Batch> = Vec::new();
        let mut running = RunningBatch::default();

        for unit in units {
            if running.is_empty() || running.token_count + unit.token_count <= self.max_len {
                running.push(unit, self.delimiter);
                continue;
            }

            let full = std::mem::take(&mut running);
            let batch = self.seal(full, &batches)?;
            batches.push(batch);
            running.push(unit, self.delimiter);
        }

        if !running.is_empty() {
            let batch = self.seal(running, &batches)?;
            batches.push(batch);
        }

        debug!("Stitched {} units into {} batches", units.len(), batches.len());
        Ok(batches)
    }

    fn seal(&self, running: RunningBatch, emitted: &[Batch]) -> Result<Batch, TranslationError> {
        let overlap = match emitted.last() {
            Some(previous) if self.overlap_len > 0 => {
                let tail = self.tokenizer.tail(&previous.text(), self.overlap_len)?;
                (!tail.is_empty()).then_some(tail)
            }
            _ => None,
        };

        Ok(Batch {
            index: emitted.len(),
            overlap,
            content: running.content,
            token_count: running.token_count,
            unit_count: running.unit_count,
            delimiter: self.delimiter.to_string(),
        })
    }
}
