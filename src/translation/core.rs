/*!
 * Core translation pipeline.
 *
 * This module wires the splitter, stitcher, translation client, assembler and
 * usage ledger together. Batches are translated one at a time in document
 * order; the first failing call aborts the run.
 */

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::errors::TranslationError;
use crate::tokenizer::Tokenizer;

use super::assembler::Assembler;
use super::client::{TranslationClient, TranslationTarget};
use super::cost::{PriceTable, UsageLedger, UsageReport};
use super::splitter::ChunkSplitter;
use super::stitcher::{Batch, OverlapStitcher};

/// Token ceilings and the paragraph delimiter
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkingOptions {
    /// Soft ceiling on batch content tokens
    pub max_len: usize,

    /// Hard ceiling on unit tokens
    pub hard_max_len: usize,

    /// Tokens of overlap carried into each following batch
    pub overlap_len: usize,

    /// Paragraph delimiter
    pub delimiter: String,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_len: 1000,
            hard_max_len: 1000,
            overlap_len: 100,
            delimiter: "\n\n".to_string(),
        }
    }
}

/// One translation run's parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationJob {
    pub dest_language: String,
    pub model: String,

    /// Translate at most this many batches
    pub num_pages: Option<usize>,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub translated_text: String,
    pub usage: UsageReport,
}

/// Sequential chunk-translate-assemble pipeline
pub struct TranslationPipeline<'a> {
    tokenizer: &'a dyn Tokenizer,
    client: &'a dyn TranslationClient,
    prices: &'a PriceTable,
    options: ChunkingOptions,
}

impl<'a> TranslationPipeline<'a> {
    pub fn new(
        tokenizer: &'a dyn Tokenizer,
        client: &'a dyn TranslationClient,
        prices: &'a PriceTable,
        options: ChunkingOptions,
    ) -> Self {
        Self {
            tokenizer,
            client,
            prices,
            options,
        }
    }

    pub fn options(&self) -> &ChunkingOptions {
        &self.options
    }

    /// Split a document into units and stitch them into batches
    pub fn prepare_batches(&self, document: &str) -> Result<Vec<Batch>, TranslationError> {
        let splitter = ChunkSplitter::new(self.tokenizer, self.options.hard_max_len, &self.options.delimiter);
        let units = splitter.split(document)?;

        if let Some(unit) = units.iter().find(|u| u.token_count > self.options.hard_max_len) {
            return Err(TranslationError::Invariant(format!(
                "unit of {} tokens exceeds the hard limit of {}",
                unit.token_count, self.options.hard_max_len
            )));
        }

        let stitcher = OverlapStitcher::new(
            self.tokenizer,
            self.options.max_len,
            self.options.overlap_len,
            &self.options.delimiter,
        );
        let batches = stitcher.stitch(&units)?;

        debug!("Prepared {} units into {} batches", units.len(), batches.len());
        Ok(batches)
    }

    /// Translate a document
    ///
    /// `progress` is called after every batch with the number of batches done
    /// and the number scheduled.
    pub async fn run<F>(&self, document: &str, job: &TranslationJob, progress: F) -> Result<TranslationOutcome, TranslationError>
    where
        F: Fn(usize, usize),
    {
        let mut batches = self.prepare_batches(document)?;
        let available = batches.len();
        if let Some(cap) = job.num_pages {
            batches.truncate(cap);
        }
        let total = batches.len();

        info!(
            "Translating {} of {} batches into {} with {}",
            total, available, job.dest_language, job.model
        );

        let target = TranslationTarget::new(job.dest_language.clone(), job.model.clone());
        let mut ledger = UsageLedger::new(job.model.clone());
        let mut translated: Vec<String> = Vec::with_capacity(total);

        for batch in batches {
            let position = batch.index + 1;
            if batch.is_blank() {
                debug!("Batch {}/{} is blank, skipping translation call", position, total);
                ledger.record(0, 0, Duration::ZERO);
                translated.push(String::new());
                progress(position, total);
                continue;
            }

            let input_tokens = self.tokenizer.count_tokens(&batch.text())?;

            let started = Instant::now();
            let result = self.client.translate(batch, &target).await
                .map_err(|source| TranslationError::BatchFailed {
                    index: position,
                    total,
                    source,
                })?;
            let elapsed = started.elapsed();

            ledger.record(input_tokens, result.output_tokens, elapsed);
            info!(
                "Batch {}/{} translated: {} input tokens, {} output tokens in {:.2}s",
                position, total, input_tokens, result.output_tokens, elapsed.as_secs_f64()
            );

            translated.push(result.text);
            progress(position, total);
        }

        let translated_text = Assembler::new(&self.options.delimiter).assemble(&translated);
        let usage = ledger.report(self.prices);

        info!(
            "Translation complete: {} input tokens, {} output tokens, cost {}",
            usage.input_tokens,
            usage.output_tokens,
            usage.formatted_cost()
        );

        Ok(TranslationOutcome { translated_text, usage })
    }
}
