/*!
 * Token usage accounting and cost conversion.
 *
 * `UsageLedger` accumulates token counts per translated batch in encounter
 * order. `PriceTable` maps model names to USD-per-million-token rates and
 * turns the final totals into a cost.
 */

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Price of one model in USD per million tokens
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    /// USD per million prompt tokens
    pub input_per_million: f64,

    /// USD per million completion tokens
    pub output_per_million: f64,
}

impl ModelPrice {
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    pub fn input_per_token(&self) -> f64 {
        self.input_per_million / TOKENS_PER_MILLION
    }

    pub fn output_per_token(&self) -> f64 {
        self.output_per_million / TOKENS_PER_MILLION
    }

    /// Both rates are finite and not negative
    pub fn is_valid(&self) -> bool {
        [self.input_per_million, self.output_per_million]
            .iter()
            .all(|rate| rate.is_finite() && *rate >= 0.0)
    }

    /// Cost of the given token counts at this price
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        input_tokens as f64 * self.input_per_token() + output_tokens as f64 * self.output_per_token()
    }
}

/// Per-model price table with a fallback rate for unknown models
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PriceTable {
    /// Known models
    #[serde(default)]
    pub models: HashMap<String, ModelPrice>,

    /// Rate applied to models missing from `models`
    #[serde(default = "default_price")]
    pub default: ModelPrice,
}

impl PriceTable {
    pub fn new(default: ModelPrice) -> Self {
        Self {
            models: HashMap::new(),
            default,
        }
    }

    /// Add or replace the price of a model
    pub fn with_model(mut self, model: impl Into<String>, price: ModelPrice) -> Self {
        self.models.insert(model.into(), price);
        self
    }

    /// Price for `model`, falling back to the default row
    pub fn price_for(&self, model: &str) -> ModelPrice {
        self.models.get(model).copied().unwrap_or(self.default)
    }

    /// Cost of the given token counts for `model`
    pub fn cost(&self, model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
        self.price_for(model).cost(input_tokens, output_tokens)
    }

    /// Names of rows holding a negative rate
    pub fn invalid_rows(&self) -> Vec<String> {
        let mut rows: Vec<String> = self
            .models
            .iter()
            .filter(|(_, p)| !p.is_valid())
            .map(|(name, _)| name.clone())
            .collect();
        if !self.default.is_valid() {
            rows.push("default".to_string());
        }
        rows.sort();
        rows
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new(default_price())
            .with_model("gpt-4o-mini", ModelPrice::new(0.15, 0.60))
            .with_model("gpt-4o", ModelPrice::new(2.50, 10.00))
            .with_model("o1-mini", ModelPrice::new(3.00, 12.00))
            .with_model("gpt-3.5-turbo", ModelPrice::new(0.50, 1.50))
            .with_model("gpt-4", ModelPrice::new(30.00, 60.00))
            .with_model("claude-3-haiku", ModelPrice::new(0.25, 1.25))
            .with_model("claude-3-5-sonnet", ModelPrice::new(3.00, 15.00))
    }
}

fn default_price() -> ModelPrice {
    ModelPrice::new(30.00, 60.00)
}

/// Running token totals for one translation run
#[derive(Debug, Clone)]
pub struct UsageLedger {
    model: String,
    input_tokens: u64,
    output_tokens: u64,
    batches: usize,
    api_duration: Duration,
}

impl UsageLedger {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input_tokens: 0,
            output_tokens: 0,
            batches: 0,
            api_duration: Duration::ZERO,
        }
    }

    /// Record the usage of one translated batch
    pub fn record(&mut self, input_tokens: usize, output_tokens: usize, elapsed: Duration) {
        self.input_tokens += input_tokens as u64;
        self.output_tokens += output_tokens as u64;
        self.batches += 1;
        self.api_duration += elapsed;
    }

    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Close the ledger into a report priced with `prices`
    pub fn report(self, prices: &PriceTable) -> UsageReport {
        let cost = prices.cost(&self.model, self.input_tokens, self.output_tokens);
        UsageReport {
            model: self.model,
            batches: self.batches,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            total_tokens: self.input_tokens + self.output_tokens,
            cost,
            api_duration: self.api_duration,
        }
    }
}

/// Final usage figures of a translation run
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub model: String,
    pub batches: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    /// USD
    pub cost: f64,
    #[serde(skip)]
    pub api_duration: Duration,
}

impl UsageReport {
    /// Cost formatted as a dollar amount
    pub fn formatted_cost(&self) -> String {
        format!("${:.6}", self.cost)
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        let minutes = self.api_duration.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.total_tokens as f64 / minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token Usage Summary:\n\
             Model: {}\n\
             Batches: {}\n\
             Input tokens: {}\n\
             Output tokens: {}\n\
             Total tokens: {}\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}\n\
             Total cost: {}",
            self.model,
            self.batches,
            self.input_tokens,
            self.output_tokens,
            self.total_tokens,
            self.api_duration.as_secs_f64() / 60.0,
            self.tokens_per_minute(),
            self.formatted_cost()
        )
    }
}
