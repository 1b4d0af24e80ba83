//! Turn cost estimation.
//!
//! Charges are proportional to the token volume of text flowing through the
//! session. Exact tokenizers belong to the model backend, so the counter is
//! injectable; the default is a character heuristic (roughly 4 characters per
//! token for English text). Two divisors scale tokens into budget units: the
//! periodic status prompt is cheaper per token than ordinary messages and
//! chunks.

use std::fmt;
use std::sync::Arc;

/// Injectable "measure size of text" function.
pub type TokenCounter = Arc<dyn Fn(&str) -> u64 + Send + Sync>;

/// Estimates the budget cost of text by context.
#[derive(Clone)]
pub struct CostEstimator {
    counter: TokenCounter,
    status_divisor: f64,
    message_divisor: f64,
}

impl fmt::Debug for CostEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostEstimator")
            .field("status_divisor", &self.status_divisor)
            .field("message_divisor", &self.message_divisor)
            .finish()
    }
}

impl CostEstimator {
    /// Create an estimator with the default character-based counter.
    pub fn new(status_divisor: f64, message_divisor: f64) -> Self {
        Self::with_counter(status_divisor, message_divisor, Arc::new(heuristic_tokens))
    }

    /// Create an estimator with a custom token counter.
    pub fn with_counter(status_divisor: f64, message_divisor: f64, counter: TokenCounter) -> Self {
        Self {
            counter,
            status_divisor,
            message_divisor,
        }
    }

    /// Token count for arbitrary text. Deterministic, 0 for empty input.
    pub fn tokens(&self, text: &str) -> u64 {
        (self.counter)(text)
    }

    /// Cost of submitting the periodic status prompt.
    pub fn status_cost(&self, text: &str) -> f64 {
        self.scaled(text, self.status_divisor)
    }

    /// Cost of an ordinary message or output chunk.
    pub fn message_cost(&self, text: &str) -> f64 {
        self.scaled(text, self.message_divisor)
    }

    fn scaled(&self, text: &str, divisor: f64) -> f64 {
        if divisor <= 0.0 {
            return 0.0;
        }
        self.tokens(text) as f64 / divisor
    }
}

/// Default counter: roughly 4 characters per token, at least 1 for non-empty
/// text.
fn heuristic_tokens(text: &str) -> u64 {
    let chars = text.chars().count();
    (chars as f64 / 4.0).ceil() as u64
}
