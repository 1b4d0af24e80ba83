//! One submission run through the fixed log-and-charge protocol.
//!
//! Both cadences funnel every turn through [`TurnProcessor::process`], which
//! is the only place the ledger, estimator, and parser meet. Session failures
//! are absorbed here as log entries; they never propagate to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::budget::{CostEstimator, Ledger, LogOrigin, TransferParser};
use crate::session::{AgentSession, ChunkSource};

/// Cooperative cancellation flag checked between chunks.
///
/// Clones share the flag. The autonomous cadence holds one per run and trips
/// it on stop; the foreground path passes a fresh token so operator commands
/// always stream to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Turns in flight abandon their remaining chunks.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether the token has been tripped.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Drives one turn: append, submit, then account for every chunk.
#[derive(Debug, Clone)]
pub struct TurnProcessor {
    ledger: Ledger,
    estimator: CostEstimator,
    parser: TransferParser,
    eth_rate: f64,
}

impl TurnProcessor {
    /// Create a processor writing into the given ledger.
    pub fn new(ledger: Ledger, estimator: CostEstimator, eth_rate: f64) -> Self {
        Self {
            ledger,
            estimator,
            parser: TransferParser::new(),
            eth_rate,
        }
    }

    /// Submit `text` to the session and account for the whole reply.
    ///
    /// The submission is logged under `origin` and, once the backend accepts
    /// it, charged at the status divisor for [`LogOrigin::System`] turns and
    /// the message divisor otherwise. Each streamed chunk is logged, credited
    /// when it reports a verified transfer, and charged at the message
    /// divisor. A tripped `cancel` token abandons the remaining chunks
    /// without recording anything further.
    ///
    /// If the submission itself is rejected, an error entry is logged and no
    /// charge is made. A failure mid-stream logs an error entry and keeps the
    /// accounting already done.
    pub async fn process(
        &self,
        session: &dyn AgentSession,
        text: &str,
        origin: LogOrigin,
        cancel: &CancelToken,
    ) {
        self.ledger.record(origin, text);

        let mut chunks = match session.submit(text).await {
            Ok(chunks) => chunks,
            Err(error) => {
                warn!(%error, "submission rejected by session");
                self.ledger.record(LogOrigin::Error, error.to_string());
                return;
            }
        };

        let submission_cost = match origin {
            LogOrigin::System => self.estimator.status_cost(text),
            _ => self.estimator.message_cost(text),
        };
        self.ledger.charge(submission_cost);
        debug!(?origin, cost = submission_cost, "submission charged");

        while let Some(item) = chunks.recv().await {
            if cancel.is_cancelled() {
                debug!("turn cancelled, abandoning remaining chunks");
                return;
            }
            match item {
                Ok(chunk) => {
                    let chunk_origin = match chunk.source {
                        ChunkSource::Agent => LogOrigin::Agent,
                        ChunkSource::Tool => LogOrigin::Tool,
                    };
                    self.ledger.record(chunk_origin, chunk.text.clone());
                    if let Some(amount) = self.parser.extract(&chunk.text) {
                        let credit = amount * self.eth_rate;
                        debug!(amount, credit, "transfer phrase credited");
                        self.ledger.credit(credit);
                    }
                    self.ledger.charge(self.estimator.message_cost(&chunk.text));
                }
                Err(error) => {
                    warn!(%error, "session failed mid-stream");
                    self.ledger.record(LogOrigin::Error, error.to_string());
                    return;
                }
            }
        }
    }
}
