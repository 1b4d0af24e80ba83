//! Budget accounting for the trading loop.
//!
//! Every turn the agent takes costs budget in proportion to the text flowing
//! through the session, and every transfer the agent reports back replenishes
//! it. This module owns that arithmetic.
//!
//! # Overview
//!
//! - **Ledger**: the single source of truth for the current balance and the
//!   append-only conversation log, shared by both cadences
//! - **CostEstimator**: turns text into a charge (injectable token counter,
//!   per-context divisors)
//! - **TransferParser**: finds self-reported "transferred N ETH" phrases that
//!   earn a credit
//!
//! # Example
//!
//! ```ignore
//! use solvent::budget::{CostEstimator, Ledger, LogOrigin, TransferParser};
//!
//! let ledger = Ledger::new(0.01);
//! let estimator = CostEstimator::new(250_000.0, 100_000.0);
//! let parser = TransferParser::new();
//!
//! let chunk = "Successfully transferred 0.000002 ETH.";
//! ledger.record(LogOrigin::Agent, chunk);
//! if let Some(amount) = parser.extract(chunk) {
//!     ledger.credit(amount * 3142.43);
//! }
//! ledger.charge(estimator.message_cost(chunk));
//! ```

mod estimator;
mod ledger;
mod parser;

pub use estimator::{CostEstimator, TokenCounter};
pub use ledger::{Ledger, LedgerSnapshot, LogEntry, LogOrigin};
pub use parser::TransferParser;
