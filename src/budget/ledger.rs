//! Balance and event-log accounting.
//!
//! The ledger is the single shared mutable surface between the autonomous
//! cadence and the foreground command path. Every mutation takes the internal
//! lock for the duration of one read-modify-write, so a charge from one
//! cadence can never tear a credit from the other.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin tag for a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOrigin {
    /// A message typed by the human operator.
    User,
    /// A synthesized status message from the autonomous cadence.
    System,
    /// Output produced by the agent itself.
    Agent,
    /// Output produced by one of the agent's tools.
    Tool,
    /// A failure recorded in place of normal output.
    Error,
}

impl LogOrigin {
    /// Display label for the origin.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOrigin::User => "User",
            LogOrigin::System => "System",
            LogOrigin::Agent => "Agent",
            LogOrigin::Tool => "Tool",
            LogOrigin::Error => "Error",
        }
    }
}

/// One immutable line of conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when the entry was appended.
    pub recorded_at: DateTime<Utc>,
    /// Who produced the text.
    pub origin: LogOrigin,
    /// The recorded text itself.
    pub text: String,
}

impl LogEntry {
    /// Create a new entry with the current timestamp.
    pub fn new(origin: LogOrigin, text: impl Into<String>) -> Self {
        Self {
            recorded_at: Utc::now(),
            origin,
            text: text.into(),
        }
    }
}

/// Point-in-time view of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Current balance in budget units. May be negative.
    pub balance: f64,
    /// Number of log entries appended so far.
    pub entries: usize,
}

#[derive(Debug)]
struct LedgerState {
    balance: f64,
    log: Vec<LogEntry>,
}

/// Thread-safe owner of the budget balance and the append-only log.
///
/// Cloning the ledger shares the underlying state; both cadences hold clones
/// of the same ledger. Charges and credits never fail: a depleted balance is
/// a valid observable state, not an error.
#[derive(Debug, Clone)]
pub struct Ledger {
    inner: Arc<Mutex<LedgerState>>,
}

impl Ledger {
    /// Create a ledger with the given opening balance and an empty log.
    pub fn new(opening_balance: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LedgerState {
                balance: opening_balance,
                log: Vec::new(),
            })),
        }
    }

    /// Subtract a non-negative amount from the balance.
    ///
    /// Negative (or NaN) amounts are treated as zero. The balance is allowed
    /// to go below zero.
    pub fn charge(&self, amount: f64) {
        let amount = amount.max(0.0);
        if let Ok(mut state) = self.inner.lock() {
            state.balance -= amount;
        }
    }

    /// Add a non-negative amount to the balance.
    ///
    /// Negative (or NaN) amounts are treated as zero.
    pub fn credit(&self, amount: f64) {
        let amount = amount.max(0.0);
        if let Ok(mut state) = self.inner.lock() {
            state.balance += amount;
        }
    }

    /// Append one log entry, stamped with the current time.
    pub fn record(&self, origin: LogOrigin, text: impl Into<String>) {
        let entry = LogEntry::new(origin, text);
        if let Ok(mut state) = self.inner.lock() {
            state.log.push(entry);
        }
    }

    /// Current balance in budget units.
    pub fn balance(&self) -> f64 {
        self.inner.lock().map(|state| state.balance).unwrap_or(0.0)
    }

    /// Balance plus log length in one consistent read.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.inner
            .lock()
            .map(|state| LedgerSnapshot {
                balance: state.balance,
                entries: state.log.len(),
            })
            .unwrap_or(LedgerSnapshot {
                balance: 0.0,
                entries: 0,
            })
    }

    /// Copy of the full log, in append order, for display.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner
            .lock()
            .map(|state| state.log.clone())
            .unwrap_or_default()
    }

    /// Balance and full log captured under one lock acquisition, so the pair
    /// is consistent even while the other cadence is mutating.
    pub fn export(&self) -> (f64, Vec<LogEntry>) {
        self.inner
            .lock()
            .map(|state| (state.balance, state.log.clone()))
            .unwrap_or((0.0, Vec::new()))
    }
}
