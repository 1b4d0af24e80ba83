//! Run state and the public command surface.
//!
//! # Overview
//!
//! [`TraderRuntime`] is the single object a front end holds. It owns the
//! ledger, binds the agent session lazily on first use (importing and
//! persisting wallet material around the bind), and exposes the four
//! operations a display layer may call: start and stop the autonomous
//! cadence, submit a foreground command, and take a snapshot of balance plus
//! log.
//!
//! Both cadences run against the same ledger and the same session handle;
//! everything else is private to the runtime.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use solvent::config::TraderConfig;
//! use solvent::runtime::TraderRuntime;
//!
//! let runtime = TraderRuntime::new(TraderConfig::load(), Arc::new(provider));
//!
//! runtime.start_autonomous().await?;
//! runtime.submit_command("summarize the open positions").await?;
//!
//! let snapshot = runtime.snapshot();
//! println!("balance: {}", snapshot.balance);
//!
//! runtime.stop_autonomous();
//! ```

pub mod autopilot;
pub mod turn;

pub use autopilot::{status_message, Autopilot};
pub use turn::{CancelToken, TurnProcessor};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::info;

use crate::budget::{CostEstimator, Ledger, LogEntry, LogOrigin};
use crate::config::TraderConfig;
use crate::session::{AgentSession, SessionInitResult, SessionProvider, WalletStore};

/// Point-in-time view handed to the display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    /// Current balance in budget units. May be negative.
    pub balance: f64,
    /// Full conversation log in append order.
    pub log: Vec<LogEntry>,
}

/// The budget-accounting loop behind the command surface.
pub struct TraderRuntime {
    config: TraderConfig,
    ledger: Ledger,
    processor: TurnProcessor,
    provider: Arc<dyn SessionProvider>,
    /// Bound lazily on the first operation that needs the backend.
    session: OnceCell<Arc<dyn AgentSession>>,
    autopilot: Autopilot,
}

impl TraderRuntime {
    /// Create a runtime with the default token-count heuristic.
    pub fn new(config: TraderConfig, provider: Arc<dyn SessionProvider>) -> Self {
        let estimator = CostEstimator::new(config.status_divisor, config.message_divisor);
        Self::with_estimator(config, provider, estimator)
    }

    /// Create a runtime with a custom cost estimator.
    ///
    /// Lets embedders plug in a real model tokenizer in place of the
    /// character heuristic.
    pub fn with_estimator(
        config: TraderConfig,
        provider: Arc<dyn SessionProvider>,
        estimator: CostEstimator,
    ) -> Self {
        let ledger = Ledger::new(config.opening_balance);
        let processor = TurnProcessor::new(ledger.clone(), estimator, config.eth_rate);
        let autopilot = Autopilot::new(config.clone(), ledger.clone(), processor.clone());
        Self {
            config,
            ledger,
            processor,
            provider,
            session: OnceCell::new(),
            autopilot,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    /// Current balance in budget units.
    pub fn balance(&self) -> f64 {
        self.ledger.balance()
    }

    /// Start the autonomous cadence, binding the session first if needed.
    ///
    /// Returns `Ok(false)` when a run is already active (including one still
    /// draining after a stop). Fails only on session bootstrap, which leaves
    /// the runtime idle and retryable.
    pub async fn start_autonomous(&self) -> SessionInitResult<bool> {
        let session = self.bind_session().await?;
        Ok(self.autopilot.start(session).await)
    }

    /// Signal the autonomous cadence to stop. Non-blocking; see
    /// [`Autopilot::stop`].
    pub fn stop_autonomous(&self) {
        self.autopilot.stop();
    }

    /// Whether an autonomous run is currently alive.
    pub async fn is_autonomous_running(&self) -> bool {
        self.autopilot.is_running().await
    }

    /// Run one operator command through the session and account for it.
    ///
    /// Safe to call while the autonomous cadence is running; the ledger
    /// serializes the accounting. The foreground turn always streams to
    /// completion, so it gets a token nothing ever trips.
    pub async fn submit_command(&self, text: &str) -> SessionInitResult<()> {
        let session = self.bind_session().await?;
        self.processor
            .process(session.as_ref(), text, LogOrigin::User, &CancelToken::new())
            .await;
        Ok(())
    }

    /// Balance and log captured consistently for display.
    pub fn snapshot(&self) -> RuntimeSnapshot {
        let (balance, log) = self.ledger.export();
        RuntimeSnapshot { balance, log }
    }

    /// Bind the session on first use, importing and persisting wallet
    /// material around the provider call.
    ///
    /// A missing wallet file means a fresh session; any other read error,
    /// a provider rejection, or a failure to persist the exported blob is
    /// fatal and leaves the cell empty so a later call can retry.
    async fn bind_session(&self) -> SessionInitResult<Arc<dyn AgentSession>> {
        let session = self
            .session
            .get_or_try_init(|| async {
                let store = WalletStore::new(self.config.wallet_path.clone());
                let wallet_data = store.load()?;
                let imported = wallet_data.is_some();
                let bound = self.provider.connect(wallet_data).await?;
                store.save(&bound.wallet_data)?;
                info!(imported, wallet = %store.path().display(), "agent session bound");
                Ok(bound.session)
            })
            .await?;
        Ok(Arc::clone(session))
    }
}
