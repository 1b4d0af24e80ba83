//! Autonomous budget-accounting loop for self-funding trading agents.
//!
//! Solvent drives an opaque agent session on a fixed cadence while keeping
//! exact books on what the conversation costs. The agent starts with a small
//! API balance; every submitted prompt and every streamed chunk is charged by
//! token volume, and every transfer the agent reports back ("transferred
//! 0.000002 ETH") is credited at a fixed exchange rate. The agent's job is to
//! keep its own balance solvent; this crate's job is to keep the ledger
//! honest and the loop alive.
//!
//! # Overview
//!
//! - [`budget`]: the ledger (balance plus append-only log), cost estimation,
//!   and transfer-phrase parsing
//! - [`session`]: the capability traits for the long-lived agent session and
//!   its wallet bootstrap
//! - [`runtime`]: the turn protocol, the autonomous cadence, and the
//!   [`TraderRuntime`] command surface a front end drives
//! - [`config`]: tunables with file and environment layering
//! - [`telemetry`]: tracing subscriber setup for embedders
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use solvent::{TraderConfig, TraderRuntime};
//!
//! solvent::telemetry::init();
//!
//! let config = TraderConfig::load()?;
//! let runtime = TraderRuntime::new(config, Arc::new(provider));
//!
//! runtime.start_autonomous().await?;
//! runtime.submit_command("report your current holdings").await?;
//!
//! let snapshot = runtime.snapshot();
//! for entry in &snapshot.log {
//!     println!("[{}] {}: {}", entry.recorded_at, entry.origin.as_str(), entry.text);
//! }
//!
//! runtime.stop_autonomous();
//! ```

pub mod budget;
pub mod config;
pub mod runtime;
pub mod session;
pub mod telemetry;

pub use budget::{CostEstimator, Ledger, LogEntry, LogOrigin};
pub use config::TraderConfig;
pub use runtime::{RuntimeSnapshot, TraderRuntime};
pub use session::{
    AgentSession, BoundSession, ChunkEvent, ChunkSource, SessionError, SessionInitError,
    SessionProvider,
};
