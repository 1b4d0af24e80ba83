//! Runtime configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Tunables for the accounting loop.
///
/// Values mirror the production deployment; everything is overridable
/// through the builder methods, a `solvent.toml` file, or `SOLVENT_*`
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraderConfig {
    /// Opening balance in budget units.
    pub opening_balance: f64,

    /// Token divisor for the periodic status prompt.
    pub status_divisor: f64,

    /// Token divisor for ordinary messages and output chunks.
    pub message_divisor: f64,

    /// Budget units credited per self-reported ETH transferred.
    pub eth_rate: f64,

    /// Sleep between autonomous turns, in milliseconds.
    pub status_interval_ms: u64,

    /// Where wallet material is persisted between runs.
    pub wallet_path: PathBuf,

    /// Refill address advertised in the status prompt.
    pub funding_address: String,
}

impl Default for TraderConfig {
    fn default() -> Self {
        Self {
            opening_balance: 0.01,        // Seed budget in API units
            status_divisor: 250_000.0,    // Status prompts are cheap per token
            message_divisor: 100_000.0,   // Messages and chunks
            eth_rate: 3142.43,            // Budget units per ETH
            status_interval_ms: 5_000,    // One autonomous turn per 5s
            wallet_path: PathBuf::from("wallet_data.txt"),
            funding_address: "0x9b89Ab98B84f2224f39DCD6AE3Bf".to_string(),
        }
    }
}

impl TraderConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layered load: defaults, then `solvent.toml` in the working directory
    /// if present, then `SOLVENT_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("solvent.toml")
    }

    /// Like [`load`](Self::load) with an explicit file path. The file is
    /// optional; a missing file leaves the other layers in effect.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("SOLVENT").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Set the opening balance.
    pub fn with_opening_balance(mut self, balance: f64) -> Self {
        self.opening_balance = balance;
        self
    }

    /// Set the status-prompt token divisor.
    pub fn with_status_divisor(mut self, divisor: f64) -> Self {
        self.status_divisor = divisor;
        self
    }

    /// Set the message/chunk token divisor.
    pub fn with_message_divisor(mut self, divisor: f64) -> Self {
        self.message_divisor = divisor;
        self
    }

    /// Set the ETH exchange rate.
    pub fn with_eth_rate(mut self, rate: f64) -> Self {
        self.eth_rate = rate;
        self
    }

    /// Set the autonomous sleep interval in milliseconds.
    pub fn with_status_interval_ms(mut self, millis: u64) -> Self {
        self.status_interval_ms = millis;
        self
    }

    /// Set the wallet persistence path.
    pub fn with_wallet_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.wallet_path = path.into();
        self
    }

    /// Set the advertised funding address.
    pub fn with_funding_address(mut self, address: impl Into<String>) -> Self {
        self.funding_address = address.into();
        self
    }

    /// The autonomous sleep interval as a [`Duration`].
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }
}
