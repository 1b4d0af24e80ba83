//! The autonomous cadence: status prompt, turn, sleep, repeat.
//!
//! The cadence runs as one spawned task per start. Stopping is a flag store,
//! never a join: a session hung mid-turn stalls only its own task, and the
//! stop caller returns immediately. Each start gets a fresh cancellation
//! token so a draining task from a previous run cannot be revived or confuse
//! a new one.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::budget::{Ledger, LogOrigin};
use crate::config::TraderConfig;
use crate::runtime::turn::{CancelToken, TurnProcessor};
use crate::session::AgentSession;

/// Compose the periodic status prompt for the given balance.
///
/// The text embeds the live balance figure and the standing instructions,
/// stable enough for golden-output matching.
pub fn status_message(balance: f64, funding_address: &str) -> String {
    format!(
        "YOUR CURRENT API BALANCE IS ${balance}. PRINT OUT THIS API BALANCE AT THE \
         BEGINNING OF EACH ACTION. PICK FROM YOUR AVAILABLE TOOLS. YOU ARE ABLE TO \
         MANAGE THAT BALANCE BY TRANSFERRING FUNDS TO THE ADDRESS {funding_address}.\n\n\
         Remember to occasionally reflect on your performance and refine your \
         strategies when needed. Consider what has worked well and what hasn't in \
         your recent actions."
    )
}

/// Owner of the background loop driving periodic status turns.
///
/// One instance lives for the process; each `start` spawns a fresh run. The
/// loop synthesizes a status message from the current balance, runs it
/// through the turn processor under the `System` origin, then sleeps the
/// configured interval. Failed turns are already absorbed as error log
/// entries by the processor, so the cadence simply continues.
#[derive(Debug)]
pub struct Autopilot {
    config: TraderConfig,
    ledger: Ledger,
    processor: TurnProcessor,
    /// Cancellation token for the current run.
    cancel: std::sync::Mutex<CancelToken>,
    /// Handle to the spawned loop task.
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Autopilot {
    /// Create an idle autopilot.
    pub fn new(config: TraderConfig, ledger: Ledger, processor: TurnProcessor) -> Self {
        Self {
            config,
            ledger,
            processor,
            cancel: std::sync::Mutex::new(CancelToken::new()),
            task_handle: Mutex::new(None),
        }
    }

    /// Spawn the loop task. Returns `false` when a run is already active,
    /// including one still draining an in-flight turn after `stop`.
    pub async fn start(&self, session: Arc<dyn AgentSession>) -> bool {
        let mut task = self.task_handle.lock().await;
        if let Some(handle) = task.as_ref() {
            if !handle.is_finished() {
                debug!("start refused, autonomous run still active");
                return false;
            }
        }

        let cancel = CancelToken::new();
        if let Ok(mut current) = self.cancel.lock() {
            *current = cancel.clone();
        }

        let ledger = self.ledger.clone();
        let processor = self.processor.clone();
        let funding_address = self.config.funding_address.clone();
        let interval = self.config.status_interval();

        let handle = tokio::spawn(async move {
            info!("autonomous cadence started");
            loop {
                if cancel.is_cancelled() {
                    break;
                }

                let status = status_message(ledger.balance(), &funding_address);
                processor
                    .process(session.as_ref(), &status, LogOrigin::System, &cancel)
                    .await;

                if cancel.is_cancelled() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
            info!("autonomous cadence stopped");
        });
        *task = Some(handle);
        true
    }

    /// Signal the current run to stop.
    ///
    /// Synchronous and non-blocking: the task exits at its next cancellation
    /// check (between chunks, or after the current sleep elapses). It is
    /// never joined, so a hung session cannot stall the caller.
    pub fn stop(&self) {
        info!("autonomous cadence stop requested");
        if let Ok(cancel) = self.cancel.lock() {
            cancel.cancel();
        }
    }

    /// Whether a spawned run is still alive (possibly draining after stop).
    pub async fn is_running(&self) -> bool {
        let task = self.task_handle.lock().await;
        match task.as_ref() {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }
}
