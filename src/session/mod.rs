//! The opaque conversational session and its bootstrap.
//!
//! The loop never talks to a model backend directly. It drives an
//! [`AgentSession`]: one long-lived, statefully threaded conversation that
//! accepts a submitted turn and streams back output chunks. What happens
//! inside a turn (reasoning, tool calls, trades) is the backend's business;
//! the only contract is the chunk stream and a terminal error signal.
//!
//! Sessions are created once per process by a [`SessionProvider`], which may
//! import previously persisted wallet material and always exports the blob to
//! persist for next time.

mod wallet;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

pub use wallet::{SessionInitError, SessionInitResult, WalletStore};

/// Which side of the conversation produced a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSource {
    /// The agent's own reply text.
    Agent,
    /// Output of a tool invocation the agent made.
    Tool,
}

/// One incremental unit of output for a submitted turn.
///
/// Chunks are transient: they exist to be logged and charged, nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkEvent {
    /// Who produced the text.
    pub source: ChunkSource,
    /// The chunk text.
    pub text: String,
}

impl ChunkEvent {
    /// Chunk of agent reply text.
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            source: ChunkSource::Agent,
            text: text.into(),
        }
    }

    /// Chunk of tool output.
    pub fn tool(text: impl Into<String>) -> Self {
        Self {
            source: ChunkSource::Tool,
            text: text.into(),
        }
    }
}

/// Failure of a live session while handling one submitted turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The backend transport failed (network, protocol, internal state).
    #[error("session transport failed: {0}")]
    Transport(String),

    /// The session went away before finishing a reply.
    #[error("session disconnected before finishing a reply")]
    Disconnected,
}

/// Channel end delivering the chunk sequence for one submission.
///
/// Chunks arrive incrementally; a session failure is delivered as a single
/// `Err` item after which the channel closes.
pub type ChunkReceiver = mpsc::Receiver<Result<ChunkEvent, SessionError>>;

/// Capability interface for the long-lived conversation.
///
/// Implementations must keep conversational state across calls so that
/// successive submissions land in the same thread of context. The handle is
/// shared by both cadences and is never reconstructed mid-run.
#[async_trait]
pub trait AgentSession: Send + Sync {
    /// Submit one turn of text and obtain its lazy chunk sequence.
    ///
    /// An `Err` here means the submission itself never reached the backend;
    /// failures after submission arrive as the terminal item of the stream.
    async fn submit(&self, text: &str) -> Result<ChunkReceiver, SessionError>;
}

/// A freshly bound session plus the credential blob to persist.
#[derive(Clone)]
pub struct BoundSession {
    /// The live conversation handle.
    pub session: Arc<dyn AgentSession>,
    /// Opaque wallet material exported by the provider, written back verbatim.
    pub wallet_data: String,
}

/// Factory capability for binding the session at startup.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Establish the long-lived conversation.
    ///
    /// `wallet_data` carries previously persisted credential material when
    /// the well-known file existed; `None` asks the provider for a fresh
    /// wallet. Either way the returned blob is what gets persisted.
    async fn connect(&self, wallet_data: Option<String>) -> SessionInitResult<BoundSession>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted fakes for exercising the loop without a real backend.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Plays back pre-scripted chunk sequences, one per submission.
    ///
    /// When the per-submission scripts run out, the fallback script is
    /// replayed for every further submission (handy for the looping cadence).
    pub(crate) struct ScriptedSession {
        turns: Mutex<VecDeque<Vec<Result<ChunkEvent, SessionError>>>>,
        fallback: Vec<Result<ChunkEvent, SessionError>>,
        chunk_delay: Duration,
        submit_error: Option<SessionError>,
        submitted: Mutex<Vec<String>>,
    }

    impl ScriptedSession {
        pub(crate) fn new() -> Self {
            Self {
                turns: Mutex::new(VecDeque::new()),
                fallback: Vec::new(),
                chunk_delay: Duration::ZERO,
                submit_error: None,
                submitted: Mutex::new(Vec::new()),
            }
        }

        /// Session whose every submission fails outright.
        pub(crate) fn refusing(error: SessionError) -> Self {
            let mut session = Self::new();
            session.submit_error = Some(error);
            session
        }

        /// Queue the chunk sequence for the next submission.
        pub(crate) fn with_turn(self, chunks: Vec<Result<ChunkEvent, SessionError>>) -> Self {
            self.turns.lock().expect("turns lock").push_back(chunks);
            self
        }

        /// Chunk sequence replayed once the queued turns are exhausted.
        pub(crate) fn with_fallback(
            mut self,
            chunks: Vec<Result<ChunkEvent, SessionError>>,
        ) -> Self {
            self.fallback = chunks;
            self
        }

        /// Delay inserted before each chunk is delivered.
        pub(crate) fn with_chunk_delay(mut self, delay: Duration) -> Self {
            self.chunk_delay = delay;
            self
        }

        /// Texts submitted so far, in order.
        pub(crate) fn submissions(&self) -> Vec<String> {
            self.submitted.lock().expect("submissions lock").clone()
        }
    }

    #[async_trait]
    impl AgentSession for ScriptedSession {
        async fn submit(&self, text: &str) -> Result<ChunkReceiver, SessionError> {
            self.submitted
                .lock()
                .expect("submissions lock")
                .push(text.to_string());

            if let Some(error) = &self.submit_error {
                return Err(error.clone());
            }

            let script = self
                .turns
                .lock()
                .expect("turns lock")
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            let delay = self.chunk_delay;

            let (tx, rx) = mpsc::channel(16);
            tokio::spawn(async move {
                for item in script {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    if tx.send(item).await.is_err() {
                        break;
                    }
                }
            });
            Ok(rx)
        }
    }

    /// Provider handing out a pre-built scripted session.
    pub(crate) struct ScriptedProvider {
        session: Arc<ScriptedSession>,
        wallet_export: String,
        reject: Option<String>,
        connects: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(session: Arc<ScriptedSession>, wallet_export: impl Into<String>) -> Self {
            Self {
                session,
                wallet_export: wallet_export.into(),
                reject: None,
                connects: Mutex::new(Vec::new()),
            }
        }

        /// Provider that refuses every bootstrap attempt.
        pub(crate) fn rejecting(reason: impl Into<String>) -> Self {
            let mut provider = Self::new(Arc::new(ScriptedSession::new()), "");
            provider.reject = Some(reason.into());
            provider
        }

        /// Wallet material passed to each `connect` call, in call order.
        pub(crate) fn connect_history(&self) -> Vec<Option<String>> {
            self.connects.lock().expect("connects lock").clone()
        }
    }

    #[async_trait]
    impl SessionProvider for ScriptedProvider {
        async fn connect(&self, wallet_data: Option<String>) -> SessionInitResult<BoundSession> {
            self.connects
                .lock()
                .expect("connects lock")
                .push(wallet_data);
            if let Some(reason) = &self.reject {
                return Err(SessionInitError::Provider(reason.clone()));
            }
            Ok(BoundSession {
                session: Arc::clone(&self.session) as Arc<dyn AgentSession>,
                wallet_data: self.wallet_export.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedSession;
    use super::*;

    #[test]
    fn test_chunk_constructors_tag_source() {
        let agent = ChunkEvent::agent("thinking");
        let tool = ChunkEvent::tool("swap executed");
        assert_eq!(agent.source, ChunkSource::Agent);
        assert_eq!(tool.source, ChunkSource::Tool);
        assert_eq!(tool.text, "swap executed");
    }

    #[test]
    fn test_scripted_session_streams_chunks_in_order() {
        tokio_test::block_on(async {
            let session = ScriptedSession::new().with_turn(vec![
                Ok(ChunkEvent::agent("first")),
                Ok(ChunkEvent::tool("second")),
            ]);

            let mut rx = session.submit("go").await.expect("submit");
            let first = rx.recv().await.expect("first").expect("chunk");
            let second = rx.recv().await.expect("second").expect("chunk");
            assert_eq!(first.text, "first");
            assert_eq!(second.text, "second");
            // Stream terminates after the scripted chunks.
            assert!(rx.recv().await.is_none());
            assert_eq!(session.submissions(), vec!["go".to_string()]);
        });
    }

    #[test]
    fn test_scripted_session_delivers_terminal_error() {
        tokio_test::block_on(async {
            let session = ScriptedSession::new().with_turn(vec![
                Ok(ChunkEvent::agent("partial")),
                Err(SessionError::Disconnected),
            ]);

            let mut rx = session.submit("go").await.expect("submit");
            assert!(rx.recv().await.expect("first").is_ok());
            let terminal = rx.recv().await.expect("terminal");
            assert_eq!(terminal, Err(SessionError::Disconnected));
            assert!(rx.recv().await.is_none());
        });
    }

    #[test]
    fn test_refusing_session_fails_submission() {
        tokio_test::block_on(async {
            let session =
                ScriptedSession::refusing(SessionError::Transport("connection reset".into()));
            let err = session.submit("go").await.expect_err("should refuse");
            assert_eq!(err, SessionError::Transport("connection reset".into()));
        });
    }

    #[test]
    fn test_session_error_messages() {
        let transport = SessionError::Transport("timeout".into());
        assert!(transport.to_string().contains("timeout"));
        assert!(SessionError::Disconnected
            .to_string()
            .contains("disconnected"));
    }
}
