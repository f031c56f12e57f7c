use std::collections::HashMap;

use tokio::sync::mpsc;

use tally_command::{ExtractionProvider, PipelineConfig};
use tally_command_interface::TextFragment;

use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::session::SessionHandle;

/// Session-keyed registry of pipelines. Each session owns its own
/// accumulator state; there is no shared mutable state between sessions
/// beyond the read-only config.
pub struct SessionManager {
    sessions: HashMap<String, SessionHandle>,
    config: PipelineConfig,
    event_tx: mpsc::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(config: PipelineConfig, event_tx: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
            event_tx,
        }
    }

    /// Opens a session. Reopening an existing id first closes the old
    /// session: its queued fragments finish and its `sessionClosed` event
    /// is emitted before this returns, so consumers never see a close for
    /// an id the manager still reports open.
    pub async fn open(
        &mut self,
        session_id: impl Into<String>,
        provider: Box<dyn ExtractionProvider>,
    ) {
        let session_id = session_id.into();
        if let Some(previous) = self.sessions.remove(&session_id) {
            tracing::debug!(session_id = %session_id, "session_replaced");
            previous.close().await;
        }
        let handle = SessionHandle::spawn(
            session_id.clone(),
            provider,
            self.config,
            self.event_tx.clone(),
        );
        self.sessions.insert(session_id, handle);
    }

    pub async fn feed(
        &self,
        session_id: &str,
        fragment: TextFragment,
    ) -> Result<(), SessionError> {
        let handle = self
            .sessions
            .get(session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
        handle.feed(fragment).await
    }

    /// Closes a session, waiting for already-queued fragments to finish.
    pub async fn close(&mut self, session_id: &str) -> Result<(), SessionError> {
        let handle = self
            .sessions
            .remove(session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.to_string()))?;
        handle.close().await;
        Ok(())
    }

    pub fn is_open(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
