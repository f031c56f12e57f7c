use tokio::sync::mpsc;

use tally_command::{CommandPipeline, ExtractionProvider, PipelineConfig};
use tally_command_interface::TextFragment;

use crate::error::SessionError;
use crate::events::SessionEvent;

const FRAGMENT_QUEUE_DEPTH: usize = 32;

/// One voice session: a spawned task draining a fragment queue through a
/// [`CommandPipeline`] in strict arrival order.
///
/// The queue gives the serialization the merge-order invariant requires:
/// at most one fragment is interpreted at a time per session, while calls
/// for different sessions overlap freely. Dropping the handle closes the
/// queue; the task finishes the fragments already queued, emits
/// `sessionClosed` and exits, abandoning any pending partial command.
pub struct SessionHandle {
    session_id: String,
    fragment_tx: mpsc::Sender<TextFragment>,
    task: tokio::task::JoinHandle<()>,
}

impl SessionHandle {
    pub fn spawn(
        session_id: impl Into<String>,
        provider: Box<dyn ExtractionProvider>,
        config: PipelineConfig,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let session_id = session_id.into();
        let (fragment_tx, mut fragment_rx) = mpsc::channel::<TextFragment>(FRAGMENT_QUEUE_DEPTH);

        let id = session_id.clone();
        let task = tokio::spawn(async move {
            let mut pipeline = CommandPipeline::with_config(provider, config);

            while let Some(fragment) = fragment_rx.recv().await {
                let update = pipeline.process_fragment(&fragment).await;

                for command in update.completed {
                    let event = SessionEvent::CommandCompleted {
                        session_id: id.clone(),
                        command,
                    };
                    if event_tx.send(event).await.is_err() {
                        return;
                    }
                }

                if let Some(partial) = update.partial {
                    let event = SessionEvent::PartialUpdate {
                        session_id: id.clone(),
                        partial,
                    };
                    if event_tx.send(event).await.is_err() {
                        return;
                    }
                }
            }

            tracing::info!(session_id = %id, "session_closed");
            let _ = event_tx
                .send(SessionEvent::SessionClosed { session_id: id })
                .await;
        });

        Self {
            session_id,
            fragment_tx,
            task,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queues one fragment for interpretation.
    pub async fn feed(&self, fragment: TextFragment) -> Result<(), SessionError> {
        self.fragment_tx
            .send(fragment)
            .await
            .map_err(|_| SessionError::Closed(self.session_id.clone()))
    }

    /// Closes the queue and waits for queued fragments to finish.
    pub async fn close(self) {
        drop(self.fragment_tx);
        let _ = self.task.await;
    }
}
