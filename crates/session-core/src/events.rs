use tally_command_interface::{CompletedCommand, PartialCommand};

/// Everything a session surfaces to its consumer. `commandCompleted` is
/// the only actionable variant; `partialUpdate` is live UI feedback and
/// must never reach inventory-update logic.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    #[serde(rename = "partialUpdate")]
    PartialUpdate {
        session_id: String,
        partial: PartialCommand,
    },
    #[serde(rename = "commandCompleted")]
    CommandCompleted {
        session_id: String,
        command: CompletedCommand,
    },
    #[serde(rename = "sessionClosed")]
    SessionClosed { session_id: String },
}
