#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
    #[error("session closed: {0}")]
    Closed(String),
}
