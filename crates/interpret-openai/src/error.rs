#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("response has no content")]
    MissingContent,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
