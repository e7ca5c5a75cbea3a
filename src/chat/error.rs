use thiserror::Error;

/// Failures reaching the upstream provider or reading what it sent back
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("upstream transport: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream body is not json: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ChatError {
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Transport(err)
        }
    }
}
