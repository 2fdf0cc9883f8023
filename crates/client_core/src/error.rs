use thiserror::Error;

pub const FETCH_RETRYING_MESSAGE: &str = "Something went wrong... Retrying";
pub const FETCH_GAVE_UP_MESSAGE: &str = "Something went wrong... Giving up";
pub const ADD_FAILED_MESSAGE: &str = "Failed to add movie";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete movie";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("remote store answered with status {status}")]
    Http { status: u16 },
    #[error("malformed response body: {0}")]
    Parse(String),
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
}

impl StoreError {
    /// Parse failures are reported like transport failures; only the remote
    /// status is worth distinguishing in logs.
    pub fn is_transport_like(&self) -> bool {
        matches!(self, StoreError::Transport(_) | StoreError::Parse(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            StoreError::Http {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            StoreError::Parse(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        StoreError::InvalidUrl(err.to_string())
    }
}
