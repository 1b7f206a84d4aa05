//! Errors raised by the remote fetcher

/// Message shown to the user whenever the finance API cannot be reached or
/// understood. The underlying cause stays in [`std::error::Error::source`].
pub const NETWORK_ERROR_MESSAGE: &str = "Falha ao buscar os dados na internet :(";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Falha ao buscar os dados na internet :(")]
    Request(#[source] reqwest::Error),

    #[error("Falha ao buscar os dados na internet :(")]
    Status {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("Falha ao buscar os dados na internet :(")]
    Decode(#[source] serde_json::Error),
}

impl FetchError {
    /// One-line description of the underlying cause, for logs only.
    pub fn cause(&self) -> String {
        match self {
            FetchError::Request(e) => format!("request failed: {e}"),
            FetchError::Status { status, .. } => format!("unexpected HTTP status {status}"),
            FetchError::Decode(e) => format!("malformed response body: {e}"),
        }
    }
}
