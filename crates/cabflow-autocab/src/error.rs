use thiserror::Error;

/// Errors returned by the AUTOCAB API client.
#[derive(Debug, Error)]
pub enum AutocabError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The booking does not exist (HTTP 404).
    #[error("booking {0} not found")]
    NotFound(i64),

    /// The update was rejected as a concurrency conflict (HTTP 406).
    #[error("update conflict for booking {0} (HTTP 406)")]
    Conflict(i64),

    /// Any other non-2xx response; `body` is truncated for diagnostics.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The extracted record is missing a field the submission schema requires.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
}
