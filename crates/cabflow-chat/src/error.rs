use thiserror::Error;

/// Errors from the chat-model collaborator.
///
/// These never reach [`crate::ConversationalExtractor`]'s callers; the
/// extractor resolves every failure to its retry/fallback policy.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion API returned a non-2xx response.
    #[error("chat completion API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The response envelope could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
