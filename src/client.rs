//! Client error types shared across the chat and upload clients.

use thiserror::Error;

/// Errors that can occur during client operations.
///
/// In-band server errors on the chat stream (payloads prefixed `[ERROR]`)
/// are not represented here: the protocol delivers them as ordinary data,
/// so they surface as [`crate::session::StreamUpdate::Error`] items instead.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request could not be constructed or sent.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered the initial request with a non-success status.
    /// No part of the response stream has been read when this is returned.
    #[error("request failed with HTTP status {status}")]
    Transport { status: reqwest::StatusCode },

    /// The response stream ended or failed before the end-of-stream marker.
    /// Updates already emitted remain valid.
    #[error("stream interrupted before end-of-stream marker")]
    Interrupted {
        #[source]
        source: Option<reqwest::Error>,
    },

    /// A complete frame contained invalid UTF-8.
    #[error("invalid UTF-8 in stream: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// Response body could not be parsed as JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server reported a failure in its response body.
    #[error("server error: {0}")]
    Server(String),

    /// The exchange was cancelled through a [`crate::chat::CancelHandle`].
    #[error("stream cancelled")]
    Cancelled,

    /// Invalid client configuration or rejected input.
    #[error("configuration error: {0}")]
    Config(String),
}
