//! Error types for the policy server client.
//!
//! # Design
//! The status-derived kinds (`NotFound`, `BadRequest`, `WriteConflict`,
//! `StreamingNotImplemented`) each get a dedicated variant because the same
//! status code maps to different kinds depending on the operation, so
//! callers match on the kind, not on a status code. Statuses an operation does not
//! classify land in `ServerError` with the raw status and body for
//! debugging. Transport failures and malformed success bodies are kept
//! distinct from every status-derived kind.

use thiserror::Error;

/// A network-level failure: connection refused, DNS, TLS handshake,
/// timeout, invalid URL. Carries the underlying cause; no status code was
/// ever received.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    pub fn new(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        TransportError(cause.into())
    }
}

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The addressed resource (policy id, document path) does not exist.
    #[error("not found")]
    NotFound,

    /// The server rejected the request content.
    #[error("bad request")]
    BadRequest,

    /// A conditional document overwrite could not be applied.
    #[error("write conflict")]
    WriteConflict,

    /// The server declined a streaming/watch request it does not support.
    #[error("streaming not implemented")]
    StreamingNotImplemented,

    /// Any status the operation does not explicitly classify.
    #[error("server error: HTTP {status}: {body}")]
    ServerError { status: u16, body: String },

    /// The request never completed at the network level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A success-path body could not be decoded into the expected shape.
    #[error("response decoding failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request payload could not be encoded to JSON.
    #[error("request encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}
