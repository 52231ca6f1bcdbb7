//! The error taxonomy shared across the workspace.
//!
//! Library code returns `Result<T, NetmapError>`; the two binaries use
//! `anyhow::Error` only at their outermost boot sequence.

use thiserror::Error;

/// A netmap error kind, independent of which component raised it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetmapError {
    /// Missing mandatory record field or malformed body. Surfaces as 400.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Store full on insert of a new id. Surfaces as 400 to the caller.
    #[error("limit exceeded")]
    LimitExceeded,

    /// Dial or command exceeded its deadline.
    #[error("timeout")]
    Timeout,

    /// Other transport error while dialing or running a command.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// RPC call or dial to a peer failed.
    #[error("peer unreachable: {0}")]
    PeerUnreachable(String),

    /// Notifier POST failed. Logged, never retried.
    #[error("downstream forward failed: {0}")]
    DownstreamForwardFailed(String),

    /// Malformed JSON body. Surfaces as 400.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// Opaque failure from a store backend.
    #[error("backend error: {0}")]
    Backend(String),
}

impl NetmapError {
    /// The HTTP status this error kind maps to at the netserver HTTP boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            NetmapError::ValidationFailed(_) => 400,
            NetmapError::LimitExceeded => 400,
            NetmapError::DecodeFailed(_) => 400,
            NetmapError::Timeout => 500,
            NetmapError::ConnectFailed(_) => 500,
            NetmapError::PeerUnreachable(_) => 500,
            NetmapError::DownstreamForwardFailed(_) => 500,
            NetmapError::Backend(_) => 500,
        }
    }
}
