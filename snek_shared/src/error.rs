//! Error taxonomy.
//!
//! Every error here is fatal to the session that produced it. The session
//! driver moves the game state to `Fatal` and hands the error to its caller;
//! nothing is retried or skipped.

use thiserror::Error;

use crate::state::ConnectionState;

/// Faults in the local runtime or in values negotiated at connect time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigFault {
    /// The native store of `0xABCD` produced neither byte order.
    #[error("indeterminate native byte order: probe read {0:02X?}")]
    IndeterminateByteOrder([u8; 2]),

    /// Width outside {1, 2, 4, 8}.
    #[error("unsupported coordinate width: {0} bytes")]
    UnsupportedWidth(u8),
}

/// Malformed or out-of-order server messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("truncated metadata frame: need {need} bytes, got {got}")]
    TruncatedMetadata { need: usize, got: usize },

    #[error("truncated tick frame: need {need} bytes, got {got}")]
    TruncatedTick { need: usize, got: usize },

    #[error("truncated score message: need 4 bytes, got {got}")]
    TruncatedScore { got: usize },

    /// An integer field shorter than the negotiated width.
    #[error("short integer: need {need} bytes, got {got}")]
    ShortInteger { need: usize, got: usize },

    /// `numPoints` whose byte size does not fit in memory arithmetic.
    #[error("tick frame too large: {points} points")]
    FrameTooLarge { points: u32 },

    #[error("unexpected message in phase {phase:?}")]
    UnexpectedPhase { phase: ConnectionState },
}

/// Failures of the underlying message channel.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("invalid server url {url:?}")]
    InvalidUrl { url: String },

    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Anything that ends a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigFault),

    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// True when the error came from the wire contents rather than the channel.
    pub fn is_protocol(&self) -> bool {
        matches!(self, SessionError::Protocol(_))
    }
}

/// Result type for session-level operations.
pub type SessionResult<T> = Result<T, SessionError>;
