//! Error handling for the call engine
//!
//! Every request-path error here reduces to a failed token completion at the
//! service boundary; none of them are retried automatically and none abort
//! the engine.

use thiserror::Error;

/// Result type alias for call-engine operations
pub type CallResult<T> = std::result::Result<T, CallError>;

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Errors a call-control request can fail with
#[derive(Error, Debug)]
pub enum CallError {
    /// Every call slot is occupied
    #[error("No free call slot")]
    CapacityExceeded,

    /// Another request is already outstanding on the targeted call
    #[error("Another request is outstanding on this call")]
    Busy,

    /// The request named a call or slot that does not exist
    #[error("{what} not found")]
    NotFound { what: &'static str },

    /// A confirmation carried a nonzero cause code
    #[error("Modem rejected the request with cause {cause}")]
    ModemRejected { cause: u32 },

    /// The request payload was too short or otherwise invalid
    #[error("Malformed request: {details}")]
    MalformedInput { details: String },

    /// The modem link refused the outbound message
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
}

/// Errors crossing the modem transport boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The link to the modem is gone
    #[error("Modem link closed")]
    Closed,

    /// The link rejected or failed to deliver a message
    #[error("Send failed: {reason}")]
    Send { reason: String },
}
