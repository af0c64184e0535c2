//! Error handling for the frame and packet codec

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while encoding or decoding modem frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer ended before a complete field could be read
    #[error("Buffer too small: need {required} bytes, got {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// Frame did not start with the expected magic marker
    #[error("Invalid frame magic: 0x{value:08X}")]
    InvalidMagic { value: u32 },

    /// Frame carried a command class this codec does not know
    #[error("Unknown frame class: 0x{value:08X}")]
    UnknownFrameClass { value: u32 },

    /// Protocol packet header named an unrecognized message kind
    #[error("Unknown protocol message kind: {value}")]
    UnknownMessageKind { value: u32 },

    /// Declared payload length disagreed with the bytes on the wire
    #[error("Frame length mismatch: header declares {declared} bytes, payload has {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}
