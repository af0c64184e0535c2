//! Modem frame envelope and protocol packet codec for modemlink
//!
//! This crate is the pure, stateless wire layer between the call engine and
//! the baseband transport. It knows two things:
//!
//! - the **transport envelope** every modem frame travels in (magic marker,
//!   command class, length, payload), and
//! - the **protocol packet** carried inside protocol-class frames (a small
//!   header naming the message kind and API identifier, followed by an
//!   opaque body).
//!
//! It has no knowledge of call semantics. Call-control commands and
//! indications are typed structures owned by `modemlink-call-core`; only the
//! generic protocol-class messages (startup, network lifecycle) pass through
//! this codec.
//!
//! ```text
//! ┌──────────────┐   ProtoPacket    ┌──────────────┐   Envelope   ┌─────────┐
//! │  call engine │ ───────────────► │  this crate  │ ───────────► │ modem   │
//! │              │ ◄─────────────── │ encode/decode│ ◄─────────── │ link    │
//! └──────────────┘                  └──────────────┘              └─────────┘
//! ```

pub mod envelope;
pub mod error;
pub mod packet;

pub use envelope::{Envelope, FrameClass, FRAME_MAGIC};
pub use error::{Error, Result};
pub use packet::{ProtoHeader, ProtoMessageKind, ProtoPacket, PROTO_HEADER_SIZE};
