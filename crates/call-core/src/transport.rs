//! Outbound seams toward the modem
//!
//! The engine emits two kinds of traffic: typed call-control commands, which
//! the device layer encodes into its hardware-specific layout, and already
//! framed protocol-class envelopes. Both seams are traits so tests and
//! device backends can plug in freely.

use async_trait::async_trait;
use modemlink_proto_core::Envelope;

use crate::error::TransportResult;
use crate::types::{CallId, CallType, PhoneNumber};

/// Typed call-control command handed to the device layer for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallCommand {
    /// Originate a call
    Setup {
        number: PhoneNumber,
        call_type: CallType,
    },
    /// Release (hang up or reject) a call
    Release {
        call_type: CallType,
        call_id: CallId,
        cause: u32,
    },
    /// Accept an incoming or waiting call
    Answer {
        call_type: CallType,
        call_id: CallId,
    },
    /// Put a call in the background
    Hold { call_id: CallId },
    /// Bring a held call to the foreground
    Activate { call_id: CallId },
    /// Exchange the foreground and background calls
    Swap { active_id: CallId, held_id: CallId },
    /// Begin playing a DTMF tone on a connected call
    StartDtmf { call_id: CallId, tone: char },
    /// Stop the currently playing DTMF tone
    StopDtmf { call_id: CallId },
}

/// Framed-message side of the modem link
#[async_trait]
pub trait ModemTransport: Send + Sync {
    async fn send_frame(&self, frame: Envelope) -> TransportResult<()>;
}

/// Call-command side of the modem link
#[async_trait]
pub trait CommandOutbox: Send + Sync {
    async fn send_command(&self, command: CallCommand) -> TransportResult<()>;
}
