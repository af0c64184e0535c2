//! Protocol packet layer carried inside protocol-class frames

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::envelope::{Envelope, FrameClass};
use crate::error::{Error, Result};

/// Size of the packet header on the wire: message kind and API id words.
pub const PROTO_HEADER_SIZE: usize = 8;

/// Message kinds understood by the protocol packet layer.
///
/// Only `Startup` is actively exercised; the remaining kinds are recognized
/// so inbound frames can be logged and dropped instead of failing decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ProtoMessageKind {
    Startup = 0,
    Cleanup = 1,
    StartNetwork = 2,
    StopNetwork = 3,
    StartingNetworkInd = 4,
    StartNetworkCnf = 5,
    StartNetworkInd = 6,
    StopNetworkCnf = 7,
    StopNetworkInd = 8,
    SuspendNetworkInd = 9,
    ResumeNetworkInd = 10,
}

impl TryFrom<u32> for ProtoMessageKind {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::Startup),
            1 => Ok(Self::Cleanup),
            2 => Ok(Self::StartNetwork),
            3 => Ok(Self::StopNetwork),
            4 => Ok(Self::StartingNetworkInd),
            5 => Ok(Self::StartNetworkCnf),
            6 => Ok(Self::StartNetworkInd),
            7 => Ok(Self::StopNetworkCnf),
            8 => Ok(Self::StopNetworkInd),
            9 => Ok(Self::SuspendNetworkInd),
            10 => Ok(Self::ResumeNetworkInd),
            other => Err(Error::UnknownMessageKind { value: other }),
        }
    }
}

/// Fixed header preceding every protocol packet body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoHeader {
    /// Message kind discriminator
    pub kind: ProtoMessageKind,
    /// API identifier the modem uses to route the message
    pub api_id: u32,
}

/// One protocol packet: header plus opaque variable-length body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoPacket {
    pub header: ProtoHeader,
    pub body: Bytes,
}

impl ProtoPacket {
    /// Build a packet from its parts
    pub fn new(kind: ProtoMessageKind, api_id: u32, body: Bytes) -> Self {
        Self {
            header: ProtoHeader { kind, api_id },
            body,
        }
    }

    /// The startup message announced to the modem when the engine comes up
    pub fn startup() -> Self {
        Self::new(ProtoMessageKind::Startup, 0, Bytes::new())
    }

    /// Serialized size of header plus body
    pub fn size(&self) -> usize {
        PROTO_HEADER_SIZE + self.body.len()
    }

    /// Encode the packet into a protocol-class envelope
    pub fn encode(&self) -> Envelope {
        let mut buf = BytesMut::with_capacity(self.size());
        buf.put_u32_le(self.header.kind as u32);
        buf.put_u32_le(self.header.api_id);
        buf.put_slice(&self.body);
        Envelope::new(FrameClass::Proto, buf.freeze())
    }

    /// Decode a packet out of a received envelope
    pub fn decode(envelope: &Envelope) -> Result<ProtoPacket> {
        let mut payload = envelope.data.clone();
        if payload.remaining() < PROTO_HEADER_SIZE {
            return Err(Error::BufferTooSmall {
                required: PROTO_HEADER_SIZE,
                available: payload.remaining(),
            });
        }

        let kind = ProtoMessageKind::try_from(payload.get_u32_le())?;
        let api_id = payload.get_u32_le();

        Ok(ProtoPacket {
            header: ProtoHeader { kind, api_id },
            body: payload,
        })
    }
}
