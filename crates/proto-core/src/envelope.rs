//! Transport envelope wrapping every frame exchanged with the modem

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Magic marker carried by every modem frame.
pub const FRAME_MAGIC: u32 = 0xCAFE_CAFE;

/// Size of the envelope header on the wire: magic, class and length words.
pub const ENVELOPE_HEADER_SIZE: usize = 12;

/// Command class of a modem frame.
///
/// Only the protocol class is meaningful here; the per-device command tables
/// for the other classes live behind the transport boundary, so their frames
/// never reach this codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FrameClass {
    /// Generic protocol-control messages (startup, network lifecycle).
    Proto = 0x0C,
}

impl TryFrom<u32> for FrameClass {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0x0C => Ok(FrameClass::Proto),
            other => Err(Error::UnknownFrameClass { value: other }),
        }
    }
}

/// One framed message on the modem link.
///
/// Wire layout is little-endian: magic marker, command class, payload length
/// in bytes, then the payload itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Command class tag of the payload
    pub class: FrameClass,
    /// Opaque payload bytes
    pub data: Bytes,
}

impl Envelope {
    /// Wrap a payload in an envelope of the given class
    pub fn new(class: FrameClass, data: Bytes) -> Self {
        Self { class, data }
    }

    /// Total serialized size in bytes
    pub fn size(&self) -> usize {
        ENVELOPE_HEADER_SIZE + self.data.len()
    }

    /// Serialize the envelope for the transport
    pub fn serialize(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.size());
        buf.put_u32_le(FRAME_MAGIC);
        buf.put_u32_le(self.class as u32);
        buf.put_u32_le(self.data.len() as u32);
        buf.put_slice(&self.data);
        buf
    }

    /// Parse an envelope from received bytes
    pub fn parse(buf: &mut impl Buf) -> Result<Envelope> {
        if buf.remaining() < ENVELOPE_HEADER_SIZE {
            return Err(Error::BufferTooSmall {
                required: ENVELOPE_HEADER_SIZE,
                available: buf.remaining(),
            });
        }

        let magic = buf.get_u32_le();
        if magic != FRAME_MAGIC {
            return Err(Error::InvalidMagic { value: magic });
        }

        let class = FrameClass::try_from(buf.get_u32_le())?;

        let declared = buf.get_u32_le() as usize;
        if buf.remaining() < declared {
            return Err(Error::LengthMismatch {
                declared,
                actual: buf.remaining(),
            });
        }

        Ok(Envelope {
            class,
            data: buf.copy_to_bytes(declared),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_class_and_payload() {
        let envelope = Envelope::new(FrameClass::Proto, Bytes::from_static(b"\x01\x02\x03"));
        let wire = envelope.serialize();

        let parsed = Envelope::parse(&mut wire.freeze()).unwrap();
        assert_eq!(parsed.class, FrameClass::Proto);
        assert_eq!(&parsed.data[..], b"\x01\x02\x03");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut wire = BytesMut::new();
        wire.put_u32_le(0xDEAD_BEEF);
        wire.put_u32_le(FrameClass::Proto as u32);
        wire.put_u32_le(0);

        let err = Envelope::parse(&mut wire.freeze()).unwrap_err();
        assert_eq!(err, Error::InvalidMagic { value: 0xDEAD_BEEF });
    }

    #[test]
    fn rejects_unknown_class() {
        let mut wire = BytesMut::new();
        wire.put_u32_le(FRAME_MAGIC);
        wire.put_u32_le(0x7F);
        wire.put_u32_le(0);

        let err = Envelope::parse(&mut wire.freeze()).unwrap_err();
        assert_eq!(err, Error::UnknownFrameClass { value: 0x7F });
    }

    #[test]
    fn rejects_truncated_payload() {
        let envelope = Envelope::new(FrameClass::Proto, Bytes::from_static(b"abcdef"));
        let wire = envelope.serialize().freeze();

        // Drop the last two payload bytes.
        let mut truncated = wire.slice(..ENVELOPE_HEADER_SIZE + 4);
        let err = Envelope::parse(&mut truncated).unwrap_err();
        assert_eq!(err, Error::LengthMismatch { declared: 6, actual: 4 });
    }

    #[test]
    fn rejects_short_header() {
        let err = Envelope::parse(&mut Bytes::from_static(b"\xCA\xFE")).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { .. }));
    }
}
