//! RPMsg message header.
//!
//! Every message occupies exactly one ring slot: a 16-byte header followed
//! by `payload_length` payload bytes.
//!
//! # Wire Format
//! ```text
//! +0:  source          (u32, 4 bytes)
//! +4:  destination     (u32, 4 bytes)
//! +8:  reserved        (u32, 4 bytes)
//! +12: payload_length  (u16, 2 bytes)
//! +14: flags           (u16, 2 bytes)
//! +16: payload         (payload_length bytes)
//! ```

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::{Error, Result};
use crate::types::{Address, RPMSG_BUF_SIZE};

/// Header prepended to every payload inside a ring slot.
///
/// `reserved` and `flags` have no meaning to the transport. They are zero on
/// send and reported unchanged on receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RpmsgHeader {
    /// Originating endpoint.
    pub source: Address,
    /// Target endpoint.
    pub destination: Address,
    /// Opaque, zero on send.
    pub reserved: u32,
    /// Number of payload bytes following the header.
    pub payload_length: u16,
    /// Opaque, zero on send.
    pub flags: u16,
}

impl RpmsgHeader {
    /// Encoded length of the header in bytes.
    pub const ENCODED_LENGTH: usize = 16;

    /// Largest payload a reference-size slot can carry.
    pub const MAX_PAYLOAD: usize = RPMSG_BUF_SIZE - Self::ENCODED_LENGTH;

    /// Creates a header for an outgoing message with zeroed opaque fields.
    #[must_use]
    pub const fn new(source: Address, destination: Address, payload_length: u16) -> Self {
        Self {
            source,
            destination,
            reserved: 0,
            payload_length,
            flags: 0,
        }
    }

    /// Decodes a header from the start of `buffer`.
    ///
    /// Only the header itself is checked against the buffer length. Whether
    /// the payload fits is up to the caller, see [`Self::frame_len`].
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if `buffer` cannot hold a header.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        if buffer.len() < Self::ENCODED_LENGTH {
            return Err(Error::buffer_too_short(Self::ENCODED_LENGTH, buffer.len()));
        }
        Ok(Self {
            source: Address(buffer.get_u32_le(0)),
            destination: Address(buffer.get_u32_le(4)),
            reserved: buffer.get_u32_le(8),
            payload_length: buffer.get_u16_le(12),
            flags: buffer.get_u16_le(14),
        })
    }

    /// Encodes the header at the start of `buffer`.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] if `buffer` cannot hold a header.
    pub fn encode<B: WriteBuffer + ?Sized>(&self, buffer: &mut B) -> Result<()> {
        if buffer.len() < Self::ENCODED_LENGTH {
            return Err(Error::buffer_too_short(Self::ENCODED_LENGTH, buffer.len()));
        }
        buffer.put_u32_le(0, self.source.get());
        buffer.put_u32_le(4, self.destination.get());
        buffer.put_u32_le(8, self.reserved);
        buffer.put_u16_le(12, self.payload_length);
        buffer.put_u16_le(14, self.flags);
        Ok(())
    }

    /// Returns the slot bytes this message occupies (header + payload).
    #[must_use]
    pub const fn frame_len(&self) -> usize {
        Self::ENCODED_LENGTH + self.payload_length as usize
    }
}

/// Splits a complete slot into its header and payload.
///
/// Used by whoever reads messages out of a slot: the coprocessor on receive,
/// or a host-side peer reaping the coprocessor's sends.
///
/// # Errors
/// Returns [`Error::BufferTooShort`] if the slot is shorter than the header
/// or than the payload length the header declares.
pub fn split_frame(slot: &[u8]) -> Result<(RpmsgHeader, &[u8])> {
    let header = RpmsgHeader::decode(slot)?;
    let end = header.frame_len();
    if end > slot.len() {
        return Err(Error::buffer_too_short(end, slot.len()));
    }
    Ok((header, &slot[RpmsgHeader::ENCODED_LENGTH..end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::AlignedBuffer;

    #[test]
    fn test_header_size() {
        assert_eq!(RpmsgHeader::ENCODED_LENGTH, 16);
        assert_eq!(RpmsgHeader::MAX_PAYLOAD, 496);
        let header = RpmsgHeader::new(Address(1), Address(2), 10);
        assert_eq!(header.frame_len(), 26);
    }

    #[test]
    fn test_header_wire_format() {
        let mut buf: AlignedBuffer<16> = AlignedBuffer::new();
        let header = RpmsgHeader {
            source: Address(0x0102_0304),
            destination: Address(0x0506_0708),
            reserved: 0x090A_0B0C,
            payload_length: 0x0D0E,
            flags: 0x0F10,
        };
        header.encode(&mut buf).unwrap();

        assert_eq!(
            buf.as_slice(),
            &[
                0x04, 0x03, 0x02, 0x01, // source
                0x08, 0x07, 0x06, 0x05, // destination
                0x0C, 0x0B, 0x0A, 0x09, // reserved
                0x0E, 0x0D, // payload_length
                0x10, 0x0F, // flags
            ]
        );
        assert_eq!(RpmsgHeader::decode(&buf).unwrap(), header);
    }

    #[test]
    fn test_new_zeroes_opaque_fields() {
        let header = RpmsgHeader::new(Address(30), Address::NAME_SERVICE, 72);
        assert_eq!(header.reserved, 0);
        assert_eq!(header.flags, 0);
    }

    #[test]
    fn test_decode_short_buffer() {
        let buf = [0u8; 15];
        assert_eq!(
            RpmsgHeader::decode(&buf[..]),
            Err(Error::BufferTooShort {
                required: 16,
                available: 15
            })
        );
    }

    #[test]
    fn test_encode_short_buffer() {
        let mut buf = vec![0u8; 4];
        let header = RpmsgHeader::new(Address(1), Address(2), 0);
        assert!(header.encode(&mut buf).is_err());
        assert_eq!(buf, vec![0u8; 4]);
    }

    #[test]
    fn test_split_frame() {
        let mut slot = vec![0u8; 64];
        RpmsgHeader::new(Address(7), Address(8), 3)
            .encode(&mut slot)
            .unwrap();
        slot[16..19].copy_from_slice(b"abc");

        let (header, payload) = split_frame(&slot).unwrap();
        assert_eq!(header.source, Address(7));
        assert_eq!(header.destination, Address(8));
        assert_eq!(payload, b"abc");
    }

    #[test]
    fn test_split_frame_rejects_overlong_length() {
        let mut slot = vec![0u8; 32];
        RpmsgHeader::new(Address(7), Address(8), 17)
            .encode(&mut slot)
            .unwrap();

        assert_eq!(
            split_frame(&slot),
            Err(Error::BufferTooShort {
                required: 33,
                available: 32
            })
        );
    }
}
