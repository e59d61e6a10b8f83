//! Name-service announcement message.
//!
//! A coprocessor asks the host to create or tear down a channel by sending
//! this payload to [`Address::NAME_SERVICE`]. The host driver matches the
//! channel name against its drivers, so names are never truncated: a name
//! that does not fit is an error.
//!
//! # Wire Format
//! ```text
//! +0:  name         ([u8; 32], NUL-padded)
//! +32: description  ([u8; 32], NUL-padded)
//! +64: port         (u32)
//! +68: flags        (u32, 0 = create, 1 = destroy)
//! ```

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::{Error, Result};
use crate::types::{Address, RPMSG_NAME_SIZE};
use std::fmt;

/// Requested name-service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum NsAction {
    /// Create a channel on the host.
    Create = 0,
    /// Destroy a previously created channel.
    Destroy = 1,
}

impl NsAction {
    /// Returns the wire value of the flags word.
    #[must_use]
    pub const fn flags(self) -> u32 {
        self as u32
    }

    /// Parses the flags word.
    ///
    /// # Errors
    /// Returns [`Error::UnknownNsFlags`] for any other value.
    pub const fn from_flags(flags: u32) -> Result<Self> {
        match flags {
            0 => Ok(Self::Create),
            1 => Ok(Self::Destroy),
            other => Err(Error::UnknownNsFlags(other)),
        }
    }
}

/// Bounded channel name or description.
///
/// Holds at most [`ChannelName::MAX_LEN`] bytes so the NUL terminator the
/// host expects always fits in the 32-byte field.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelName {
    bytes: [u8; RPMSG_NAME_SIZE],
    len: u8,
}

impl ChannelName {
    /// Maximum number of content bytes.
    pub const MAX_LEN: usize = RPMSG_NAME_SIZE - 1;

    /// Validates and copies a name.
    ///
    /// # Errors
    /// Returns [`Error::NameTooLong`] if `name` exceeds [`Self::MAX_LEN`]
    /// bytes, or [`Error::NameContainsNul`] if it contains a NUL byte.
    pub fn new(name: &str) -> Result<Self> {
        Self::from_bytes(name.as_bytes())
    }

    /// Byte-level variant of [`Self::new`].
    ///
    /// # Errors
    /// Same as [`Self::new`].
    pub fn from_bytes(name: &[u8]) -> Result<Self> {
        if name.len() > Self::MAX_LEN {
            return Err(Error::NameTooLong {
                len: name.len(),
                max: Self::MAX_LEN,
            });
        }
        if let Some(offset) = name.iter().position(|&b| b == 0) {
            return Err(Error::NameContainsNul { offset });
        }
        let mut bytes = [0u8; RPMSG_NAME_SIZE];
        bytes[..name.len()].copy_from_slice(name);
        Ok(Self {
            bytes,
            len: name.len() as u8,
        })
    }

    /// Returns the content bytes, without padding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Returns the name as UTF-8, if it is.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Returns the length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true for an empty name.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelName({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Name-service announcement payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameServiceMessage {
    /// Channel name the host matches drivers against.
    pub name: ChannelName,
    /// Free-form channel description.
    pub description: ChannelName,
    /// Local endpoint the channel is bound to.
    pub port: Address,
    /// Create or destroy.
    pub action: NsAction,
}

impl NameServiceMessage {
    /// Encoded length of the payload in bytes.
    pub const ENCODED_LENGTH: usize = 2 * RPMSG_NAME_SIZE + 8;

    const DESC_OFFSET: usize = RPMSG_NAME_SIZE;
    const PORT_OFFSET: usize = 2 * RPMSG_NAME_SIZE;
    const FLAGS_OFFSET: usize = Self::PORT_OFFSET + 4;

    /// Builds an announcement from unvalidated strings.
    ///
    /// # Errors
    /// Returns the [`ChannelName`] validation error for `name` or
    /// `description`.
    pub fn new(action: NsAction, name: &str, description: &str, port: Address) -> Result<Self> {
        Ok(Self {
            name: ChannelName::new(name)?,
            description: ChannelName::new(description)?,
            port,
            action,
        })
    }

    /// Encodes the payload into a fixed-size array.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LENGTH] {
        let mut out = [0u8; Self::ENCODED_LENGTH];
        let buf: &mut [u8] = &mut out;
        buf.put_padded(0, self.name.as_bytes(), RPMSG_NAME_SIZE);
        buf.put_padded(Self::DESC_OFFSET, self.description.as_bytes(), RPMSG_NAME_SIZE);
        buf.put_u32_le(Self::PORT_OFFSET, self.port.get());
        buf.put_u32_le(Self::FLAGS_OFFSET, self.action.flags());
        out
    }

    /// Decodes a payload received on the name-service endpoint.
    ///
    /// A name field without a NUL terminator is rejected, since the host
    /// side would read past it.
    ///
    /// # Errors
    /// Returns [`Error::BufferTooShort`] for a short payload,
    /// [`Error::NameTooLong`] for an unterminated field, or
    /// [`Error::UnknownNsFlags`] for a bad flags word.
    pub fn decode<B: ReadBuffer + ?Sized>(buffer: &B) -> Result<Self> {
        if buffer.len() < Self::ENCODED_LENGTH {
            return Err(Error::buffer_too_short(Self::ENCODED_LENGTH, buffer.len()));
        }
        Ok(Self {
            name: ChannelName::from_bytes(buffer.get_cstr(0, RPMSG_NAME_SIZE))?,
            description: ChannelName::from_bytes(
                buffer.get_cstr(Self::DESC_OFFSET, RPMSG_NAME_SIZE),
            )?,
            port: Address(buffer.get_u32_le(Self::PORT_OFFSET)),
            action: NsAction::from_flags(buffer.get_u32_le(Self::FLAGS_OFFSET))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ns_action_flags() {
        assert_eq!(NsAction::Create.flags(), 0);
        assert_eq!(NsAction::Destroy.flags(), 1);
        assert_eq!(NsAction::from_flags(1), Ok(NsAction::Destroy));
        assert_eq!(NsAction::from_flags(2), Err(Error::UnknownNsFlags(2)));
    }

    #[test]
    fn test_channel_name_limits() {
        let max = "a".repeat(ChannelName::MAX_LEN);
        assert_eq!(ChannelName::new(&max).unwrap().len(), 31);

        let too_long = "a".repeat(RPMSG_NAME_SIZE);
        assert_eq!(
            ChannelName::new(&too_long),
            Err(Error::NameTooLong { len: 32, max: 31 })
        );

        let forty = "x".repeat(40);
        assert!(matches!(
            ChannelName::new(&forty),
            Err(Error::NameTooLong { len: 40, .. })
        ));
    }

    #[test]
    fn test_channel_name_rejects_nul() {
        assert_eq!(
            ChannelName::new("ab\0c"),
            Err(Error::NameContainsNul { offset: 2 })
        );
    }

    #[test]
    fn test_channel_name_accessors() {
        let name = ChannelName::new("rpmsg-pru").unwrap();
        assert_eq!(name.as_bytes(), b"rpmsg-pru");
        assert_eq!(name.as_str(), Some("rpmsg-pru"));
        assert_eq!(name.to_string(), "rpmsg-pru");
        assert!(!name.is_empty());
        assert!(ChannelName::new("").unwrap().is_empty());
    }

    #[test]
    fn test_ns_message_wire_format() {
        let msg =
            NameServiceMessage::new(NsAction::Create, "chan", "desc", Address(42)).unwrap();
        let bytes = msg.to_bytes();

        assert_eq!(bytes.len(), 72);
        assert_eq!(&bytes[..5], b"chan\0");
        assert!(bytes[4..32].iter().all(|&b| b == 0));
        assert_eq!(&bytes[32..37], b"desc\0");
        assert!(bytes[36..64].iter().all(|&b| b == 0));
        assert_eq!(&bytes[64..68], &42u32.to_le_bytes());
        assert_eq!(&bytes[68..72], &0u32.to_le_bytes());

        let decoded = NameServiceMessage::decode(&bytes[..]).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_ns_message_destroy_flag() {
        let msg =
            NameServiceMessage::new(NsAction::Destroy, "chan", "desc", Address(42)).unwrap();
        assert_eq!(&msg.to_bytes()[68..72], &1u32.to_le_bytes());
    }

    #[test]
    fn test_ns_message_decode_errors() {
        assert!(matches!(
            NameServiceMessage::decode(&[0u8; 71][..]),
            Err(Error::BufferTooShort { required: 72, .. })
        ));

        let mut bytes = NameServiceMessage::new(NsAction::Create, "a", "b", Address(1))
            .unwrap()
            .to_bytes();
        bytes[..32].fill(b'z');
        assert!(matches!(
            NameServiceMessage::decode(&bytes[..]),
            Err(Error::NameTooLong { len: 32, .. })
        ));

        let mut bytes = NameServiceMessage::new(NsAction::Create, "a", "b", Address(1))
            .unwrap()
            .to_bytes();
        bytes[68] = 7;
        assert_eq!(
            NameServiceMessage::decode(&bytes[..]),
            Err(Error::UnknownNsFlags(7))
        );
    }
}
