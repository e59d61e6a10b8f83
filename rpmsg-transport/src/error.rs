//! Error types for transport operations.

use rpmsg_vring::VringError;
use thiserror::Error;

/// Error type for transport operations.
///
/// `Ok(())` / `Ok(Received)` is the success result. Every variant is
/// reported before or instead of any partial effect, except where a variant
/// documents what happened to the ring slot.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The ring had no buffer to take. Retry later.
    #[error("no buffer available")]
    NoBufferAvailable,

    /// The slot cannot hold header and payload. The slot went back to the
    /// ring unused.
    #[error("buffer too small: message needs {required} bytes, slot holds {capacity} bytes")]
    BufferTooSmall {
        /// Header plus payload length.
        required: usize,
        /// Capacity of the acquired slot.
        capacity: usize,
    },

    /// The ring handed out a head outside its descriptor table, or one whose
    /// descriptor does not point into the slot area. Nothing was read,
    /// written or released.
    #[error("invalid head {head}")]
    InvalidHead {
        /// Head index as returned by the ring.
        head: u16,
    },

    /// The caller's buffer cannot hold the payload. The message stays on the
    /// ring for a retry with a larger buffer.
    #[error("destination too small: payload is {required} bytes, buffer holds {available} bytes")]
    DestinationTooSmall {
        /// Payload length declared by the peer.
        required: usize,
        /// Length of the caller's buffer.
        available: usize,
    },

    /// The peer's header declares more bytes than its slot holds. The slot
    /// was handed back as used with length 0; nothing was copied.
    #[error("malformed message in slot {head}: {source}")]
    MalformedMessage {
        /// Head of the offending slot.
        head: u16,
        /// Framing check that failed.
        source: rpmsg_core::Error,
    },

    /// Channel name or description rejected before any ring interaction.
    #[error("invalid channel name: {0}")]
    InvalidName(rpmsg_core::Error),

    /// Framing error.
    #[error("framing error: {0}")]
    Framing(#[from] rpmsg_core::Error),

    /// The ring rejected a lend/return step.
    #[error("ring error: {0}")]
    Ring(#[from] VringError),
}

impl TransportError {
    /// Status code the coprocessor firmware interface reports for this error.
    ///
    /// Success is 0, [`NoBufferAvailable`](Self::NoBufferAvailable) -1,
    /// [`BufferTooSmall`](Self::BufferTooSmall) -2 and
    /// [`InvalidHead`](Self::InvalidHead) -3. The remaining variants fold
    /// into the closest of those.
    #[must_use]
    pub const fn status_code(&self) -> i16 {
        match self {
            Self::NoBufferAvailable => -1,
            Self::BufferTooSmall { .. }
            | Self::DestinationTooSmall { .. }
            | Self::InvalidName(_)
            | Self::Framing(_) => -2,
            Self::InvalidHead { .. } | Self::MalformedMessage { .. } | Self::Ring(_) => -3,
        }
    }

    /// Returns true if retrying the same call later can succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoBufferAvailable)
    }
}

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TransportError::NoBufferAvailable.status_code(), -1);
        assert_eq!(
            TransportError::BufferTooSmall {
                required: 513,
                capacity: 512
            }
            .status_code(),
            -2
        );
        assert_eq!(TransportError::InvalidHead { head: 99 }.status_code(), -3);
        assert_eq!(
            TransportError::InvalidName(rpmsg_core::Error::NameTooLong { len: 40, max: 31 })
                .status_code(),
            -2
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(TransportError::NoBufferAvailable.is_transient());
        assert!(!TransportError::InvalidHead { head: 0 }.is_transient());
    }

    #[test]
    fn test_display() {
        let err = TransportError::BufferTooSmall {
            required: 513,
            capacity: 512,
        };
        assert_eq!(
            err.to_string(),
            "buffer too small: message needs 513 bytes, slot holds 512 bytes"
        );

        let err = TransportError::MalformedMessage {
            head: 2,
            source: rpmsg_core::Error::buffer_too_short(116, 20),
        };
        assert!(err.to_string().starts_with("malformed message in slot 2"));
    }
}
