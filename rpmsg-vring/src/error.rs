//! Error types for ring operations.

use thiserror::Error;

/// Error type for ring operations.
#[derive(Debug, Error)]
pub enum VringError {
    /// IO error while creating or mapping the ring.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Head index outside the descriptor table.
    #[error("invalid head {head}: ring depth is {depth}")]
    InvalidHead {
        /// Rejected head index, as found on the wire.
        head: u32,
        /// Number of descriptors in the ring.
        depth: u16,
    },

    /// Only the most recently acquired buffer can be handed back unused.
    #[error("head {head} is not the most recently acquired buffer")]
    NotLastAcquired {
        /// Rejected head index.
        head: u16,
    },

    /// Invalid ring configuration.
    #[error("invalid ring configuration: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Mapped region does not hold a ring this crate understands.
    #[error("ring layout mismatch: {message}")]
    LayoutMismatch {
        /// Error message.
        message: String,
    },

    /// Every descriptor is already posted to the device.
    #[error("no free descriptor")]
    NoFreeDescriptor,

    /// Message does not fit a ring slot.
    #[error("message too large: {len} bytes exceeds slot size {max} bytes")]
    MessageTooLarge {
        /// Message length in bytes.
        len: usize,
        /// Slot size in bytes.
        max: usize,
    },
}

impl VringError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a layout mismatch error.
    pub fn layout_mismatch(message: impl Into<String>) -> Self {
        Self::LayoutMismatch {
            message: message.into(),
        }
    }
}
