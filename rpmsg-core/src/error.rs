//! Error types for rpmsg wire types.

use thiserror::Error;

/// Core error type for framing and name-service operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Buffer is too short for the requested operation.
    #[error("buffer too short: required {required} bytes, available {available} bytes")]
    BufferTooShort {
        /// Required buffer size in bytes.
        required: usize,
        /// Available buffer size in bytes.
        available: usize,
    },

    /// Channel name or description does not fit its fixed-width field.
    #[error("name too long: {len} bytes exceeds maximum {max} bytes")]
    NameTooLong {
        /// Length of the rejected name in bytes.
        len: usize,
        /// Maximum number of content bytes.
        max: usize,
    },

    /// Channel name contains an embedded NUL byte.
    #[error("name contains NUL byte at offset {offset}")]
    NameContainsNul {
        /// Offset of the first NUL byte.
        offset: usize,
    },

    /// Name-service flags word is neither create nor destroy.
    #[error("unknown name-service flags: {0:#x}")]
    UnknownNsFlags(u32),
}

impl Error {
    /// Creates a buffer too short error.
    pub fn buffer_too_short(required: usize, available: usize) -> Self {
        Self::BufferTooShort {
            required,
            available,
        }
    }
}

/// Result type alias for rpmsg core operations.
pub type Result<T> = std::result::Result<T, Error>;
