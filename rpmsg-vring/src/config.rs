//! Ring configuration.

use crate::error::VringError;
use rpmsg_core::{RPMSG_BUF_SIZE, RpmsgHeader};

/// Largest descriptor table a split virtqueue may have.
pub const MAX_DEPTH: u16 = 32768;

/// Configuration for one ring direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VringConfig {
    /// Number of descriptors (slots). Must be a power of 2.
    pub depth: u16,
    /// Capacity of each slot in bytes, header included.
    pub buf_size: u32,
}

impl Default for VringConfig {
    fn default() -> Self {
        Self {
            depth: 16,
            buf_size: RPMSG_BUF_SIZE as u32,
        }
    }
}

impl VringConfig {
    /// Sets the number of descriptors.
    #[must_use]
    pub fn depth(mut self, depth: u16) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the slot capacity.
    #[must_use]
    pub fn buf_size(mut self, buf_size: u32) -> Self {
        self.buf_size = buf_size;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    /// Returns [`VringError::Config`] if the depth is zero, not a power of 2
    /// or above [`MAX_DEPTH`], or if a slot cannot hold a message header.
    pub fn validate(&self) -> Result<(), VringError> {
        if self.depth == 0 || !self.depth.is_power_of_two() {
            return Err(VringError::config(format!(
                "depth {} is not a power of 2",
                self.depth
            )));
        }
        if self.depth > MAX_DEPTH {
            return Err(VringError::config(format!(
                "depth {} exceeds maximum {}",
                self.depth, MAX_DEPTH
            )));
        }
        if (self.buf_size as usize) < RpmsgHeader::ENCODED_LENGTH {
            return Err(VringError::config(format!(
                "buffer size {} cannot hold a {}-byte header",
                self.buf_size,
                RpmsgHeader::ENCODED_LENGTH
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vring_config_default() {
        let config = VringConfig::default();
        assert_eq!(config.depth, 16);
        assert_eq!(config.buf_size, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_vring_config_setters() {
        let config = VringConfig::default().depth(4).buf_size(64);
        assert_eq!(config.depth, 4);
        assert_eq!(config.buf_size, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_vring_config_rejects_bad_depth() {
        assert!(matches!(
            VringConfig::default().depth(0).validate(),
            Err(VringError::Config { .. })
        ));
        assert!(matches!(
            VringConfig::default().depth(12).validate(),
            Err(VringError::Config { .. })
        ));
        assert!(VringConfig::default().depth(MAX_DEPTH).validate().is_ok());
    }

    #[test]
    fn test_vring_config_rejects_tiny_slots() {
        let err = VringConfig::default().buf_size(15).validate().unwrap_err();
        assert!(err.to_string().contains("cannot hold"));
    }
}
