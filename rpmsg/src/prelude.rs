//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use rpmsg::prelude::*;
//! ```

// Core types
pub use rpmsg_core::buffer::{AlignedBuffer, ReadBuffer, WriteBuffer};
pub use rpmsg_core::error::{Error as CoreError, Result as CoreResult};
pub use rpmsg_core::header::{RpmsgHeader, split_frame};
pub use rpmsg_core::ns::{ChannelName, NameServiceMessage, NsAction};
pub use rpmsg_core::types::{Address, RPMSG_BUF_SIZE, RPMSG_NAME_SIZE};
pub use rpmsg_core::SlotBuffer;

// Ring types
pub use rpmsg_vring::{
    AvailableBuffer, DeviceQueue, DriverQueue, Kick, UsedBuffer, Virtqueue, VringConfig,
    VringError,
};

// Transport types
pub use rpmsg_transport::{Received, Transport, TransportError};
