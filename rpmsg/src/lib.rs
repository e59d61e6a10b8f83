//! # rpmsg
//!
//! Addressed messaging between an embedded coprocessor and its host over
//! shared-memory rings.
//!
//! ## Features
//!
//! - **Single-slot messages** - a 16-byte header and up to 496 payload bytes
//!   per 512-byte slot, copied straight into and out of ring memory
//! - **Non-blocking** - every operation returns at once; an empty ring is a
//!   result, not a wait
//! - **Name service** - announce and tear down channels on the host
//! - **Pluggable rings** - the transport only needs a [`Virtqueue`]; a
//!   file-backed split virtqueue is included
//!
//! ## Quick Start
//!
//! ```ignore
//! use rpmsg::prelude::*;
//!
//! let to_host = DeviceQueue::open(Path::new("/dev/shm/vring0"))?;
//! let from_host = DeviceQueue::open(Path::new("/dev/shm/vring1"))?;
//! let mut transport = Transport::new(to_host, from_host);
//!
//! transport.announce_channel(NsAction::Create, "rpmsg-pru", "Channel 30", Address(30))?;
//! transport.send(Address(30), Address(1024), b"hello")?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - header, name-service message, addressing, buffer traits
//! - [`vring`] - ring contract and the shared-memory split virtqueue
//! - [`transport`] - send, receive and channel announcements

pub mod prelude;

/// Wire types for rpmsg framing.
pub mod core {
    pub use rpmsg_core::*;
}

/// Ring primitive.
pub mod vring {
    pub use rpmsg_vring::*;
}

/// Message transport.
pub mod transport {
    pub use rpmsg_transport::*;
}

// Re-export commonly used items at the crate root
pub use rpmsg_core::{Address, ChannelName, NameServiceMessage, NsAction, RpmsgHeader};
pub use rpmsg_transport::{Received, Transport, TransportError};
pub use rpmsg_vring::{DeviceQueue, DriverQueue, Virtqueue, VringConfig};
