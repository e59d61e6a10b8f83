//! # rpmsg transport
//!
//! Addressed messaging between a coprocessor and its host over two
//! shared-memory rings.
//!
//! This crate provides:
//! - [`Transport`] - `send` and `receive` of single-slot messages
//! - [`Transport::announce_channel`] - name-service create/destroy requests
//! - [`TransportError`] - the result codes callers match on
//!
//! ```ignore
//! use rpmsg_transport::Transport;
//! use rpmsg_core::{Address, NsAction, SlotBuffer};
//!
//! let mut transport = Transport::new(to_host, from_host);
//! transport.announce_channel(NsAction::Create, "rpmsg-pru", "Channel 30", Address(30))?;
//!
//! let mut buf = SlotBuffer::new();
//! loop {
//!     match transport.receive(buf.as_mut()) {
//!         Ok(msg) => transport.send(msg.destination, msg.source, &buf.as_ref()[..msg.len])?,
//!         Err(e) if e.is_transient() => continue,
//!         Err(e) => return Err(e),
//!     }
//! }
//! ```

mod channel;
pub mod error;
#[cfg(test)]
mod testing;
pub mod transport;

pub use error::{Result, TransportError};
pub use transport::{Received, Transport};
