//! # rpmsg core
//!
//! Wire types for addressed messaging over shared-memory rings.
//!
//! This crate provides:
//! - Buffer traits for little-endian reads and writes on slot memory
//! - [`RpmsgHeader`], the 16-byte header in front of every payload
//! - [`NameServiceMessage`] and [`ChannelName`] for channel announcements
//! - [`Address`] and the link-wide size constants
//! - Error types for framing and name validation

pub mod buffer;
pub mod error;
pub mod header;
pub mod ns;
pub mod types;

pub use buffer::{AlignedBuffer, ReadBuffer, WriteBuffer};
pub use error::{Error, Result};
pub use header::{RpmsgHeader, split_frame};
pub use ns::{ChannelName, NameServiceMessage, NsAction};
pub use types::{Address, RPMSG_BUF_SIZE, RPMSG_NAME_SIZE};

/// Scratch buffer able to hold any payload of a reference-size slot.
pub type SlotBuffer = AlignedBuffer<RPMSG_BUF_SIZE>;
