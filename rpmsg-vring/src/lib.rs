//! # rpmsg vring
//!
//! The ring primitive underneath the rpmsg transport.
//!
//! This crate provides:
//! - [`Virtqueue`] - the narrow device-side contract the transport uses
//! - [`VringConfig`] - ring depth and slot size
//! - [`create`], [`DeviceQueue`], [`DriverQueue`] - a split virtqueue laid
//!   out in a file-backed shared-memory region, with one half per processor
//!
//! Each ring carries one direction. A link uses two: one the coprocessor
//! fills for the host, one the host fills for the coprocessor. In both, the
//! host is the driver (posts buffers) and the coprocessor is the device
//! (takes them and hands them back as used).

pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod layout;
pub mod ring;
pub mod shm;
pub mod virtqueue;

pub use config::VringConfig;
pub use device::DeviceQueue;
pub use driver::{DriverQueue, UsedBuffer};
pub use error::VringError;
pub use layout::VringLayout;
pub use ring::create;
pub use shm::SharedMemory;
pub use virtqueue::{AvailableBuffer, Kick, Virtqueue};
