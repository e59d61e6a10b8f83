//! In-process link for benchmarks: the coprocessor transport on one side,
//! the host ring halves on the other, both mapping the same files.

use rpmsg_core::{Address, RpmsgHeader, SlotBuffer, WriteBuffer};
use rpmsg_transport::{Received, Transport, TransportError};
use rpmsg_vring::{DeviceQueue, DriverQueue, VringConfig, VringError};
use std::io;
use tempfile::TempDir;
use thiserror::Error;

/// Endpoint the benchmark firmware listens on.
pub const FIRMWARE_PORT: Address = Address(30);
/// Endpoint the benchmark host sends from.
pub const HOST_PORT: Address = Address(1024);

/// Error raised while driving the loopback.
#[derive(Debug, Error)]
pub enum LoopbackError {
    /// Failed to create the backing directory.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Host could not frame the message.
    #[error("framing error: {0}")]
    Framing(#[from] rpmsg_core::Error),
    /// Host ring failure.
    #[error("ring error: {0}")]
    Ring(#[from] VringError),
    /// Coprocessor transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Both directions of a file-backed link.
pub struct Loopback {
    _dir: TempDir,
    /// Coprocessor side.
    pub transport: Transport<DeviceQueue, DeviceQueue>,
    /// Host half of the coprocessor-to-host ring.
    pub host_rx: DriverQueue,
    /// Host half of the host-to-coprocessor ring.
    pub host_tx: DriverQueue,
    frame: SlotBuffer,
    scratch: SlotBuffer,
}

impl Loopback {
    /// Creates both rings in a temporary directory and posts every host
    /// receive buffer.
    ///
    /// # Errors
    /// Returns an error if the rings cannot be created or mapped.
    pub fn new(config: &VringConfig) -> Result<Self, LoopbackError> {
        let dir = tempfile::tempdir()?;
        let to_host = dir.path().join("vring0");
        let from_host = dir.path().join("vring1");
        rpmsg_vring::create(&to_host, config)?;
        rpmsg_vring::create(&from_host, config)?;

        let mut host_rx = DriverQueue::open(&to_host)?;
        host_rx.fill();
        Ok(Self {
            transport: Transport::new(DeviceQueue::open(&to_host)?, DeviceQueue::open(&from_host)?),
            host_rx,
            host_tx: DriverQueue::open(&from_host)?,
            _dir: dir,
            frame: SlotBuffer::new(),
            scratch: SlotBuffer::new(),
        })
    }

    /// Host posts `payload`, the firmware receives it and echoes it back, and
    /// the host reaps both rings. Returns the echoed length.
    ///
    /// # Errors
    /// Returns [`LoopbackError::Framing`] if `payload` does not fit one slot,
    /// otherwise the first ring or transport error.
    pub fn round_trip(&mut self, payload: &[u8]) -> Result<usize, LoopbackError> {
        let frame_len = RpmsgHeader::ENCODED_LENGTH + payload.len();
        let capacity = self.frame.capacity();
        let payload_length = match u16::try_from(payload.len()) {
            Ok(len) if frame_len <= capacity => len,
            _ => return Err(rpmsg_core::Error::buffer_too_short(frame_len, capacity).into()),
        };
        let header = RpmsgHeader::new(HOST_PORT, FIRMWARE_PORT, payload_length);
        header.encode(&mut self.frame)?;
        self.frame.put_bytes(RpmsgHeader::ENCODED_LENGTH, payload);
        self.host_tx.post_message(&self.frame.as_ref()[..frame_len])?;

        let msg = self.echo()?;

        self.host_tx.take_used()?;
        if self.host_rx.take_used()?.is_some() {
            self.host_rx.post_buffer()?;
        }
        Ok(msg.len)
    }

    fn echo(&mut self) -> Result<Received, LoopbackError> {
        let msg = self.transport.receive(self.scratch.as_mut())?;
        self.transport
            .send(msg.destination, msg.source, &self.scratch.as_ref()[..msg.len])?;
        Ok(msg)
    }
}
