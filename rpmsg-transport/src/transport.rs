//! Addressed message transport over a pair of rings.

use crate::error::{Result, TransportError};
use rpmsg_core::{Address, RpmsgHeader, WriteBuffer};
use rpmsg_vring::{Kick, Virtqueue};

/// Metadata of a received message. The payload itself is in the caller's
/// buffer, `len` bytes from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received {
    /// Endpoint the message came from.
    pub source: Address,
    /// Endpoint the message was sent to.
    pub destination: Address,
    /// Payload length in bytes.
    pub len: usize,
    /// Header `flags` field as sent by the peer.
    pub flags: u16,
    /// Header `reserved` field as sent by the peer.
    pub reserved: u32,
}

/// Message transport between the coprocessor and the host.
///
/// Holds the two ring directions and nothing else. One transport serves every
/// logical channel on the link; channels are told apart by endpoint address.
///
/// All operations return immediately. An empty ring is reported as
/// [`TransportError::NoBufferAvailable`], and polling is up to the caller.
pub struct Transport<Tx, Rx> {
    to_host: Tx,
    from_host: Rx,
}

impl<Tx: Virtqueue, Rx: Virtqueue> Transport<Tx, Rx> {
    /// Creates a transport from the coprocessor-to-host ring and the
    /// host-to-coprocessor ring.
    #[must_use]
    pub fn new(to_host: Tx, from_host: Rx) -> Self {
        Self { to_host, from_host }
    }

    /// Returns the coprocessor-to-host ring.
    #[must_use]
    pub fn to_host(&self) -> &Tx {
        &self.to_host
    }

    /// Returns the host-to-coprocessor ring.
    #[must_use]
    pub fn from_host(&self) -> &Rx {
        &self.from_host
    }

    /// Consumes the transport, returning both rings.
    #[must_use]
    pub fn into_parts(self) -> (Tx, Rx) {
        (self.to_host, self.from_host)
    }

    /// Receives the next message from the host, if any.
    ///
    /// The payload is copied into `buf`, which should be able to hold the
    /// largest payload a slot can carry.
    ///
    /// # Errors
    /// - [`TransportError::NoBufferAvailable`] if the host has sent nothing.
    /// - [`TransportError::InvalidHead`] if the ring produced an unusable
    ///   head; nothing is released.
    /// - [`TransportError::MalformedMessage`] if the header declares more
    ///   bytes than the slot holds.
    /// - [`TransportError::DestinationTooSmall`] if `buf` cannot hold the
    ///   payload; the message stays queued.
    /// - [`TransportError::Ring`] if the ring refuses to take the slot back.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<Received> {
        let avail = self
            .from_host
            .acquire_available()
            .ok_or(TransportError::NoBufferAvailable)?;
        let head = avail.head;
        if !self.from_host.is_valid_head(head) {
            tracing::warn!(
                "Receive ring returned head {} outside depth {}",
                head,
                self.from_host.depth()
            );
            return Err(TransportError::InvalidHead { head });
        }
        let Some(slot) = self.from_host.buffer(head) else {
            tracing::warn!("Receive ring descriptor {} points outside the slot area", head);
            return Err(TransportError::InvalidHead { head });
        };
        let slot_len = slot.len();

        let (header, payload) = match rpmsg_core::split_frame(slot) {
            Ok(frame) => frame,
            Err(source) => {
                tracing::warn!("Dropping malformed message in slot {}: {}", head, source);
                self.from_host.mark_used(head, 0)?;
                self.from_host.kick();
                return Err(TransportError::MalformedMessage { head, source });
            }
        };

        if payload.len() > buf.len() {
            let required = payload.len();
            self.from_host.return_unused(head)?;
            return Err(TransportError::DestinationTooSmall {
                required,
                available: buf.len(),
            });
        }
        buf[..payload.len()].copy_from_slice(payload);

        let received = Received {
            source: header.source,
            destination: header.destination,
            len: payload.len(),
            flags: header.flags,
            reserved: header.reserved,
        };

        self.from_host.mark_used(head, slot_len as u32)?;
        if self.from_host.kick() == Kick::Sent {
            tracing::trace!("Notified host of consumed slot {}", head);
        }
        tracing::trace!(
            "Received {} bytes from {} to {}",
            received.len,
            received.source,
            received.destination
        );
        Ok(received)
    }

    /// Sends `data` from `src` to `dst`.
    ///
    /// # Errors
    /// - [`TransportError::NoBufferAvailable`] if the host has no empty
    ///   buffer posted.
    /// - [`TransportError::InvalidHead`] if the ring produced an unusable
    ///   head; nothing is written.
    /// - [`TransportError::BufferTooSmall`] if header plus `data` does not
    ///   fit the slot; the slot is handed back unused.
    /// - [`TransportError::Ring`] if the ring refuses to take the slot back.
    pub fn send(&mut self, src: Address, dst: Address, data: &[u8]) -> Result<()> {
        let avail = self
            .to_host
            .acquire_available()
            .ok_or(TransportError::NoBufferAvailable)?;
        let head = avail.head;
        if !self.to_host.is_valid_head(head) {
            tracing::warn!(
                "Send ring returned head {} outside depth {}",
                head,
                self.to_host.depth()
            );
            return Err(TransportError::InvalidHead { head });
        }
        let Some(slot) = self.to_host.buffer_mut(head) else {
            tracing::warn!("Send ring descriptor {} points outside the slot area", head);
            return Err(TransportError::InvalidHead { head });
        };

        let required = RpmsgHeader::ENCODED_LENGTH + data.len();
        let capacity = slot.len();
        let payload_length = match u16::try_from(data.len()) {
            Ok(len) if required <= capacity => len,
            _ => {
                self.to_host.return_unused(head)?;
                return Err(TransportError::BufferTooSmall { required, capacity });
            }
        };

        RpmsgHeader::new(src, dst, payload_length).encode(slot)?;
        slot.put_bytes(RpmsgHeader::ENCODED_LENGTH, data);

        // The slot is complete; from here on the host may read it.
        self.to_host.mark_used(head, required as u32)?;
        if self.to_host.kick() == Kick::Sent {
            tracing::trace!("Notified host of filled slot {}", head);
        }
        tracing::trace!("Sent {} bytes from {} to {}", data.len(), src, dst);
        Ok(())
    }
}

impl<Tx, Rx> std::fmt::Debug for Transport<Tx, Rx>
where
    Tx: std::fmt::Debug,
    Rx: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("to_host", &self.to_host)
            .field("from_host", &self.from_host)
            .finish()
    }
}
