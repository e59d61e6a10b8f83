//! Channel announcements to the host's name service.

use crate::error::{Result, TransportError};
use crate::transport::Transport;
use rpmsg_core::{Address, NameServiceMessage, NsAction};
use rpmsg_vring::Virtqueue;

impl<Tx: Virtqueue, Rx: Virtqueue> Transport<Tx, Rx> {
    /// Asks the host to create or destroy the channel `name` bound to the
    /// local endpoint `port`.
    ///
    /// The host matches `name` against its drivers, so names are validated
    /// up front and never truncated. The announcement is fire-and-forget:
    /// success means it was queued, not that the host acted on it.
    ///
    /// # Errors
    /// [`TransportError::InvalidName`] if `name` or `description` does not
    /// fit its 32-byte field (nothing touches the ring in that case),
    /// otherwise whatever [`send`](Self::send) returns.
    pub fn announce_channel(
        &mut self,
        action: NsAction,
        name: &str,
        description: &str,
        port: Address,
    ) -> Result<()> {
        let msg = NameServiceMessage::new(action, name, description, port)
            .map_err(TransportError::InvalidName)?;
        self.announce(&msg)
    }

    /// Sends an already validated announcement.
    ///
    /// # Errors
    /// Whatever [`send`](Self::send) returns.
    pub fn announce(&mut self, msg: &NameServiceMessage) -> Result<()> {
        self.send(msg.port, Address::NAME_SERVICE, &msg.to_bytes())?;
        tracing::debug!(
            "Announced {:?} of channel {} on port {}",
            msg.action,
            msg.name,
            msg.port
        );
        Ok(())
    }
}
