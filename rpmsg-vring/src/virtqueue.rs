//! The ring contract the transport is written against.
//!
//! A [`Virtqueue`] is the coprocessor's (device) view of one ring direction.
//! Both directions look the same from here: the peer posts buffers as
//! available, the coprocessor takes one, reads or fills it, and hands it
//! back as used.

use crate::error::VringError;

/// A buffer handed out by [`Virtqueue::acquire_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailableBuffer {
    /// Descriptor index. Comes from the peer and is not yet validated.
    pub head: u16,
    /// Buffer length in bytes as published by the peer.
    pub len: u32,
}

/// Outcome of [`Virtqueue::kick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kick {
    /// The peer was notified.
    Sent,
    /// No notification was owed.
    Suppressed,
}

/// Device side of one ring direction.
///
/// Implementations never block. The lend/return protocol is:
/// [`acquire_available`](Self::acquire_available), then exactly one of
/// [`mark_used`](Self::mark_used) or [`return_unused`](Self::return_unused)
/// for that head. Anything written through
/// [`buffer_mut`](Self::buffer_mut) must be visible to the peer once
/// `mark_used` returns.
pub trait Virtqueue {
    /// Number of descriptors in the ring.
    fn depth(&self) -> u16;

    /// Takes the next available buffer, or `None` if the peer has posted
    /// nothing new.
    fn acquire_available(&mut self) -> Option<AvailableBuffer>;

    /// Returns true if `head` indexes the descriptor table.
    fn is_valid_head(&self, head: u16) -> bool {
        head < self.depth()
    }

    /// Returns the memory behind `head`, or `None` if the head or its
    /// descriptor is unusable.
    fn buffer(&self, head: u16) -> Option<&[u8]>;

    /// Mutable variant of [`buffer`](Self::buffer).
    fn buffer_mut(&mut self, head: u16) -> Option<&mut [u8]>;

    /// Hands an acquired buffer back as still available, without consuming it.
    ///
    /// # Errors
    /// Returns an error if `head` was not the most recent acquisition.
    fn return_unused(&mut self, head: u16) -> Result<(), VringError>;

    /// Publishes `head` to the peer as used, with `len` meaningful bytes.
    ///
    /// # Errors
    /// Returns [`VringError::InvalidHead`] if `head` is out of range.
    fn mark_used(&mut self, head: u16, len: u32) -> Result<(), VringError>;

    /// Notifies the peer if it is owed a notification.
    fn kick(&mut self) -> Kick;
}

impl<Q: Virtqueue + ?Sized> Virtqueue for &mut Q {
    fn depth(&self) -> u16 {
        (**self).depth()
    }

    fn acquire_available(&mut self) -> Option<AvailableBuffer> {
        (**self).acquire_available()
    }

    fn is_valid_head(&self, head: u16) -> bool {
        (**self).is_valid_head(head)
    }

    fn buffer(&self, head: u16) -> Option<&[u8]> {
        (**self).buffer(head)
    }

    fn buffer_mut(&mut self, head: u16) -> Option<&mut [u8]> {
        (**self).buffer_mut(head)
    }

    fn return_unused(&mut self, head: u16) -> Result<(), VringError> {
        (**self).return_unused(head)
    }

    fn mark_used(&mut self, head: u16, len: u32) -> Result<(), VringError> {
        (**self).mark_used(head, len)
    }

    fn kick(&mut self) -> Kick {
        (**self).kick()
    }
}
