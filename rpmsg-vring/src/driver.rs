//! Driver (host) half of a shared-memory split virtqueue.
//!
//! The driver owns the descriptor table. It posts buffers on the avail ring
//! and reaps them from the used ring. It is what a host, or a test standing
//! in for one, uses to feed the coprocessor's [`DeviceQueue`].
//!
//! [`DeviceQueue`]: crate::DeviceQueue

use crate::error::VringError;
use crate::layout::{Descriptor, VRING_AVAIL_F_NO_INTERRUPT, VringLayout};
use crate::ring;
use crate::shm::SharedMemory;
use bytes::Bytes;
use rpmsg_core::{ReadBuffer, WriteBuffer};
use std::path::Path;
use std::sync::atomic::Ordering;

/// A buffer the device handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedBuffer {
    /// Descriptor index.
    pub head: u16,
    /// Length the device reported.
    pub len: u32,
    /// Copy of the first `len` bytes of the slot (clamped to the slot size).
    pub data: Bytes,
}

/// Driver side of one ring direction.
///
/// Open it once, right after [`create`](crate::create): descriptor
/// ownership is tracked locally and starts with every descriptor free.
pub struct DriverQueue {
    shm: SharedMemory,
    layout: VringLayout,
    avail_idx: u16,
    last_used_idx: u16,
    free: Vec<u16>,
}

impl DriverQueue {
    /// Maps the ring at `path`.
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be mapped, or
    /// [`VringError::LayoutMismatch`] if it does not hold a ring.
    pub fn open(path: &Path) -> Result<Self, VringError> {
        let (shm, layout) = ring::map(path)?;
        let avail_idx = shm.atomic_u16(layout.avail_idx()).load(Ordering::Acquire);
        let last_used_idx = shm.atomic_u16(layout.used_idx()).load(Ordering::Acquire);
        tracing::debug!(
            "Driver opened ring at {} (depth {})",
            path.display(),
            layout.depth()
        );
        Ok(Self {
            shm,
            layout,
            avail_idx,
            last_used_idx,
            free: (0..layout.depth()).rev().collect(),
        })
    }

    /// Returns the ring layout.
    #[must_use]
    pub fn layout(&self) -> &VringLayout {
        &self.layout
    }

    /// Returns the number of descriptors not currently posted.
    #[must_use]
    pub fn free_descriptors(&self) -> usize {
        self.free.len()
    }

    /// Posts an empty, full-size buffer for the device to fill.
    ///
    /// # Errors
    /// Returns [`VringError::NoFreeDescriptor`] when every descriptor is
    /// already posted.
    pub fn post_buffer(&mut self) -> Result<u16, VringError> {
        let head = self.free.pop().ok_or(VringError::NoFreeDescriptor)?;
        let desc = Descriptor {
            addr: self.layout.slot_offset(head) as u64,
            len: self.layout.buf_size(),
        };
        self.layout.write_desc(self.shm.as_mut_slice(), head, desc);
        self.publish(head);
        Ok(head)
    }

    /// Posts every free descriptor as an empty buffer. Returns how many were
    /// posted.
    pub fn fill(&mut self) -> usize {
        let mut posted = 0;
        while self.post_buffer().is_ok() {
            posted += 1;
        }
        posted
    }

    /// Copies `data` into a free slot and posts it for the device to read.
    ///
    /// # Errors
    /// Returns [`VringError::MessageTooLarge`] if `data` exceeds the slot
    /// size, or [`VringError::NoFreeDescriptor`].
    pub fn post_message(&mut self, data: &[u8]) -> Result<u16, VringError> {
        let max = self.layout.buf_size() as usize;
        if data.len() > max {
            return Err(VringError::MessageTooLarge {
                len: data.len(),
                max,
            });
        }
        let head = self.free.pop().ok_or(VringError::NoFreeDescriptor)?;
        let addr = self.layout.slot_offset(head);
        let region = self.shm.as_mut_slice();
        region.put_bytes(addr, data);
        let desc = Descriptor {
            addr: addr as u64,
            len: data.len() as u32,
        };
        self.layout.write_desc(region, head, desc);
        self.publish(head);
        Ok(head)
    }

    /// Overwrites the descriptor behind `head` as-is. Lets a host hand the
    /// device deliberately broken buffers.
    pub fn write_raw_descriptor(&mut self, head: u16, addr: u64, len: u32) {
        let desc = Descriptor { addr, len };
        self.layout.write_desc(self.shm.as_mut_slice(), head, desc);
    }

    /// Reaps one used buffer and frees its descriptor.
    ///
    /// # Errors
    /// Returns [`VringError::InvalidHead`] if the device reported a head that
    /// is out of range or was not posted. The used entry is consumed either
    /// way.
    pub fn take_used(&mut self) -> Result<Option<UsedBuffer>, VringError> {
        let used_idx = self
            .shm
            .atomic_u16(self.layout.used_idx())
            .load(Ordering::Acquire);
        if used_idx == self.last_used_idx {
            return Ok(None);
        }

        let region = self.shm.as_slice();
        let elem = self.layout.used_ring(self.last_used_idx);
        let id = region.get_u32_le(elem);
        let len = region.get_u32_le(elem + 4);
        self.last_used_idx = self.last_used_idx.wrapping_add(1);

        let head = match u16::try_from(id) {
            Ok(head) if head < self.layout.depth() && !self.free.contains(&head) => head,
            _ => {
                tracing::warn!("Device returned invalid used head {}", id);
                return Err(VringError::InvalidHead {
                    head: id,
                    depth: self.layout.depth(),
                });
            }
        };

        let start = self.layout.slot_offset(head);
        let n = len.min(self.layout.buf_size()) as usize;
        let data = Bytes::copy_from_slice(region.get_bytes(start, n));
        self.free.push(head);
        Ok(Some(UsedBuffer { head, len, data }))
    }

    /// Enables or disables notifications from the device.
    pub fn set_notifications(&self, enabled: bool) {
        let flags = if enabled {
            0
        } else {
            VRING_AVAIL_F_NO_INTERRUPT
        };
        self.shm
            .atomic_u16(self.layout.avail_flags())
            .store(flags, Ordering::Release);
    }

    fn publish(&mut self, head: u16) {
        let slot = self.layout.avail_ring(self.avail_idx);
        self.shm.as_mut_slice().put_u16_le(slot, head);
        self.avail_idx = self.avail_idx.wrapping_add(1);
        self.shm
            .atomic_u16(self.layout.avail_idx())
            .store(self.avail_idx, Ordering::Release);
    }
}

impl std::fmt::Debug for DriverQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverQueue")
            .field("layout", &self.layout)
            .field("avail_idx", &self.avail_idx)
            .field("last_used_idx", &self.last_used_idx)
            .field("free", &self.free.len())
            .finish()
    }
}
