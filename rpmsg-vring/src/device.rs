//! Device (coprocessor) half of a shared-memory split virtqueue.

use crate::error::VringError;
use crate::layout::{VRING_AVAIL_F_NO_INTERRUPT, VringLayout};
use crate::ring;
use crate::shm::SharedMemory;
use crate::virtqueue::{AvailableBuffer, Kick, Virtqueue};
use rpmsg_core::{ReadBuffer, WriteBuffer};
use std::path::Path;
use std::sync::atomic::{Ordering, fence};

type Notifier = Box<dyn FnMut() + Send>;

/// Device side of one ring direction.
///
/// Consumes the avail ring and produces the used ring. Everything it reads
/// from the region was written by the peer, so descriptor contents are
/// bounds-checked before any slot memory is handed out.
pub struct DeviceQueue {
    shm: SharedMemory,
    layout: VringLayout,
    last_avail_idx: u16,
    used_idx: u16,
    last_kick_idx: u16,
    acquired: Option<u16>,
    notifier: Option<Notifier>,
}

impl DeviceQueue {
    /// Maps the ring at `path`.
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be mapped, or
    /// [`VringError::LayoutMismatch`] if it does not hold a ring.
    pub fn open(path: &Path) -> Result<Self, VringError> {
        let (shm, layout) = ring::map(path)?;
        let used_idx = shm.atomic_u16(layout.used_idx()).load(Ordering::Acquire);
        tracing::debug!(
            "Device opened ring at {} (depth {}, used idx {})",
            path.display(),
            layout.depth(),
            used_idx
        );
        Ok(Self {
            shm,
            layout,
            last_avail_idx: used_idx,
            used_idx,
            last_kick_idx: used_idx,
            acquired: None,
            notifier: None,
        })
    }

    /// Sets the callback that raises the peer's interrupt.
    #[must_use]
    pub fn with_notifier(mut self, notifier: impl FnMut() + Send + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Returns the ring layout.
    #[must_use]
    pub fn layout(&self) -> &VringLayout {
        &self.layout
    }

    /// Returns the number of buffers the peer has posted and the device has
    /// not yet taken.
    #[must_use]
    pub fn pending(&self) -> u16 {
        self.shm
            .atomic_u16(self.layout.avail_idx())
            .load(Ordering::Acquire)
            .wrapping_sub(self.last_avail_idx)
    }
}

impl Virtqueue for DeviceQueue {
    fn depth(&self) -> u16 {
        self.layout.depth()
    }

    fn acquire_available(&mut self) -> Option<AvailableBuffer> {
        let avail_idx = self
            .shm
            .atomic_u16(self.layout.avail_idx())
            .load(Ordering::Acquire);
        if avail_idx == self.last_avail_idx {
            return None;
        }

        let region = self.shm.as_slice();
        let head = region.get_u16_le(self.layout.avail_ring(self.last_avail_idx));
        let len = if self.is_valid_head(head) {
            self.layout.read_desc(region, head).len
        } else {
            0
        };
        self.last_avail_idx = self.last_avail_idx.wrapping_add(1);
        self.acquired = Some(head);
        Some(AvailableBuffer { head, len })
    }

    fn buffer(&self, head: u16) -> Option<&[u8]> {
        if !self.is_valid_head(head) {
            return None;
        }
        let region = self.shm.as_slice();
        let range = self.layout.resolve(self.layout.read_desc(region, head))?;
        Some(&region[range])
    }

    fn buffer_mut(&mut self, head: u16) -> Option<&mut [u8]> {
        if !self.is_valid_head(head) {
            return None;
        }
        let range = self
            .layout
            .resolve(self.layout.read_desc(self.shm.as_slice(), head))?;
        Some(&mut self.shm.as_mut_slice()[range])
    }

    fn return_unused(&mut self, head: u16) -> Result<(), VringError> {
        if self.acquired != Some(head) {
            return Err(VringError::NotLastAcquired { head });
        }
        self.last_avail_idx = self.last_avail_idx.wrapping_sub(1);
        self.acquired = None;
        Ok(())
    }

    fn mark_used(&mut self, head: u16, len: u32) -> Result<(), VringError> {
        if !self.is_valid_head(head) {
            return Err(VringError::InvalidHead {
                head: u32::from(head),
                depth: self.layout.depth(),
            });
        }

        let elem = self.layout.used_ring(self.used_idx);
        let region = self.shm.as_mut_slice();
        region.put_u32_le(elem, u32::from(head));
        region.put_u32_le(elem + 4, len);

        // Release publishes the slot contents and the used element together.
        self.used_idx = self.used_idx.wrapping_add(1);
        self.shm
            .atomic_u16(self.layout.used_idx())
            .store(self.used_idx, Ordering::Release);
        self.acquired = None;
        Ok(())
    }

    fn kick(&mut self) -> Kick {
        if self.used_idx == self.last_kick_idx {
            return Kick::Suppressed;
        }
        self.last_kick_idx = self.used_idx;

        // The used idx store must be ordered before the flags load.
        fence(Ordering::SeqCst);
        let flags = self
            .shm
            .atomic_u16(self.layout.avail_flags())
            .load(Ordering::Acquire);
        if flags & VRING_AVAIL_F_NO_INTERRUPT != 0 {
            return Kick::Suppressed;
        }

        if let Some(notify) = self.notifier.as_mut() {
            notify();
        }
        tracing::trace!("Kicked peer at used idx {}", self.used_idx);
        Kick::Sent
    }
}

impl std::fmt::Debug for DeviceQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceQueue")
            .field("layout", &self.layout)
            .field("last_avail_idx", &self.last_avail_idx)
            .field("used_idx", &self.used_idx)
            .field("acquired", &self.acquired)
            .finish_non_exhaustive()
    }
}
