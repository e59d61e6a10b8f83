//! Byte layout of a split virtqueue inside a shared-memory region.
//!
//! ```text
//! +0        control block   (64 bytes: magic, version, depth, buf_size)
//! +64       descriptor table (depth x 16 bytes)
//! avail     flags u16 | idx u16 | ring[depth] u16 | used_event u16
//! used      flags u16 | idx u16 | ring[depth] {id u32, len u32} | avail_event u16
//! buffers   depth x buf_size, 64-byte aligned
//! ```
//!
//! Descriptor `addr` fields are byte offsets from the start of the region.

use crate::config::VringConfig;
use crate::error::VringError;
use rpmsg_core::{ReadBuffer, WriteBuffer};
use std::ops::Range;

/// Magic number at offset 0 ("RPMV").
pub const VRING_MAGIC: u32 = u32::from_le_bytes(*b"RPMV");

/// Layout version.
pub const VRING_VERSION: u16 = 1;

/// Avail flag set by the driver when it does not want to be notified.
pub const VRING_AVAIL_F_NO_INTERRUPT: u16 = 1;

const DESC_SIZE: usize = 16;
const USED_ELEM_SIZE: usize = 8;

const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Computed offsets for one ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VringLayout {
    depth: u16,
    buf_size: u32,
    desc: usize,
    avail: usize,
    used: usize,
    buffers: usize,
    total: usize,
}

/// One descriptor table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Descriptor {
    pub addr: u64,
    pub len: u32,
}

impl VringLayout {
    /// Size of the control block in bytes.
    pub const CONTROL_SIZE: usize = 64;

    /// Computes the layout for a validated configuration.
    #[must_use]
    pub fn new(config: &VringConfig) -> Self {
        let depth = config.depth as usize;
        let desc = Self::CONTROL_SIZE;
        let avail = desc + DESC_SIZE * depth;
        let used = align_up(avail + 6 + 2 * depth, 4);
        let buffers = align_up(used + 6 + USED_ELEM_SIZE * depth, 64);
        let total = buffers + depth * config.buf_size as usize;
        Self {
            depth: config.depth,
            buf_size: config.buf_size,
            desc,
            avail,
            used,
            buffers,
            total,
        }
    }

    /// Number of descriptors.
    #[must_use]
    pub const fn depth(&self) -> u16 {
        self.depth
    }

    /// Capacity of each slot in bytes.
    #[must_use]
    pub const fn buf_size(&self) -> u32 {
        self.buf_size
    }

    /// Total region size in bytes.
    #[must_use]
    pub const fn total_size(&self) -> usize {
        self.total
    }

    /// Byte range of the slot area.
    #[must_use]
    pub const fn buffers(&self) -> Range<usize> {
        self.buffers..self.total
    }

    /// Offset of the home slot of descriptor `head`.
    #[must_use]
    pub const fn slot_offset(&self, head: u16) -> usize {
        self.buffers + head as usize * self.buf_size as usize
    }

    pub(crate) const fn avail_flags(&self) -> usize {
        self.avail
    }

    pub(crate) const fn avail_idx(&self) -> usize {
        self.avail + 2
    }

    pub(crate) const fn avail_ring(&self, idx: u16) -> usize {
        self.avail + 4 + 2 * (idx & (self.depth - 1)) as usize
    }

    pub(crate) const fn used_idx(&self) -> usize {
        self.used + 2
    }

    pub(crate) const fn used_ring(&self, idx: u16) -> usize {
        self.used + 4 + USED_ELEM_SIZE * (idx & (self.depth - 1)) as usize
    }

    const fn desc_offset(&self, head: u16) -> usize {
        self.desc + DESC_SIZE * head as usize
    }

    pub(crate) fn read_desc(&self, region: &[u8], head: u16) -> Descriptor {
        let off = self.desc_offset(head);
        Descriptor {
            addr: region.get_u64_le(off),
            len: region.get_u32_le(off + 8),
        }
    }

    pub(crate) fn write_desc(&self, region: &mut [u8], head: u16, desc: Descriptor) {
        let off = self.desc_offset(head);
        region.put_u64_le(off, desc.addr);
        region.put_u32_le(off + 8, desc.len);
        region.put_u16_le(off + 12, 0);
        region.put_u16_le(off + 14, 0);
    }

    /// Resolves a peer-written descriptor to a byte range inside the slot
    /// area, or `None` if it points anywhere else.
    pub(crate) fn resolve(&self, desc: Descriptor) -> Option<Range<usize>> {
        let start = usize::try_from(desc.addr).ok()?;
        let end = start.checked_add(desc.len as usize)?;
        (start >= self.buffers && end <= self.total).then_some(start..end)
    }

    /// Writes the control block and the initial descriptor table.
    pub(crate) fn init(&self, region: &mut [u8]) {
        region.put_u32_le(0, VRING_MAGIC);
        region.put_u16_le(4, VRING_VERSION);
        region.put_u16_le(6, self.depth);
        region.put_u32_le(8, self.buf_size);
        for head in 0..self.depth {
            let desc = Descriptor {
                addr: self.slot_offset(head) as u64,
                len: self.buf_size,
            };
            self.write_desc(region, head, desc);
        }
    }

    /// Reads the layout back from an initialised region.
    ///
    /// # Errors
    /// Returns [`VringError::LayoutMismatch`] if the region is not a ring of
    /// this version or is shorter than its layout requires.
    pub fn from_region(region: &[u8]) -> Result<Self, VringError> {
        if region.len() < Self::CONTROL_SIZE {
            return Err(VringError::layout_mismatch(format!(
                "region of {} bytes is smaller than the control block",
                region.len()
            )));
        }
        let magic = region.get_u32_le(0);
        if magic != VRING_MAGIC {
            return Err(VringError::layout_mismatch(format!(
                "bad magic {magic:#010x}"
            )));
        }
        let version = region.get_u16_le(4);
        if version != VRING_VERSION {
            return Err(VringError::layout_mismatch(format!(
                "unsupported version {version}"
            )));
        }
        let config = VringConfig {
            depth: region.get_u16_le(6),
            buf_size: region.get_u32_le(8),
        };
        config.validate()?;
        let layout = Self::new(&config);
        if region.len() < layout.total {
            return Err(VringError::layout_mismatch(format!(
                "region of {} bytes is smaller than the {} bytes the ring needs",
                region.len(),
                layout.total
            )));
        }
        Ok(layout)
    }
}
