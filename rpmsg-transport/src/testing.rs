//! Test fixtures: an in-memory ring and a shared-memory link.

use crate::transport::Transport;
use rpmsg_vring::{
    AvailableBuffer, DeviceQueue, DriverQueue, Kick, Virtqueue, VringConfig, VringError,
};
use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::{TempDir, tempdir};

/// In-memory ring that records how it is used.
pub(crate) struct MockQueue {
    slots: Vec<Vec<u8>>,
    avail: VecDeque<u16>,
    acquired: Option<u16>,
    pub used: Vec<(u16, u32)>,
    pub acquisitions: usize,
    pub returned: usize,
    pub buffer_accesses: Cell<usize>,
    pub kicks: usize,
    /// Makes every `mark_used` fail with a ring error.
    pub fail_mark_used: bool,
}

impl MockQueue {
    pub fn new(depth: u16, buf_size: usize) -> Self {
        Self {
            slots: vec![vec![0u8; buf_size]; depth as usize],
            avail: VecDeque::new(),
            acquired: None,
            used: Vec::new(),
            acquisitions: 0,
            returned: 0,
            buffer_accesses: Cell::new(0),
            kicks: 0,
            fail_mark_used: false,
        }
    }

    /// Queues a head as available without checking it.
    pub fn push_head(&mut self, head: u16) {
        self.avail.push_back(head);
    }
}

impl Virtqueue for MockQueue {
    fn depth(&self) -> u16 {
        self.slots.len() as u16
    }

    fn acquire_available(&mut self) -> Option<AvailableBuffer> {
        self.acquisitions += 1;
        let head = self.avail.pop_front()?;
        self.acquired = Some(head);
        let len = self.slots.get(head as usize).map_or(0, |s| s.len() as u32);
        Some(AvailableBuffer { head, len })
    }

    fn buffer(&self, head: u16) -> Option<&[u8]> {
        self.buffer_accesses.set(self.buffer_accesses.get() + 1);
        self.slots.get(head as usize).map(Vec::as_slice)
    }

    fn buffer_mut(&mut self, head: u16) -> Option<&mut [u8]> {
        self.buffer_accesses.set(self.buffer_accesses.get() + 1);
        self.slots.get_mut(head as usize).map(Vec::as_mut_slice)
    }

    fn return_unused(&mut self, head: u16) -> Result<(), VringError> {
        if self.acquired.take() != Some(head) {
            return Err(VringError::NotLastAcquired { head });
        }
        self.avail.push_front(head);
        self.returned += 1;
        Ok(())
    }

    fn mark_used(&mut self, head: u16, len: u32) -> Result<(), VringError> {
        if self.fail_mark_used {
            return Err(VringError::layout_mismatch("ring unmapped"));
        }
        if !self.is_valid_head(head) {
            return Err(VringError::InvalidHead {
                head: u32::from(head),
                depth: self.depth(),
            });
        }
        self.acquired = None;
        self.used.push((head, len));
        Ok(())
    }

    fn kick(&mut self) -> Kick {
        self.kicks += 1;
        Kick::Sent
    }
}

/// Both directions of a shared-memory link, device halves wrapped in a
/// transport and driver halves left for the test to play the host.
pub(crate) struct Link {
    _dir: TempDir,
    pub transport: Transport<DeviceQueue, DeviceQueue>,
    /// Host half of the coprocessor-to-host ring.
    pub host_rx: DriverQueue,
    /// Host half of the host-to-coprocessor ring.
    pub host_tx: DriverQueue,
    /// Notifications raised on the coprocessor-to-host ring.
    pub tx_kicks: Arc<AtomicUsize>,
    /// Notifications raised on the host-to-coprocessor ring.
    pub rx_kicks: Arc<AtomicUsize>,
}

impl Link {
    pub fn new(config: VringConfig) -> Self {
        let dir = tempdir().unwrap();
        let to_host_path = dir.path().join("vring0");
        let from_host_path = dir.path().join("vring1");
        rpmsg_vring::create(&to_host_path, &config).unwrap();
        rpmsg_vring::create(&from_host_path, &config).unwrap();

        let tx_kicks = Arc::new(AtomicUsize::new(0));
        let rx_kicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&tx_kicks);
        let to_host = DeviceQueue::open(&to_host_path)
            .unwrap()
            .with_notifier(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        let counter = Arc::clone(&rx_kicks);
        let from_host = DeviceQueue::open(&from_host_path)
            .unwrap()
            .with_notifier(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            });

        Self {
            transport: Transport::new(to_host, from_host),
            host_rx: DriverQueue::open(&to_host_path).unwrap(),
            host_tx: DriverQueue::open(&from_host_path).unwrap(),
            _dir: dir,
            tx_kicks,
            rx_kicks,
        }
    }
}
