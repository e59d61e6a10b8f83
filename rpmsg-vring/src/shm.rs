//! Shared memory region backing a ring.

use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::atomic::AtomicU16;

/// Shared memory region backed by a file.
///
/// Each side of a link maps the same file independently. The region is the
/// only state the two sides share.
pub struct SharedMemory {
    mmap: MmapMut,
}

impl SharedMemory {
    /// Creates (or truncates) the file at `path` to `size` zeroed bytes and
    /// maps it.
    ///
    /// # Errors
    /// Returns IO error if file operations fail.
    pub fn create(path: &Path, size: usize) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        file.set_len(size as u64)?;

        let mut mmap = unsafe { MmapOptions::new().map_mut(&file)? };
        mmap.fill(0);

        Ok(Self { mmap })
    }

    /// Maps an existing region at its current file size. The file is never
    /// resized, so a peer's layout is left as it is.
    ///
    /// # Errors
    /// Returns IO error if file operations fail.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let mmap = unsafe { MmapOptions::new().map_mut(&file)? };

        Ok(Self { mmap })
    }

    /// Returns the size of the shared memory region.
    #[must_use]
    pub fn size(&self) -> usize {
        self.mmap.len()
    }

    /// Returns a slice of the shared memory.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// Returns a mutable slice of the shared memory.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap
    }

    /// Returns the 16-bit index word at `offset` as an atomic.
    ///
    /// Ring index and flag words are written by one side and read by the
    /// other, so they are only ever accessed through this.
    ///
    /// # Panics
    /// Panics if `offset` is odd or out of range.
    #[must_use]
    pub fn atomic_u16(&self, offset: usize) -> &AtomicU16 {
        assert!(offset % 2 == 0 && offset + 2 <= self.mmap.len());
        // The map is page aligned, so an even offset is 2-byte aligned, and
        // the word stays inside the mapping for the lifetime of `&self`.
        unsafe { &*(self.mmap.as_ptr().add(offset) as *const AtomicU16) }
    }

    /// Flushes changes to the backing file.
    ///
    /// # Errors
    /// Returns IO error if flush fails.
    pub fn flush(&self) -> std::io::Result<()> {
        self.mmap.flush()
    }
}

impl std::fmt::Debug for SharedMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMemory")
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use tempfile::tempdir;

    #[test]
    fn test_shared_memory_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_shm");

        let mut shm = SharedMemory::create(&path, 4096).unwrap();
        assert_eq!(shm.size(), 4096);
        assert!(shm.as_slice().iter().all(|&b| b == 0));

        shm.as_mut_slice()[0] = 0xAB;
        assert_eq!(shm.as_slice()[0], 0xAB);
        shm.flush().unwrap();
    }

    #[test]
    fn test_shared_memory_open_sees_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_shm_open");

        let mut first = SharedMemory::create(&path, 1024).unwrap();
        let second = SharedMemory::open(&path).unwrap();
        assert_eq!(second.size(), 1024);

        first.as_mut_slice()[10] = 0x42;
        assert_eq!(second.as_slice()[10], 0x42);
    }

    #[test]
    fn test_atomic_u16_is_shared() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_shm_atomic");

        let first = SharedMemory::create(&path, 64).unwrap();
        let second = SharedMemory::open(&path).unwrap();

        first.atomic_u16(8).store(0xBEEF, Ordering::Release);
        assert_eq!(second.atomic_u16(8).load(Ordering::Acquire), 0xBEEF);
        assert_eq!(&second.as_slice()[8..10], &0xBEEFu16.to_le_bytes());
    }

    #[test]
    #[should_panic]
    fn test_atomic_u16_rejects_odd_offset() {
        let dir = tempdir().unwrap();
        let shm = SharedMemory::create(&dir.path().join("odd"), 64).unwrap();
        let _ = shm.atomic_u16(3);
    }

    #[test]
    fn test_shared_memory_debug() {
        let dir = tempdir().unwrap();
        let shm = SharedMemory::create(&dir.path().join("dbg"), 128).unwrap();
        let debug_str = format!("{:?}", shm);
        assert!(debug_str.contains("SharedMemory"));
        assert!(debug_str.contains("128"));
    }
}
