//! Buffer traits and implementations for little-endian wire access.
//!
//! This module provides:
//! - [`ReadBuffer`] trait for read-only buffer access
//! - [`WriteBuffer`] trait for read-write buffer access
//! - [`AlignedBuffer`] for cache-line aligned, slot-sized scratch buffers
//!
//! The accessors index directly and panic when out of range. Code that
//! parses peer-controlled bytes checks lengths first (see
//! [`crate::header::RpmsgHeader::decode`]).

/// Trait for read-only buffer access with little-endian primitive reads.
///
/// Both sides of the shared-memory link are little-endian, so every
/// multi-byte field on the wire is little-endian.
pub trait ReadBuffer {
    /// Returns the buffer as a byte slice.
    fn as_slice(&self) -> &[u8];

    /// Returns the length of the buffer in bytes.
    fn len(&self) -> usize;

    /// Returns true if the buffer is empty.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies `W` bytes starting at `offset` into an array.
    #[inline(always)]
    fn get_array<const W: usize>(&self, offset: usize) -> [u8; W] {
        let mut out = [0u8; W];
        out.copy_from_slice(&self.as_slice()[offset..offset + W]);
        out
    }

    /// Reads one byte.
    #[inline(always)]
    fn get_u8(&self, offset: usize) -> u8 {
        self.as_slice()[offset]
    }

    /// Reads a little-endian u16.
    #[inline(always)]
    fn get_u16_le(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.get_array(offset))
    }

    /// Reads a little-endian u32.
    #[inline(always)]
    fn get_u32_le(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.get_array(offset))
    }

    /// Reads a little-endian u64 (descriptor addresses).
    #[inline(always)]
    fn get_u64_le(&self, offset: usize) -> u64 {
        u64::from_le_bytes(self.get_array(offset))
    }

    /// Borrows `len` bytes starting at `offset`.
    #[inline(always)]
    fn get_bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.as_slice()[offset..offset + len]
    }

    /// Reads a fixed-width, NUL-padded field and returns the bytes before
    /// the first NUL (or the whole field when no NUL is present).
    #[inline]
    fn get_cstr(&self, offset: usize, len: usize) -> &[u8] {
        let bytes = self.get_bytes(offset, len);
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(len);
        &bytes[..end]
    }
}

/// Trait for read-write buffer access with little-endian primitive writes.
pub trait WriteBuffer: ReadBuffer {
    /// Returns the buffer as a mutable byte slice.
    fn as_mut_slice(&mut self) -> &mut [u8];

    /// Writes one byte.
    #[inline(always)]
    fn put_u8(&mut self, offset: usize, value: u8) {
        self.as_mut_slice()[offset] = value;
    }

    /// Writes a little-endian u16.
    #[inline(always)]
    fn put_u16_le(&mut self, offset: usize, value: u16) {
        self.put_bytes(offset, &value.to_le_bytes());
    }

    /// Writes a little-endian u32.
    #[inline(always)]
    fn put_u32_le(&mut self, offset: usize, value: u32) {
        self.put_bytes(offset, &value.to_le_bytes());
    }

    /// Writes a little-endian u64.
    #[inline(always)]
    fn put_u64_le(&mut self, offset: usize, value: u64) {
        self.put_bytes(offset, &value.to_le_bytes());
    }

    /// Copies `src` to `offset`.
    #[inline(always)]
    fn put_bytes(&mut self, offset: usize, src: &[u8]) {
        self.as_mut_slice()[offset..offset + src.len()].copy_from_slice(src);
    }

    /// Writes `src` into a fixed-width field and NUL-pads the remainder.
    ///
    /// # Panics
    /// Panics if `src` is longer than `width`.
    #[inline]
    fn put_padded(&mut self, offset: usize, src: &[u8], width: usize) {
        self.put_bytes(offset, src);
        self.zero(offset + src.len(), width - src.len());
    }

    /// Zeros a region of the buffer.
    #[inline]
    fn zero(&mut self, offset: usize, len: usize) {
        self.as_mut_slice()[offset..offset + len].fill(0);
    }
}

macro_rules! slice_buffer {
    ($($ty:ty),*) => {$(
        impl ReadBuffer for $ty {
            #[inline(always)]
            fn as_slice(&self) -> &[u8] {
                self
            }

            #[inline(always)]
            fn len(&self) -> usize {
                <[u8]>::len(self)
            }
        }

        impl WriteBuffer for $ty {
            #[inline(always)]
            fn as_mut_slice(&mut self) -> &mut [u8] {
                self
            }
        }
    )*};
}

slice_buffer!([u8], Vec<u8>);

/// Cache-line aligned fixed-size buffer.
///
/// Sized with [`crate::RPMSG_BUF_SIZE`] it holds any payload a reference
/// configuration slot can carry, which is what a receiver should reserve.
#[repr(C, align(64))]
#[derive(Clone)]
pub struct AlignedBuffer<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> AlignedBuffer<N> {
    /// Creates a new zeroed aligned buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: [0u8; N] }
    }

    /// Returns the capacity of the buffer.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for AlignedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ReadBuffer for AlignedBuffer<N> {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    fn len(&self) -> usize {
        N
    }
}

impl<const N: usize> WriteBuffer for AlignedBuffer<N> {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> AsRef<[u8]> for AlignedBuffer<N> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> AsMut<[u8]> for AlignedBuffer<N> {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> std::fmt::Debug for AlignedBuffer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("capacity", &N)
            .finish()
    }
}
