//! Fixed-size byte regions backed by a possibly shorter buffer.
//!
//! Cartridge memories have a logical size fixed by the board (16 KiB PRG
//! bank, 8 KiB CHR window) that the backing data does not always fill: CHR
//! RAM starts empty, and a padded PRG dump is shorter than its header says.
//! Indices past the buffer but inside the logical size read as `fill`.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("index {index:#06X} out of bounds for {size}-byte region")]
pub struct BoundsError {
    pub index: usize,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct ExtendedBytes {
    content: Vec<u8>,
    size: usize,
    fill: u8,
    writable: bool,
}

impl ExtendedBytes {
    /// Read-only region. Content beyond `size` is dropped.
    pub fn new(mut content: Vec<u8>, size: usize, fill: u8) -> Self {
        content.truncate(size);
        Self {
            content,
            size,
            fill,
            writable: false,
        }
    }

    /// Zero-initialised writable region of `size` bytes.
    pub fn ram(size: usize) -> Self {
        Self {
            content: vec![0; size],
            size,
            fill: 0,
            writable: true,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bytes actually backed by data.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn get(&self, index: usize) -> Result<u8, BoundsError> {
        if index >= self.size {
            return Err(BoundsError {
                index,
                size: self.size,
            });
        }
        Ok(self.content.get(index).copied().unwrap_or(self.fill))
    }

    /// Writes into the fill region, or into a read-only region, are dropped.
    pub fn set(&mut self, index: usize, value: u8) -> Result<(), BoundsError> {
        if index >= self.size {
            return Err(BoundsError {
                index,
                size: self.size,
            });
        }
        if self.writable {
            if let Some(slot) = self.content.get_mut(index) {
                *slot = value;
            }
        }
        Ok(())
    }

    /// Read with the index reduced modulo the logical size.
    pub fn get_wrapped(&self, index: usize) -> u8 {
        if self.size == 0 {
            return self.fill;
        }
        self.get(index % self.size).unwrap_or(self.fill)
    }
}
