//! Growable block buffer between the byte source and the decoder.
//!
//! Filled in blocks; the unread suffix is compacted to the front before
//! each fill rather than copied into a separate accumulator, and capacity
//! doubles only when a fill finds no free space even after compaction.

use std::io::{self, Read};

const INITIAL_CAPACITY: usize = 4096;

#[derive(Debug)]
pub(crate) struct ByteBuffer {
    data: Vec<u8>,
    /// Read position: `data[start..end]` is unconsumed input.
    start: usize,
    /// Fill position.
    end: usize,
}

impl ByteBuffer {
    pub(crate) fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Smaller capacities are used by tests to force compaction and growth
    /// on short inputs.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(8)],
            start: 0,
            end: 0,
        }
    }

    /// The unconsumed bytes.
    pub(crate) fn unread(&self) -> &[u8] {
        &self.data[self.start..self.end]
    }

    /// Marks `n` bytes as consumed.
    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(self.start + n <= self.end);
        self.start += n;
    }

    /// Compacts, grows if still full, then reads one block from `source`.
    /// Returns the number of bytes read; zero means end of input.
    pub(crate) fn fill(&mut self, source: &mut impl Read) -> io::Result<usize> {
        if self.start > 0 {
            self.data.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        if self.end == self.data.len() {
            // A single token outgrew the buffer (a long string or number
            // straddling fill boundaries): double.
            self.data.resize(self.data.len() * 2, 0);
        }
        let read = source.read(&mut self.data[self.end..])?;
        self.end += read;
        Ok(read)
    }

    /// Drops the backing storage; used by `close()`.
    pub(crate) fn release(&mut self) {
        self.data = Vec::new();
        self.start = 0;
        self.end = 0;
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }
}
