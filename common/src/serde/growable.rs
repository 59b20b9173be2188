//! Drives writers whose output size isn't known ahead of time. The fill
//! callback is run against a fixed size buffer; if it runs out of room the
//! buffer is replaced with one twice as large and the callback starts over.
//!
//! A [`GrowableBuffer`] is meant to be kept around by its owner and reused.
//! The allocation only ever grows, so after a few calls it settles at the
//! largest size needed and later calls don't retry at all.

use tracing::trace;

use super::{Serializer, SizedSerializer};
use crate::error::OverflowSignal;

const DEFAULT_CAPACITY: usize = 16;

pub struct GrowableBuffer {
    buffer: Vec<u8>,
    retries: u32,
}

impl GrowableBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity.max(1)],
            retries: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of times the last call to [`GrowableBuffer::produce`] had to
    /// grow the buffer.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Runs `fill` until it completes without overflowing and returns exactly
    /// the bytes it wrote on that final attempt. Errors that aren't an
    /// overflow are returned as is.
    ///
    /// `fill` has to fit eventually. One that keeps overflowing, e.g. by
    /// reserving more than can ever be allocated, doubles the buffer until the
    /// allocation fails.
    pub fn produce<E, F>(&mut self, mut fill: F) -> Result<&[u8], E>
    where
        E: OverflowSignal,
        F: FnMut(&mut SizedSerializer) -> Result<(), E>,
    {
        self.retries = 0;

        loop {
            self.buffer.fill(0);
            let mut ser = SizedSerializer::new(&mut self.buffer[..]);
            let attempt = fill(&mut ser).map(|_| ser.pos());

            match attempt {
                Ok(length) => return Ok(&self.buffer[..length]),
                Err(err) if err.is_overflow() => {
                    let capacity = self.buffer.len() * 2;
                    trace!(capacity, retry = self.retries + 1, "fill overflowed");

                    // Swapped rather than resized, nothing from the failed
                    // attempt is carried over.
                    self.buffer = vec![0; capacity];
                    self.retries += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn produce_vec<E, F>(&mut self, fill: F) -> Result<Vec<u8>, E>
    where
        E: OverflowSignal,
        F: FnMut(&mut SizedSerializer) -> Result<(), E>,
    {
        self.produce(fill).map(<[u8]>::to_vec)
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}
