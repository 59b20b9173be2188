use std::io::Read;

use super::{check_bits, low_mask};
use crate::{
    error::{Error, Result},
    serde::{Deserializer, ReaderDeserializer, SliceDeserializer},
};

/// Supplies bytes to a [`BitReader`] one at a time.
pub trait ByteSource {
    /// Returns the next byte, or [`Error::EndOfStream`] once exhausted.
    fn next_byte(&mut self) -> Result<u8>;

    /// Bytes left, for sources that know. Lets the reader fail a read up
    /// front instead of partway through.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

/// Adapts a closure returning `None` when it runs dry.
pub struct FnSource<F>(F);

impl<F: FnMut() -> Option<u8>> ByteSource for FnSource<F> {
    fn next_byte(&mut self) -> Result<u8> {
        (self.0)().ok_or(Error::EndOfStream)
    }
}

impl ByteSource for SliceDeserializer<'_> {
    fn next_byte(&mut self) -> Result<u8> {
        self.read_u8()
    }

    fn remaining(&self) -> Option<usize> {
        Deserializer::remaining(self)
    }
}

impl<T: Read> ByteSource for ReaderDeserializer<T> {
    fn next_byte(&mut self) -> Result<u8> {
        self.read_u8()
    }
}

/// Reads back fields written by [`super::BitWriter`], given the same
/// sequence of widths.
pub struct BitReader<S> {
    source: S,
    scratch: u8,
    scratch_bits: u32,
    bit_pos: u64,
}

impl<'a> BitReader<SliceDeserializer<'a>> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_source(SliceDeserializer::new(buffer))
    }
}

impl<F: FnMut() -> Option<u8>> BitReader<FnSource<F>> {
    pub fn from_fn(next: F) -> Self {
        Self::with_source(FnSource(next))
    }
}

impl<S: ByteSource> BitReader<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            scratch: 0,
            scratch_bits: 0,
            bit_pos: 0,
        }
    }

    /// Reads a `bits` wide field. On failure the reader's own state is left
    /// as it was, though bytes already pulled from a source that can't report
    /// its length are gone.
    pub fn read(&mut self, bits: u32) -> Result<u32> {
        check_bits(bits)?;

        if let Some(remaining) = self.source.remaining() {
            let available = self.scratch_bits as usize + remaining * 8;
            if bits as usize > available {
                return Err(Error::EndOfStream);
            }
        }

        let (mut scratch, mut scratch_bits) = (self.scratch, self.scratch_bits);
        let mut out = 0_u32;
        let mut remaining = bits;

        while remaining > 0 {
            if scratch_bits == 0 {
                scratch = self.source.next_byte()?;
                scratch_bits = 8;
            }

            let take = remaining.min(scratch_bits);
            scratch_bits -= take;
            remaining -= take;

            let chunk = (scratch as u32 >> scratch_bits) & low_mask(take);
            out = out << take | chunk;
        }

        self.scratch = scratch;
        self.scratch_bits = scratch_bits;
        self.bit_pos += bits as u64;
        Ok(out)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read(1)? != 0)
    }

    /// Total number of bits consumed so far.
    pub fn bit_pos(&self) -> u64 {
        self.bit_pos
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}
