use super::{check_bits, low_mask};
use crate::{
    error::Result,
    serde::{DynamicSerializer, Serializer},
};

/// Appends fields of up to 32 bits to a byte buffer, most significant bit
/// first. Call [`BitWriter::finish`] to flush the last partial byte.
pub struct BitWriter {
    bytes: DynamicSerializer,
    scratch: u8,
    scratch_bits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: DynamicSerializer::new(),
            scratch: 0,
            scratch_bits: 0,
        }
    }

    /// Writes the low `bits` bits of `value`. Anything above them is ignored.
    pub fn write(&mut self, value: u32, bits: u32) -> Result<()> {
        check_bits(bits)?;

        let mut remaining = bits;
        while remaining > 0 {
            let take = remaining.min(8 - self.scratch_bits);
            remaining -= take;

            let chunk = (value >> remaining) & low_mask(take);
            self.scratch = ((self.scratch as u32) << take | chunk) as u8;
            self.scratch_bits += take;

            if self.scratch_bits == 8 {
                self.bytes.push(self.scratch);
                self.scratch = 0;
                self.scratch_bits = 0;
            }
        }

        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write(value as u32, 1)
    }

    /// Total number of bits written so far.
    pub fn bit_len(&self) -> u64 {
        self.bytes.pos() as u64 * 8 + self.scratch_bits as u64
    }

    /// Ends the session. A partial last byte is kept, padded with zeros in
    /// its low bits.
    pub fn finish(mut self) -> Vec<u8> {
        if self.scratch_bits > 0 {
            let byte = self.scratch << (8 - self.scratch_bits);
            self.bytes.push(byte);
        }

        self.bytes.into_inner()
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}
