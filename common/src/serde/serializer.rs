use tracing::trace;

use crate::error::{Error, Result};

/// Byte level writer. Every write either lands completely or fails without
/// touching the output.
#[rustfmt::skip]
pub trait Serializer {
    fn pos(&self) -> usize;
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;
    fn reserve(&mut self, length: usize) -> Result<usize>;
    fn execute_at<T>(&mut self, offset: usize, f: impl FnOnce(&mut SizedSerializer) -> Result<T>) -> Result<T>;

    fn write_bool(&mut self, data: bool) -> Result<()> { self.write_u8(data as u8) }
    fn write_u8(&mut self, data: u8) -> Result<()> { self.write_bytes(&[data]) }
    fn write_u16_be(&mut self, data: u16) -> Result<()> { self.write_bytes(&data.to_be_bytes()) }
    fn write_u16_le(&mut self, data: u16) -> Result<()> { self.write_bytes(&data.to_le_bytes()) }
    fn write_u32_be(&mut self, data: u32) -> Result<()> { self.write_bytes(&data.to_be_bytes()) }
    fn write_u32_le(&mut self, data: u32) -> Result<()> { self.write_bytes(&data.to_le_bytes()) }
    fn write_u64_be(&mut self, data: u64) -> Result<()> { self.write_bytes(&data.to_be_bytes()) }
    fn write_u64_le(&mut self, data: u64) -> Result<()> { self.write_bytes(&data.to_le_bytes()) }
    fn write_f32_be(&mut self, data: f32) -> Result<()> { self.write_bytes(&data.to_be_bytes()) }
    fn write_f32_le(&mut self, data: f32) -> Result<()> { self.write_bytes(&data.to_le_bytes()) }
    fn write_f64_be(&mut self, data: f64) -> Result<()> { self.write_bytes(&data.to_be_bytes()) }
    fn write_f64_le(&mut self, data: f64) -> Result<()> { self.write_bytes(&data.to_le_bytes()) }
}

/// Writes into a borrowed buffer of fixed size. Running out of room is
/// reported as [`Error::Overflow`].
pub struct SizedSerializer<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

/// Writes into an owned vector that starts small and doubles its capacity
/// whenever it fills up.
pub struct DynamicSerializer {
    buffer: Vec<u8>,
}

const INITIAL_CAPACITY: usize = 16;

impl<'a> SizedSerializer<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn claim(&mut self, length: usize) -> Result<usize> {
        let start = self.offset;
        let capacity = self.buffer.len();
        let end = start
            .checked_add(length)
            .filter(|&end| end <= capacity)
            .ok_or(Error::Overflow {
                needed: start.saturating_add(length),
                capacity,
            })?;

        self.offset = end;
        Ok(start)
    }
}

impl DynamicSerializer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Appends a single byte. Unlike the trait methods this can't fail, which
    /// is what the bit writer relies on.
    pub fn push(&mut self, byte: u8) {
        if self.buffer.len() == self.buffer.capacity() {
            let capacity = self.buffer.capacity().max(1) * 2;
            trace!(from = self.buffer.capacity(), to = capacity, "growing buffer");
            self.buffer.reserve_exact(capacity - self.buffer.len());
        }
        self.buffer.push(byte);
    }

    /// Makes room for `length` more bytes, doubling the capacity as often as
    /// needed. Lengths no allocation could hold are an overflow.
    fn grow_for(&mut self, length: usize) -> Result<()> {
        let (len, current) = (self.buffer.len(), self.buffer.capacity());
        let overflow = move || Error::Overflow {
            needed: len.saturating_add(length),
            capacity: current,
        };

        let needed = len.checked_add(length).ok_or_else(overflow)?;
        let mut capacity = current.max(1);
        if needed <= capacity {
            return Ok(());
        }

        while capacity < needed {
            capacity = capacity.checked_mul(2).unwrap_or(needed);
        }

        trace!(from = current, to = capacity, "growing buffer");
        self.buffer
            .try_reserve_exact(capacity - len)
            .map_err(|_| overflow())
    }
}

impl Serializer for SizedSerializer<'_> {
    fn pos(&self) -> usize {
        self.offset
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let start = self.claim(data.len())?;
        self.buffer[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn reserve(&mut self, length: usize) -> Result<usize> {
        self.claim(length)
    }

    fn execute_at<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut SizedSerializer) -> Result<T>,
    ) -> Result<T> {
        let end = self.offset;
        let mut ser = SizedSerializer::new(&mut self.buffer[offset.min(end)..end]);
        f(&mut ser)
    }
}

impl Serializer for DynamicSerializer {
    fn pos(&self) -> usize {
        self.buffer.len()
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.grow_for(data.len())?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn reserve(&mut self, length: usize) -> Result<usize> {
        let start = self.buffer.len();
        self.grow_for(length)?;
        self.buffer.resize(start + length, 0);
        Ok(start)
    }

    fn execute_at<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut SizedSerializer) -> Result<T>,
    ) -> Result<T> {
        let end = self.buffer.len();
        let mut ser = SizedSerializer::new(&mut self.buffer[offset.min(end)..]);
        f(&mut ser)
    }
}

impl Default for DynamicSerializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_overflow_writes_nothing() {
        let mut buffer = [0xAA; 5];
        let mut ser = SizedSerializer::new(&mut buffer);

        ser.write_u32_be(0x0102_0304).unwrap();
        let err = ser.write_u16_le(0xFFFF).unwrap_err();

        assert!(matches!(
            err,
            Error::Overflow {
                needed: 6,
                capacity: 5
            }
        ));
        assert_eq!(ser.pos(), 4);
        assert_eq!(buffer, [1, 2, 3, 4, 0xAA]);
    }

    #[test]
    fn huge_reserve_is_an_overflow() {
        let mut buffer = [0; 4];
        let mut ser = SizedSerializer::new(&mut buffer);
        ser.write_u8(1).unwrap();

        let err = ser.reserve(usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            Error::Overflow {
                needed: usize::MAX,
                capacity: 4
            }
        ));
        assert_eq!(ser.pos(), 1);

        let mut ser = DynamicSerializer::new();
        ser.write_u8(1).unwrap();
        assert!(matches!(
            ser.reserve(usize::MAX),
            Err(Error::Overflow { .. })
        ));
        assert!(matches!(
            ser.reserve(isize::MAX as usize),
            Err(Error::Overflow { .. })
        ));
        assert_eq!(ser.pos(), 1);
    }

    #[test]
    fn patch_reserved_length() {
        let mut ser = DynamicSerializer::new();
        let len_pos = ser.reserve(2).unwrap();
        ser.write_bytes(b"hello").unwrap();

        let len = (ser.pos() - len_pos - 2) as u16;
        ser.execute_at(len_pos, |ser| ser.write_u16_be(len)).unwrap();

        assert_eq!(ser.into_inner(), b"\x00\x05hello");
    }

    #[test]
    fn execute_at_is_bounded_by_written_bytes() {
        let mut buffer = [0; 8];
        let mut ser = SizedSerializer::new(&mut buffer);
        ser.reserve(2).unwrap();

        let err = ser.execute_at(0, |ser| ser.write_u32_be(1)).unwrap_err();
        assert!(matches!(err, Error::Overflow { .. }));
    }

    #[test]
    fn dynamic_capacity_doubles() {
        let mut ser = DynamicSerializer::new();
        assert!(ser.capacity() >= INITIAL_CAPACITY);

        for i in 0..=INITIAL_CAPACITY as u8 {
            ser.push(i);
        }

        assert!(ser.capacity() >= INITIAL_CAPACITY * 2);
        let out = ser.into_inner();
        assert_eq!(out.len(), INITIAL_CAPACITY + 1);
        assert!(out.iter().enumerate().all(|(i, &b)| b == i as u8));
    }
}
