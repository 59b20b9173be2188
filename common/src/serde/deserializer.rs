use std::{borrow::Cow, io::Read};

use crate::error::{Error, Result};

#[rustfmt::skip]
pub trait Deserializer {
    fn pos(&self) -> usize;
    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>>;

    /// Number of bytes left, if the backing store knows it.
    fn remaining(&self) -> Option<usize> { None }

    fn read_array<const LENGTH: usize>(&mut self) -> Result<[u8; LENGTH]> {
        let mut out = [0; LENGTH];
        out.copy_from_slice(&self.read_bytes(LENGTH)?);
        Ok(out)
    }

    fn read_bool(&mut self) -> Result<bool> { Ok(self.read_u8()? != 0) }
    fn read_u8(&mut self) -> Result<u8> { Ok(self.read_array::<1>()?[0]) }
    fn read_u16_be(&mut self) -> Result<u16> { Ok(u16::from_be_bytes(self.read_array()?)) }
    fn read_u16_le(&mut self) -> Result<u16> { Ok(u16::from_le_bytes(self.read_array()?)) }
    fn read_u32_be(&mut self) -> Result<u32> { Ok(u32::from_be_bytes(self.read_array()?)) }
    fn read_u32_le(&mut self) -> Result<u32> { Ok(u32::from_le_bytes(self.read_array()?)) }
    fn read_u64_be(&mut self) -> Result<u64> { Ok(u64::from_be_bytes(self.read_array()?)) }
    fn read_u64_le(&mut self) -> Result<u64> { Ok(u64::from_le_bytes(self.read_array()?)) }
    fn read_f32_be(&mut self) -> Result<f32> { Ok(f32::from_be_bytes(self.read_array()?)) }
    fn read_f32_le(&mut self) -> Result<f32> { Ok(f32::from_le_bytes(self.read_array()?)) }
    fn read_f64_be(&mut self) -> Result<f64> { Ok(f64::from_be_bytes(self.read_array()?)) }
    fn read_f64_le(&mut self) -> Result<f64> { Ok(f64::from_le_bytes(self.read_array()?)) }
}

pub struct SliceDeserializer<'a> {
    buffer: &'a [u8],
    offset: usize,
}

/// Pulls bytes out of any [`Read`] implementor, e.g. a file or socket.
pub struct ReaderDeserializer<T: Read> {
    reader: T,
    offset: usize,
}

impl<'a> SliceDeserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            offset: 0,
        }
    }

    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(length).ok_or(Error::EndOfStream)?;
        let value = self.buffer.get(self.offset..end).ok_or(Error::EndOfStream)?;
        self.offset = end;
        Ok(value)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

impl<T: Read> ReaderDeserializer<T> {
    pub fn new(reader: T) -> Self {
        Self { reader, offset: 0 }
    }

    pub fn into_inner(self) -> T {
        self.reader
    }

    /// Grows the output as bytes actually arrive, so a bogus length can't
    /// force a huge allocation up front.
    fn read_vec(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let read = (&mut self.reader)
            .take(length as u64)
            .read_to_end(&mut buf)?;

        self.offset += read;
        if read < length {
            return Err(Error::EndOfStream);
        }
        Ok(buf)
    }
}

impl Deserializer for SliceDeserializer<'_> {
    fn pos(&self) -> usize {
        self.offset
    }

    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>> {
        self.read_slice(length).map(Cow::Borrowed)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.buffer.len().saturating_sub(self.offset))
    }
}

impl<T: Read> Deserializer for ReaderDeserializer<T> {
    fn pos(&self) -> usize {
        self.offset
    }

    fn read_bytes(&mut self, length: usize) -> Result<Cow<'_, [u8]>> {
        self.read_vec(length).map(Cow::Owned)
    }
}
