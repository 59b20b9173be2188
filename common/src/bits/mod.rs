//! Packing of values narrower than a byte. Fields are written most
//! significant bit first with no padding between them; only the very last
//! byte of a stream is padded, with zeros in its low bits.

mod reader;
mod width;
mod writer;

pub use reader::{BitReader, ByteSource, FnSource};
pub use width::{minimum_bits, pop_count};
pub use writer::BitWriter;

use crate::error::{Error, Result};

/// Widest field a single read or write can carry.
pub const MAX_BITS: u32 = 32;

fn check_bits(bits: u32) -> Result<()> {
    if bits > MAX_BITS {
        return Err(Error::InvalidBitCount { bits });
    }
    Ok(())
}

/// Mask covering the low `bits` bits, for `bits` in `0..=8`.
fn low_mask(bits: u32) -> u32 {
    (1 << bits) - 1
}
