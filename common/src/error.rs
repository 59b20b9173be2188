use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A bit width outside of `0..=32` was passed to a read or write.
    #[error("invalid bit count {bits}, must be between 0 and 32")]
    InvalidBitCount { bits: u32 },

    /// The byte source ran out before a read could be satisfied.
    #[error("unexpected end of stream")]
    EndOfStream,

    /// A fixed size serializer could not fit a write.
    #[error("buffer overflow, needed {needed} bytes but capacity is {capacity}")]
    Overflow { needed: usize, capacity: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Lets [`crate::serde::GrowableBuffer`] tell an out of space condition apart
/// from a real failure, so fill callbacks can use their own error types.
pub trait OverflowSignal {
    fn is_overflow(&self) -> bool;
}

impl OverflowSignal for Error {
    fn is_overflow(&self) -> bool {
        matches!(self, Error::Overflow { .. })
    }
}

impl OverflowSignal for anyhow::Error {
    fn is_overflow(&self) -> bool {
        self.downcast_ref::<Error>()
            .is_some_and(OverflowSignal::is_overflow)
    }
}
