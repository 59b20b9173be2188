pub mod bits;
pub mod error;
pub mod serde;

pub use error::{Error, Result};
