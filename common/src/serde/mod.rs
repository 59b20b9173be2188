mod deserializer;
mod growable;
mod serializer;

pub use deserializer::{Deserializer, ReaderDeserializer, SliceDeserializer};
pub use growable::GrowableBuffer;
pub use serializer::{DynamicSerializer, Serializer, SizedSerializer};
