mod decoder;
mod encoder;
mod ser;
mod value;
use crate::{Error, Result};
pub use decoder::Decoder;
pub use encoder::{encode, Encoder};
use serde::Serialize;
use ser::Serializer;
use std::io;
pub use value::Value;

/// Builds the value tree for any serializable type.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(&mut Serializer)
}

pub fn to_writer<T, W>(w: &mut W, value: &T) -> Result<()>
where
    T: ?Sized + Serialize,
    W: io::Write,
{
    let mut encoder = Encoder::new(w);
    encoder.encode(&to_value(value)?)?;
    Ok(())
}

pub fn to_bytes<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    Ok(encode(&to_value(value)?))
}

pub fn from_bytes<B>(input: &B) -> Result<Value>
where
    B: AsRef<[u8]> + ?Sized,
{
    Decoder::new(input.as_ref()).decode()
}
