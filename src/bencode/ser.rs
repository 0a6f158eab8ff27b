use super::{Error, Result, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Turns any `Serialize` type into a [`Value`] tree.
///
/// Only the shapes bencode can express are accepted. Floats, `None`, unit
/// types and non-string map keys fail with [`Error::UnsupportedType`].
pub struct Serializer;

fn unsupported(what: &str) -> Error {
    Error::UnsupportedType(what.to_string())
}

impl<'a> serde::Serializer for &'a mut Serializer {
    type Ok = Value;

    type Error = Error;

    type SerializeSeq = SeqSerializer<'a>;
    type SerializeTuple = SeqSerializer<'a>;
    type SerializeTupleStruct = SeqSerializer<'a>;
    type SerializeTupleVariant = SeqSerializer<'a>;
    type SerializeMap = MapSerializer<'a>;
    type SerializeStruct = MapSerializer<'a>;
    type SerializeStructVariant = MapSerializer<'a>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<Value> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        let v = i64::try_from(v).map_err(|_| unsupported("integer out of range"))?;
        self.serialize_i64(v)
    }

    fn serialize_f32(self, _v: f32) -> Result<Value> {
        Err(unsupported("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Value> {
        Err(unsupported("f64"))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        self.serialize_str(v.encode_utf8(&mut [0u8; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::Bytes(v.as_bytes().to_vec()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Err(unsupported("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Err(unsupported("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Err(unsupported(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut m = BTreeMap::new();
        m.insert(variant.as_bytes().to_vec(), value.serialize(self)?);
        Ok(Value::Dictionary(m))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqSerializer::new(self, len))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported(variant))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer::new(self))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(unsupported(variant))
    }
}

pub struct SeqSerializer<'a> {
    s: &'a mut Serializer,
    list: Vec<Value>,
}

impl<'a> SeqSerializer<'a> {
    fn new(s: &'a mut Serializer, len: Option<usize>) -> Self {
        Self {
            s,
            list: Vec::with_capacity(len.unwrap_or(0)),
        }
    }
}

macro_rules! impl_seq {
    ($tra:ty, $method:ident) => {
        impl<'a> $tra for SeqSerializer<'a> {
            type Ok = Value;
            type Error = Error;

            fn $method<T>(&mut self, value: &T) -> Result<()>
            where
                T: ?Sized + Serialize,
            {
                self.list.push(value.serialize(&mut *self.s)?);
                Ok(())
            }

            fn end(self) -> Result<Value> {
                Ok(Value::List(self.list))
            }
        }
    };
}

impl_seq!(serde::ser::SerializeSeq, serialize_element);
impl_seq!(serde::ser::SerializeTuple, serialize_element);
impl_seq!(serde::ser::SerializeTupleStruct, serialize_field);
impl_seq!(serde::ser::SerializeTupleVariant, serialize_field);

pub struct MapSerializer<'a> {
    s: &'a mut Serializer,
    map: BTreeMap<Vec<u8>, Value>,
    key: Option<Vec<u8>>,
}

impl<'a> MapSerializer<'a> {
    fn new(s: &'a mut Serializer) -> Self {
        Self {
            s,
            map: BTreeMap::new(),
            key: None,
        }
    }

    fn insert_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(&mut *self.s)?;
        self.map.insert(key.as_bytes().to_vec(), value);
        Ok(())
    }
}

impl<'a> serde::ser::SerializeMap for MapSerializer<'a> {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(&mut *self.s)? {
            Value::Bytes(k) => self.key = Some(k),
            _ => return Err(unsupported("dictionary key must be a byte string")),
        };
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::Serialize("value without key".into()))?;
        let value = value.serialize(&mut *self.s)?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Dictionary(self.map))
    }
}

impl<'a> serde::ser::SerializeStruct for MapSerializer<'a> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert_field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Dictionary(self.map))
    }
}

impl<'a> serde::ser::SerializeStructVariant for MapSerializer<'a> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert_field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Dictionary(self.map))
    }
}
