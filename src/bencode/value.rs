use serde::Serialize;
use std::collections::BTreeMap;

/// A bencode value tree.
///
/// Dictionary keys are raw byte strings kept in a `BTreeMap`, so iteration
/// order is always ascending byte order no matter how entries were inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bytes(Vec<u8>),
    Integer(i64),
    List(Vec<Value>),
    Dictionary(BTreeMap<Vec<u8>, Value>),
}

impl Value {
    pub fn dict() -> Self {
        Self::Dictionary(BTreeMap::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, Value>> {
        match self {
            Self::Dictionary(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn list_get(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|list| list.get(index))
    }

    pub fn dict_get(&self, key: &str) -> Option<&Value> {
        self.as_dict().and_then(|dict| dict.get(key.as_bytes()))
    }

    /// Inserts `key` into a dictionary value, returning the previous entry.
    /// Does nothing on non-dictionary values.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) -> Option<Value> {
        match self {
            Self::Dictionary(m) => m.insert(key.into(), value.into()),
            _ => None,
        }
    }
}

impl std::ops::Index<&str> for Value {
    type Output = Value;
    fn index(&self, index: &str) -> &Self::Output {
        self.dict_get(index)
            .expect("value is not dictionary or key not found")
    }
}

impl std::ops::Index<usize> for Value {
    type Output = Value;
    fn index(&self, index: usize) -> &Self::Output {
        self.list_get(index)
            .expect("value is not list or index out of bound")
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Bytes(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        b.to_vec().into()
    }
}

impl From<Vec<Value>> for Value {
    fn from(b: Vec<Value>) -> Self {
        Self::List(b)
    }
}

impl From<BTreeMap<Vec<u8>, Value>> for Value {
    fn from(m: BTreeMap<Vec<u8>, Value>) -> Self {
        Self::Dictionary(m)
    }
}

macro_rules! impl_number {
    ($t:ty) => {
        impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Self::Integer(i64::from(n))
            }
        }
    };
    ($($t:ty),+ $(,)?) => {
        $(
            impl_number!($t);
        )+
    }
}

impl_number!(i8, i16, i32, i64);
impl_number!(u8, u16, u32);
impl_number!(bool);

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Bytes(bytes) => serializer.serialize_bytes(bytes),
            Value::Integer(num) => serializer.serialize_i64(*num),
            Value::List(arr) => serializer.collect_seq(arr),
            Value::Dictionary(obj) => serializer.collect_map(
                obj.iter()
                    .map(|(k, v)| (serde_bytes::Bytes::new(k), v)),
            ),
        }
    }
}
