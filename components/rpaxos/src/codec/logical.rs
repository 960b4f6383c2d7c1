use std::fmt;

use bytes::Bytes;
use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// LogicalValue is the value tree every message is built of before it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalValue {
    Nil,
    Int(u64),
    Bytes(Bytes),
    List(Vec<LogicalValue>),
}

impl LogicalValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, LogicalValue::Nil)
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            LogicalValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            LogicalValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[LogicalValue]> {
        match self {
            LogicalValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LogicalValue::Nil => "nil",
            LogicalValue::Int(_) => "int",
            LogicalValue::Bytes(_) => "bytes",
            LogicalValue::List(_) => "list",
        }
    }
}

impl From<u64> for LogicalValue {
    fn from(i: u64) -> Self {
        LogicalValue::Int(i)
    }
}

impl From<Bytes> for LogicalValue {
    fn from(b: Bytes) -> Self {
        LogicalValue::Bytes(b)
    }
}

impl From<&[u8]> for LogicalValue {
    fn from(b: &[u8]) -> Self {
        LogicalValue::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<LogicalValue>> for LogicalValue {
    fn from(l: Vec<LogicalValue>) -> Self {
        LogicalValue::List(l)
    }
}

impl<T: Into<LogicalValue>> From<Option<T>> for LogicalValue {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(x) => x.into(),
            None => LogicalValue::Nil,
        }
    }
}

impl Serialize for LogicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LogicalValue::Nil => serializer.serialize_unit(),
            LogicalValue::Int(i) => serializer.serialize_u64(*i),
            LogicalValue::Bytes(b) => serializer.serialize_bytes(b),
            LogicalValue::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for x in l.iter() {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
        }
    }
}

struct LogicalVisitor;

impl<'de> Visitor<'de> for LogicalVisitor {
    type Value = LogicalValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "nil, an unsigned int, bytes or a list")
    }

    fn visit_unit<E: de::Error>(self) -> Result<LogicalValue, E> {
        Ok(LogicalValue::Nil)
    }

    fn visit_none<E: de::Error>(self) -> Result<LogicalValue, E> {
        Ok(LogicalValue::Nil)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LogicalValue, E> {
        Ok(LogicalValue::Int(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LogicalValue, E> {
        if v < 0 {
            return Err(E::invalid_value(de::Unexpected::Signed(v), &self));
        }
        Ok(LogicalValue::Int(v as u64))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<LogicalValue, E> {
        Ok(LogicalValue::Bytes(Bytes::copy_from_slice(v)))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<LogicalValue, E> {
        Ok(LogicalValue::Bytes(Bytes::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LogicalValue, E> {
        Ok(LogicalValue::Bytes(Bytes::copy_from_slice(v.as_bytes())))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LogicalValue, A::Error> {
        let mut l = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(x) = seq.next_element()? {
            l.push(x);
        }
        Ok(LogicalValue::List(l))
    }
}

impl<'de> Deserialize<'de> for LogicalValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LogicalVisitor)
    }
}

/// Build a `LogicalValue::List` from values that convert into `LogicalValue`.
#[macro_export]
macro_rules! lv_list {
    [$($x:expr),* $(,)*] => {
        $crate::codec::LogicalValue::List(vec![$($crate::codec::LogicalValue::from($x)),*])
    }
}
