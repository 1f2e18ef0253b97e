//! Key/value message dictionary.
//!
//! Every message exchanged with the phone is a small dictionary of numeric
//! keys to typed values.  Integer tuples remember their wire width so a
//! decoded message re-encodes byte-for-byte.

use heapless::{String, Vec};

use super::keys::Key;
use crate::error::CodecError;

/// Maximum tuples in one message.
pub const MAX_TUPLES: usize = 16;

/// Maximum cstring length in bytes, excluding the trailing NUL.
pub const MAX_CSTRING: usize = 255;

/// Maximum byte-array length.
pub const MAX_BYTES: usize = 64;

/// A typed tuple value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bytes(Vec<u8, MAX_BYTES>),
    CString(String<MAX_CSTRING>),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Int8(i8),
    Int16(i16),
    Int32(i32),
}

impl Value {
    /// Integer value widened to `i32`, whatever width the peer used.
    /// `u32` values are reinterpreted, so the all-ones sentinel reads as -1.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Self::UInt8(v) => Some(i32::from(v)),
            Self::UInt16(v) => Some(i32::from(v)),
            Self::UInt32(v) => Some(v as i32),
            Self::Int8(v) => Some(i32::from(v)),
            Self::Int16(v) => Some(i32::from(v)),
            Self::Int32(v) => Some(v),
            Self::Bytes(_) | Self::CString(_) => None,
        }
    }

    /// Integer value as `u8`; wider values must fit.
    pub fn as_u8(&self) -> Option<u8> {
        self.as_i32().and_then(|v| u8::try_from(v).ok())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::CString(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub key: Key,
    pub value: Value,
}

/// An ordered, fixed-capacity message dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    tuples: Vec<Tuple, MAX_TUPLES>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self { tuples: Vec::new() }
    }

    /// Append a tuple.  Keys are not deduplicated; `find` returns the first.
    pub fn push(&mut self, key: Key, value: Value) -> Result<(), CodecError> {
        self.tuples
            .push(Tuple { key, value })
            .map_err(|_| CodecError::TooManyTuples)
    }

    pub fn write_int8(&mut self, key: Key, value: i8) -> Result<(), CodecError> {
        self.push(key, Value::Int8(value))
    }

    pub fn write_int32(&mut self, key: Key, value: i32) -> Result<(), CodecError> {
        self.push(key, Value::Int32(value))
    }

    pub fn write_uint8(&mut self, key: Key, value: u8) -> Result<(), CodecError> {
        self.push(key, Value::UInt8(value))
    }

    pub fn write_cstring(&mut self, key: Key, value: &str) -> Result<(), CodecError> {
        let s = String::try_from(value).map_err(|()| CodecError::StringTooLong)?;
        self.push(key, Value::CString(s))
    }

    pub fn find(&self, key: Key) -> Option<&Value> {
        self.tuples.iter().find(|t| t.key == key).map(|t| &t.value)
    }

    pub fn find_i32(&self, key: Key) -> Option<i32> {
        self.find(key).and_then(Value::as_i32)
    }

    pub fn find_str(&self, key: Key) -> Option<&str> {
        self.find(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}
