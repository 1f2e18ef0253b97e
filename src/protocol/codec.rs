//! AppMessage dictionary wire codec.
//!
//! Wire format (all integers little-endian):
//! ```text
//! ┌──────────┬───────────────────────────────────────────────┐
//! │ Count 1B │ Tuple × Count                                 │
//! └──────────┴───────────────────────────────────────────────┘
//!
//! Tuple:
//! ┌─────────┬─────────┬───────────┬─────────────────┐
//! │ Key 4B  │ Type 1B │ Length 2B │ Value (Length B)│
//! └─────────┴─────────┴───────────┴─────────────────┘
//! ```
//!
//! Type 0 is a byte array, 1 a NUL-terminated cstring (the NUL counts in
//! Length), 2 an unsigned and 3 a signed integer of width 1, 2 or 4.

use heapless::{String, Vec};

use super::dict::{Dictionary, Value, MAX_BYTES, MAX_CSTRING};
use crate::display::bounded_copy;
use crate::error::CodecError;

/// Upper bound on an encoded message, used to size transport buffers.
pub const MAX_MESSAGE_SIZE: usize = 1024;

const TUPLE_HEADER_SIZE: usize = 7;

const TYPE_BYTES: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

/// Encode `dict` into `buf`.  Returns the number of bytes written.
pub fn encode(dict: &Dictionary, buf: &mut [u8]) -> Result<usize, CodecError> {
    let mut w = Writer { buf, pos: 0 };
    let count = u8::try_from(dict.len()).map_err(|_| CodecError::TooManyTuples)?;
    w.put(&[count])?;

    for tuple in dict.iter() {
        w.put(&tuple.key.to_le_bytes())?;
        match &tuple.value {
            Value::Bytes(b) => w.put_tuple(TYPE_BYTES, b)?,
            Value::CString(s) => {
                let len = u16::try_from(s.len() + 1).map_err(|_| CodecError::StringTooLong)?;
                w.put(&[TYPE_CSTRING])?;
                w.put(&len.to_le_bytes())?;
                w.put(s.as_bytes())?;
                w.put(&[0])?;
            }
            Value::UInt8(v) => w.put_tuple(TYPE_UINT, &v.to_le_bytes())?,
            Value::UInt16(v) => w.put_tuple(TYPE_UINT, &v.to_le_bytes())?,
            Value::UInt32(v) => w.put_tuple(TYPE_UINT, &v.to_le_bytes())?,
            Value::Int8(v) => w.put_tuple(TYPE_INT, &v.to_le_bytes())?,
            Value::Int16(v) => w.put_tuple(TYPE_INT, &v.to_le_bytes())?,
            Value::Int32(v) => w.put_tuple(TYPE_INT, &v.to_le_bytes())?,
        }
    }

    Ok(w.pos)
}

/// Decode a complete message.  Trailing bytes after the last tuple are
/// ignored, matching the transport's fixed-size inbox.
pub fn decode(data: &[u8]) -> Result<Dictionary, CodecError> {
    let (&count, mut rest) = data.split_first().ok_or(CodecError::Truncated)?;
    let mut dict = Dictionary::new();

    for _ in 0..count {
        if rest.len() < TUPLE_HEADER_SIZE {
            return Err(CodecError::Truncated);
        }
        let key = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
        let ty = rest[4];
        let len = u16::from_le_bytes([rest[5], rest[6]]);
        rest = &rest[TUPLE_HEADER_SIZE..];

        let len_usize = usize::from(len);
        if rest.len() < len_usize {
            return Err(CodecError::Truncated);
        }
        let (raw, tail) = rest.split_at(len_usize);
        rest = tail;

        let value = match ty {
            TYPE_BYTES => {
                let kept = &raw[..raw.len().min(MAX_BYTES)];
                Value::Bytes(Vec::from_slice(kept).map_err(|()| CodecError::StringTooLong)?)
            }
            TYPE_CSTRING => Value::CString(decode_cstring(raw)?),
            TYPE_UINT => match *raw {
                [a] => Value::UInt8(a),
                [a, b] => Value::UInt16(u16::from_le_bytes([a, b])),
                [a, b, c, d] => Value::UInt32(u32::from_le_bytes([a, b, c, d])),
                _ => return Err(CodecError::InvalidLength(len)),
            },
            TYPE_INT => match *raw {
                [a] => Value::Int8(i8::from_le_bytes([a])),
                [a, b] => Value::Int16(i16::from_le_bytes([a, b])),
                [a, b, c, d] => Value::Int32(i32::from_le_bytes([a, b, c, d])),
                _ => return Err(CodecError::InvalidLength(len)),
            },
            other => return Err(CodecError::InvalidType(other)),
        };
        dict.push(key, value)?;
    }

    Ok(dict)
}

/// The cstring ends at the first NUL; a missing terminator is tolerated.
/// Text beyond the tuple capacity is cut at a character boundary so the
/// rest of the message still gets through.
fn decode_cstring(raw: &[u8]) -> Result<String<MAX_CSTRING>, CodecError> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let text = core::str::from_utf8(&raw[..end]).map_err(|_| CodecError::InvalidUtf8)?;
    Ok(bounded_copy(text))
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(CodecError::Truncated);
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn put_tuple(&mut self, ty: u8, value: &[u8]) -> Result<(), CodecError> {
        let len = u16::try_from(value.len()).map_err(|_| CodecError::StringTooLong)?;
        self.put(&[ty])?;
        self.put(&len.to_le_bytes())?;
        self.put(value)
    }
}
