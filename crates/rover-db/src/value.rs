//! Typed scalar values and their tag + payload encoding.
//!
//! Value format:
//! - tag: u8 (1=integer, 2=float, 3=string, 4=boolean)
//! - payload:
//!   - integer: i64 (native endian)
//!   - float: f64 (native endian)
//!   - string: u32 length, then bytes[length]
//!   - boolean: u8 (0 or 1)
//!
//! Every encoded value is at least one byte long, so a decoder always makes
//! progress or reports truncation.

use crate::codec::{self, DecodeError, EncodeError};
use bstr::{BStr, BString};
use bytes::{BufMut, BytesMut};
use std::fmt;

/// Discriminant written ahead of every value payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Reserved. Never written, and rejected when read.
    None = 0,
    Integer = 1,
    Float = 2,
    String = 3,
    Boolean = 4,
}

impl ValueType {
    fn from_tag(tag: u8) -> Result<Self, DecodeError> {
        match tag {
            1 => Ok(ValueType::Integer),
            2 => Ok(ValueType::Float),
            3 => Ok(ValueType::String),
            4 => Ok(ValueType::Boolean),
            v => Err(DecodeError::UnknownTag(v)),
        }
    }

    fn to_tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::None => "none",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// A single column value.
///
/// Strings are carried as [`BString`]: UTF-8 by convention, but never
/// validated, so arbitrary bytes survive a write/read cycle unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(BString),
    Boolean(bool),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Boolean(_) => ValueType::Boolean,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&BStr> {
        match self {
            Value::String(v) => Some(BStr::new(v)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Appends the tag byte and payload to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), EncodeError> {
        buf.put_u8(self.value_type().to_tag());
        match self {
            Value::Integer(v) => buf.put_i64_ne(*v),
            Value::Float(v) => buf.put_f64_ne(*v),
            Value::String(v) => codec::put_bytes(buf, v)?,
            Value::Boolean(v) => buf.put_u8(u8::from(*v)),
        }
        Ok(())
    }

    /// Number of bytes [`Value::encode`] writes for this value.
    pub fn encoded_len(&self) -> usize {
        1 + match self {
            Value::Integer(_) | Value::Float(_) => 8,
            Value::String(v) => 4 + v.len(),
            Value::Boolean(_) => 1,
        }
    }

    /// Decodes one value from the front of `data`, advancing it past the
    /// consumed bytes.
    ///
    /// The tag is validated before any payload byte is read.
    pub fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let value_type = ValueType::from_tag(codec::get_u8(data)?)?;
        let value = match value_type {
            ValueType::Integer => Value::Integer(codec::get_i64(data)?),
            ValueType::Float => Value::Float(codec::get_f64(data)?),
            ValueType::String => Value::String(BString::from(codec::get_bytes(data)?)),
            ValueType::Boolean => Value::Boolean(decode_bool(codec::get_u8(data)?)?),
            ValueType::None => return Err(DecodeError::UnknownTag(0)),
        };
        Ok(value)
    }

    /// Advances `data` past one encoded value without materializing it.
    ///
    /// Applies the same validation as [`Value::decode`].
    pub fn skip(data: &mut &[u8]) -> Result<(), DecodeError> {
        match ValueType::from_tag(codec::get_u8(data)?)? {
            ValueType::Integer | ValueType::Float => codec::skip(data, 8),
            ValueType::String => codec::skip_bytes(data),
            ValueType::Boolean => decode_bool(codec::get_u8(data)?).map(drop),
            ValueType::None => Err(DecodeError::UnknownTag(0)),
        }
    }
}

fn decode_bool(byte: u8) -> Result<bool, DecodeError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        v => Err(DecodeError::InvalidBoolean(v)),
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(BString::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(BString::from(v))
    }
}

impl From<BString> for Value {
    fn from(v: BString) -> Self {
        Value::String(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::String(BString::from(v))
    }
}
