//! Primitive field codec shared by values and records.
//!
//! Every multi-byte integer and float is written in the host's native byte
//! order. Files are therefore only portable between machines of the same
//! endianness; a big-endian host cannot read a log written on a
//! little-endian one.
//!
//! Byte strings are a `u32` length followed by the raw bytes, with no
//! terminator and no escaping.

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Incomplete record")]
    Incomplete,
    #[error("Unknown value tag: {0}")]
    UnknownTag(u8),
    #[error("Invalid boolean byte: {0}")]
    InvalidBoolean(u8),
    #[error("Unknown record kind: {0}")]
    UnknownKind(u8),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Length {0} does not fit in a u32 prefix")]
    LengthOverflow(usize),
}

/// Converts an in-memory length to its on-disk `u32` prefix.
pub(crate) fn len_prefix(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::LengthOverflow(len))
}

/// Writes a length-prefixed byte string.
pub(crate) fn put_bytes(buf: &mut BytesMut, bytes: &[u8]) -> Result<(), EncodeError> {
    buf.put_u32_ne(len_prefix(bytes.len())?);
    buf.put_slice(bytes);
    Ok(())
}

pub(crate) fn get_u8(data: &mut &[u8]) -> Result<u8, DecodeError> {
    ensure(data, 1)?;
    Ok(data.get_u8())
}

pub(crate) fn get_u32(data: &mut &[u8]) -> Result<u32, DecodeError> {
    ensure(data, 4)?;
    Ok(data.get_u32_ne())
}

pub(crate) fn get_i64(data: &mut &[u8]) -> Result<i64, DecodeError> {
    ensure(data, 8)?;
    Ok(data.get_i64_ne())
}

pub(crate) fn get_f64(data: &mut &[u8]) -> Result<f64, DecodeError> {
    ensure(data, 8)?;
    Ok(data.get_f64_ne())
}

/// Reads a length-prefixed byte string, borrowing it from `data`.
pub(crate) fn get_bytes<'a>(data: &mut &'a [u8]) -> Result<&'a [u8], DecodeError> {
    let len = get_u32(data)? as usize;
    ensure(data, len)?;
    let whole: &'a [u8] = *data;
    let (bytes, rest) = whole.split_at(len);
    *data = rest;
    Ok(bytes)
}

/// Advances past a length-prefixed byte string without copying it.
pub(crate) fn skip_bytes(data: &mut &[u8]) -> Result<(), DecodeError> {
    let len = get_u32(data)? as usize;
    skip(data, len)
}

pub(crate) fn skip(data: &mut &[u8], len: usize) -> Result<(), DecodeError> {
    ensure(data, len)?;
    data.advance(len);
    Ok(())
}

fn ensure(data: &[u8], len: usize) -> Result<(), DecodeError> {
    if data.len() < len {
        return Err(DecodeError::Incomplete);
    }
    Ok(())
}
