//! Log record format.
//!
//! Record format:
//! - kind: u8 (1=create table, 2=insert row)
//! - table: u32 length, then bytes[length]
//! - insert row only:
//!   - column_count: u32
//!   - column_count times: name (u32 length, then bytes[length]), value
//!
//! Records carry no overall length prefix. The only way to find the start of
//! the next record is to parse the current one field by field, which is why
//! rows of other tables are still walked (but not materialized) during a
//! scan.

use crate::codec::{self, DecodeError, EncodeError};
use crate::row::Row;
use crate::value::Value;
use bstr::{BStr, BString};
use bytes::{BufMut, Bytes, BytesMut};

/// Record kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    CreateTable = 1,
    InsertRow = 2,
}

impl RecordKind {
    fn from_u8(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            1 => Ok(RecordKind::CreateTable),
            2 => Ok(RecordKind::InsertRow),
            v => Err(DecodeError::UnknownKind(v)),
        }
    }
}

/// A decoded log record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Advisory marker written by `create_table`. Has no effect on scans.
    CreateTable { table: BString },
    InsertRow { table: BString, row: Row },
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::CreateTable { .. } => RecordKind::CreateTable,
            Record::InsertRow { .. } => RecordKind::InsertRow,
        }
    }

    pub fn table(&self) -> &BStr {
        match self {
            Record::CreateTable { table } | Record::InsertRow { table, .. } => BStr::new(table),
        }
    }

    pub fn encode(&self) -> Result<Bytes, EncodeError> {
        match self {
            Record::CreateTable { table } => encode_create_table(table),
            Record::InsertRow { table, row } => encode_insert_row(table, row),
        }
    }

    /// Decodes a record from the front of `data`.
    ///
    /// Returns the record and the number of bytes it occupied.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut cursor = data;
        let kind = RecordKind::from_u8(codec::get_u8(&mut cursor)?)?;
        let table = BString::from(codec::get_bytes(&mut cursor)?);

        let record = match kind {
            RecordKind::CreateTable => Record::CreateTable { table },
            RecordKind::InsertRow => Record::InsertRow {
                table,
                row: decode_columns(&mut cursor)?,
            },
        };

        Ok((record, data.len() - cursor.len()))
    }
}

/// Outcome of decoding one record on behalf of a single-table scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Scanned {
    /// A table-creation marker.
    Marker,
    /// A row belonging to the requested table.
    Row(Row),
    /// A row belonging to some other table. Its columns were walked but not kept.
    Skipped,
}

/// Decodes a record from the front of `data`, materializing the row only
/// when it belongs to `table`.
///
/// Returns the outcome and the number of bytes the record occupied.
pub fn decode_for_table(data: &[u8], table: &[u8]) -> Result<(Scanned, usize), DecodeError> {
    let mut cursor = data;
    let kind = RecordKind::from_u8(codec::get_u8(&mut cursor)?)?;
    let stored_table = codec::get_bytes(&mut cursor)?;

    let scanned = match kind {
        RecordKind::CreateTable => Scanned::Marker,
        RecordKind::InsertRow if stored_table == table => Scanned::Row(decode_columns(&mut cursor)?),
        RecordKind::InsertRow => {
            skip_columns(&mut cursor)?;
            Scanned::Skipped
        }
    };

    Ok((scanned, data.len() - cursor.len()))
}

pub(crate) fn encode_create_table(table: &[u8]) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::with_capacity(1 + 4 + table.len());
    buf.put_u8(RecordKind::CreateTable as u8);
    codec::put_bytes(&mut buf, table)?;
    Ok(buf.freeze())
}

pub(crate) fn encode_insert_row(table: &[u8], row: &Row) -> Result<Bytes, EncodeError> {
    let body: usize = row
        .columns()
        .map(|(name, value)| 4 + name.len() + value.encoded_len())
        .sum();
    let mut buf = BytesMut::with_capacity(1 + 4 + table.len() + 4 + body);

    buf.put_u8(RecordKind::InsertRow as u8);
    codec::put_bytes(&mut buf, table)?;
    buf.put_u32_ne(codec::len_prefix(row.len())?);
    for (name, value) in row.columns() {
        codec::put_bytes(&mut buf, name)?;
        value.encode(&mut buf)?;
    }

    Ok(buf.freeze())
}

fn decode_columns(cursor: &mut &[u8]) -> Result<Row, DecodeError> {
    let count = codec::get_u32(cursor)?;
    // The count comes off disk; don't let a corrupt value drive the allocation.
    let mut row = Row::with_capacity((count as usize).min(cursor.len()));
    for _ in 0..count {
        let name = BString::from(codec::get_bytes(cursor)?);
        let value = Value::decode(cursor)?;
        row.insert_raw(name, value);
    }
    Ok(row)
}

fn skip_columns(cursor: &mut &[u8]) -> Result<(), DecodeError> {
    let count = codec::get_u32(cursor)?;
    for _ in 0..count {
        codec::skip_bytes(cursor)?;
        Value::skip(cursor)?;
    }
    Ok(())
}
