use crate::codec::{DecodeError, EncodeError};
use crate::value::ValueType;
use bstr::BString;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database is not open")]
    NotOpen,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] DecodeError),
    #[error("Record too large: {0}")]
    Encode(#[from] EncodeError),
    #[error("Type mismatch for column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: BString,
        expected: ValueType,
        found: ValueType,
    },
    #[error("Column not found: {0}")]
    MissingColumn(BString),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
