//! Minimal embedded record store backed by a single append-only file.
//!
//! Implements a schemaless row store with:
//! - Tagged scalar values (integer, float, string, boolean)
//! - Table-creation and row-insertion records appended to one file
//! - Full-file sequential scans with no index
//! - Scans that stop cleanly at a truncated or corrupt tail
//! - Configurable fsync policies (always, batch, os)
//!
//! Numeric fields are stored in native byte order, so a log file is only
//! readable on hosts with the same endianness as the writer.

pub mod codec;
pub mod db;
pub mod error;
pub mod reader;
pub mod record;
pub mod row;
pub mod value;

pub use bstr::{BStr, BString};
pub use codec::{DecodeError, EncodeError};
pub use db::{DbConfig, FsyncPolicy, RoverDb, ScanStats};
pub use error::{Error, Result};
pub use record::{Record, RecordKind};
pub use row::Row;
pub use value::{Value, ValueType};
