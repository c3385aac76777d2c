//! High-level record store API.
//!
//! A [`RoverDb`] owns one append-only file. Writes always land at the end of
//! the file; reads replay the whole file from offset 0.
//!
//! # Concurrency
//!
//! The engine is single-actor: one handle, used by one logical owner at a
//! time. Every method takes `&mut self`, and nothing in the engine locks the
//! file. Two engines (or two processes) appending to the same path will
//! interleave their records unpredictably. Callers that need shared access
//! should put the engine behind a mutex or hand it to a single owning task.

use crate::error::{Error, Result};
use crate::reader::{ReadError, RecordReader};
use crate::record::{self, Scanned};
use crate::row::Row;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Fsync policy applied after each appended record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FsyncPolicy {
    /// Fsync after every record.
    Always,
    /// Fsync at most once per window, piggybacking on appends.
    Batch(Duration),
    /// Never fsync; the OS decides when appended bytes reach disk.
    #[default]
    Os,
}

/// Configuration for a [`RoverDb`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path of the log file. Created on first open if absent.
    pub path: PathBuf,
    /// Fsync policy for appends (default: `Os`).
    pub fsync_policy: FsyncPolicy,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("rover.rdb"),
            fsync_policy: FsyncPolicy::default(),
        }
    }
}

/// Summary of a single table scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Complete records decoded, of any kind or table.
    pub records_scanned: u64,
    /// Rows returned for the requested table.
    pub rows_matched: u64,
    /// Length of the valid prefix of the file.
    pub valid_bytes: u64,
    /// Offset of the first byte that could not be decoded, if the scan
    /// stopped before end of file.
    pub truncated_at: Option<u64>,
}

struct OpenLog {
    file: File,
    last_sync: Option<Instant>,
}

enum State {
    Unopened,
    Open(OpenLog),
    Closed,
}

/// Append-only record store bound to a single file.
///
/// # Example
///
/// ```no_run
/// use rover_db::{Row, RoverDb};
///
/// fn main() -> Result<(), rover_db::Error> {
///     let mut db = RoverDb::new("db.rdb");
///     db.open()?;
///
///     db.create_table("users")?;
///     db.insert_row("users", &Row::new().with("id", 1i64).with("name", "Ann"))?;
///
///     for row in db.scan_table("users")? {
///         println!("{}", row.get_int("id")?);
///     }
///
///     db.close();
///     Ok(())
/// }
/// ```
pub struct RoverDb {
    config: DbConfig,
    state: State,
}

impl RoverDb {
    /// Creates an unopened engine for `path` with default settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_config(DbConfig {
            path: path.into(),
            ..Default::default()
        })
    }

    /// Creates an unopened engine from a full configuration.
    pub fn with_config(config: DbConfig) -> Self {
        Self {
            config,
            state: State::Unopened,
        }
    }

    /// Opens the log file, creating it if absent.
    ///
    /// Existing content is never truncated. Reopening after [`RoverDb::close`]
    /// resumes appending at the end of the file. Calling this while already
    /// open does nothing.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.config.path)?;
        let len = file.metadata()?.len();

        debug!(path = %self.config.path.display(), len, "opened log");
        self.state = State::Open(OpenLog {
            file,
            last_sync: None,
        });
        Ok(())
    }

    /// Releases the file handle. Closing an unopened or closed engine is a
    /// no-op.
    pub fn close(&mut self) {
        if let State::Open(_) = std::mem::replace(&mut self.state, State::Closed) {
            debug!(path = %self.config.path.display(), "closed log");
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Appends a table-creation record.
    ///
    /// The record is advisory: duplicates are allowed and scans ignore it.
    pub fn create_table(&mut self, name: &str) -> Result<()> {
        let encoded = record::encode_create_table(name.as_bytes())?;
        trace!(table = name, len = encoded.len(), "append create_table");
        self.append(&encoded)
    }

    /// Appends a row-insertion record for `table`.
    ///
    /// Columns are written in the row's iteration order. A failed write may
    /// leave a partial record at the end of the file; scans stop in front of
    /// it.
    pub fn insert_row(&mut self, table: &str, row: &Row) -> Result<()> {
        let encoded = record::encode_insert_row(table.as_bytes(), row)?;
        trace!(table, columns = row.len(), len = encoded.len(), "append insert_row");
        self.append(&encoded)
    }

    /// Inserts `rows` in order, stopping at the first failure.
    ///
    /// Rows appended before the failure stay in the file.
    pub fn bulk_insert(&mut self, table: &str, rows: &[Row]) -> Result<()> {
        self.log_mut()?;
        for row in rows {
            self.insert_row(table, row)?;
        }
        Ok(())
    }

    /// Returns every row inserted into `table`, in append order.
    ///
    /// See [`RoverDb::scan_table_with_stats`].
    pub fn scan_table(&mut self, table: &str) -> Result<Vec<Row>> {
        self.scan_table_with_stats(table).map(|(rows, _)| rows)
    }

    /// Replays the whole file from offset 0, collecting rows of `table`.
    ///
    /// A truncated or malformed record ends the scan: the rows decoded before
    /// it are returned and its offset is reported in
    /// [`ScanStats::truncated_at`]. Read errors from the file system are
    /// returned as [`Error::Io`].
    pub fn scan_table_with_stats(&mut self, table: &str) -> Result<(Vec<Row>, ScanStats)> {
        let path = &self.config.path;
        let log = match &mut self.state {
            State::Open(log) => log,
            State::Unopened | State::Closed => return Err(Error::NotOpen),
        };
        log.file.seek(SeekFrom::Start(0))?;

        let mut reader = RecordReader::new(BufReader::new(&log.file));
        let mut rows = Vec::new();
        let mut stats = ScanStats::default();

        loop {
            match reader.next_with(|data| record::decode_for_table(data, table.as_bytes())) {
                Ok(Some(scanned)) => {
                    stats.records_scanned += 1;
                    if let Scanned::Row(row) = scanned {
                        rows.push(row);
                    }
                }
                Ok(None) => break,
                Err(ReadError::Malformed { offset, source }) => {
                    warn!(
                        path = %path.display(),
                        offset,
                        error = %source,
                        "scan stopped at invalid record"
                    );
                    stats.truncated_at = Some(offset);
                    break;
                }
                Err(ReadError::Io(e)) => return Err(Error::Io(e)),
            }
        }

        stats.rows_matched = rows.len() as u64;
        stats.valid_bytes = reader.offset();
        debug!(
            table,
            records = stats.records_scanned,
            rows = stats.rows_matched,
            "scan complete"
        );
        Ok((rows, stats))
    }

    /// Fsyncs the log file.
    pub fn sync(&mut self) -> Result<()> {
        let log = self.log_mut()?;
        log.file.sync_data()?;
        log.last_sync = Some(Instant::now());
        Ok(())
    }

    fn log_mut(&mut self) -> Result<&mut OpenLog> {
        match &mut self.state {
            State::Open(log) => Ok(log),
            State::Unopened | State::Closed => Err(Error::NotOpen),
        }
    }

    fn append(&mut self, encoded: &[u8]) -> Result<()> {
        let policy = self.config.fsync_policy;
        let log = self.log_mut()?;
        log.file.write_all(encoded)?;

        let should_sync = match policy {
            FsyncPolicy::Always => true,
            FsyncPolicy::Batch(window) => log.last_sync.map_or(true, |t| t.elapsed() >= window),
            FsyncPolicy::Os => false,
        };
        if should_sync {
            log.file.sync_data()?;
            log.last_sync = Some(Instant::now());
        }
        Ok(())
    }
}
