//! Record store for regdesk.
//!
//! This module provides append-only CSV storage for accepted registrations.
//! The file is opened and closed per operation; no handle is kept between
//! calls and nothing is cached.

pub mod schema;

use std::fs::{File, OpenOptions};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::registration::Registration;
use schema::{header_matches, RecordRow, HEADERS};

pub use schema::RecordKeys;

/// Append-only storage for registrations.
///
/// Provides persistent storage in a single CSV file with support for:
/// - Lazy header initialization
/// - Appending one record at a time, synced to disk
/// - Reading every record back, skipping malformed rows
/// - Reading the uniqueness keys of every row, malformed or not
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// Path to the record file.
    path: PathBuf,
}

impl RecordStore {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first operation.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path to the record file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the record file with its header row if it does not exist.
    ///
    /// Creates parent directories as needed. An existing but empty file
    /// also gets the header. Safe to call before every operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created or the
    /// header cannot be written.
    pub fn ensure_initialized(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::storage_write(&self.path, e))?;

        let len = file
            .metadata()
            .map_err(|e| Error::storage_write(&self.path, e))?
            .len();
        if len > 0 {
            return Ok(());
        }

        self.write_synced(&file, |writer| writer.write_record(HEADERS))?;
        info!("Initialized record file at {}", self.path.display());
        Ok(())
    }

    /// Append one registration to the store.
    ///
    /// The row is flushed and synced to disk before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageWrite`] if the row cannot be written.
    pub fn append(&self, record: &Registration) -> Result<()> {
        self.ensure_initialized()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::storage_write(&self.path, e))?;

        let row = RecordRow::from(record);
        self.write_synced(&file, |writer| writer.serialize(&row))?;

        debug!("Appended registration {}", record.registration_id);
        Ok(())
    }

    /// Iterate over the stored records lazily.
    ///
    /// Each item is either a parsed registration or an
    /// [`Error::MalformedRecord`] for a row that could not be parsed.
    /// A missing file yields nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageRead`] if the file exists but cannot be
    /// opened, or [`Error::SchemaMismatch`] if its header is not the
    /// registration header.
    pub fn records(&self) -> Result<Records> {
        let Some((reader, headers)) = self.open_reader()? else {
            return Ok(Records::empty(self.path.clone()));
        };

        Ok(Records {
            path: self.path.clone(),
            headers,
            inner: Some(reader.into_records()),
        })
    }

    /// Read the identifier, email and phone of every stored row.
    ///
    /// Unlike [`RecordStore::read_all`], rows whose dates or column count
    /// are off still contribute their keys, so they keep holding their
    /// identifier, email and phone. Only rows the CSV reader cannot split
    /// at all, or with every key cell blank, are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn keys(&self) -> Result<Vec<RecordKeys>> {
        let Some((mut reader, _)) = self.open_reader()? else {
            return Ok(Vec::new());
        };

        let mut keys = Vec::new();
        for item in reader.records() {
            match item {
                Ok(record) => keys.extend(RecordKeys::from_record(&record)),
                Err(e) if e.is_io_error() => return Err(Error::storage_read(&self.path, e)),
                Err(e) => {
                    let line = e.position().map_or(0, csv::Position::line);
                    warn!(
                        "Unreadable record at line {} of {}: {}",
                        line,
                        self.path.display(),
                        e
                    );
                }
            }
        }
        Ok(keys)
    }

    /// Open the record file and check its header.
    ///
    /// Returns `None` for a missing file or one without a header row.
    fn open_reader(&self) -> Result<Option<(csv::Reader<File>, csv::StringRecord)>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Record file {} does not exist yet", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(Error::storage_read(&self.path, e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| Error::storage_read(&self.path, e))?
            .clone();

        if headers.is_empty() {
            return Ok(None);
        }
        if !header_matches(&headers) {
            return Err(Error::SchemaMismatch {
                path: self.path.clone(),
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        Ok(Some((reader, headers)))
    }

    /// Read every well-formed record.
    ///
    /// Malformed rows are logged and skipped so a single bad line cannot
    /// break listing or duplicate checks. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn read_all(&self) -> Result<Vec<Registration>> {
        let mut records = Vec::new();
        for item in self.records()? {
            match item {
                Ok(record) => records.push(record),
                Err(Error::MalformedRecord { line, message }) => {
                    warn!(
                        "Skipping malformed record at line {} of {}: {}",
                        line,
                        self.path.display(),
                        message
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Count stored rows, including rows that [`RecordStore::read_all`]
    /// skips as malformed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn count(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn stats(&self) -> Result<StoreStats> {
        let total_registrations = self.count()?;
        let records = self.read_all()?;

        let oldest_registration = records.iter().map(|r| r.created_at).min();
        let newest_registration = records.iter().map(|r| r.created_at).max();

        let file_size_bytes = std::fs::metadata(&self.path).map_or(0, |m| m.len());

        Ok(StoreStats {
            total_registrations,
            malformed_records: total_registrations.saturating_sub(records.len()),
            oldest_registration,
            newest_registration,
            file_size_bytes,
        })
    }

    /// Run `write` against a CSV writer on `file`, then flush and sync.
    fn write_synced<F>(&self, file: &File, write: F) -> Result<()>
    where
        F: FnOnce(&mut csv::Writer<&File>) -> csv::Result<()>,
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        write(&mut writer).map_err(|e| Error::storage_write(&self.path, e))?;
        writer
            .flush()
            .map_err(|e| Error::storage_write(&self.path, e))?;
        drop(writer);

        file.sync_data()
            .map_err(|e| Error::storage_write(&self.path, e))
    }
}

/// Lazy iterator over stored records.
///
/// Stops after an I/O error; keeps going past malformed rows.
pub struct Records {
    path: PathBuf,
    headers: csv::StringRecord,
    inner: Option<csv::StringRecordsIntoIter<File>>,
}

impl Records {
    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            headers: csv::StringRecord::new(),
            inner: None,
        }
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<Registration> {
        let line = record.position().map_or(0, csv::Position::line);

        if record.len() != HEADERS.len() {
            return Err(Error::malformed_record(
                line,
                format!(
                    "expected {} columns, found {}",
                    HEADERS.len(),
                    record.len()
                ),
            ));
        }

        let row: RecordRow = record
            .deserialize(Some(&self.headers))
            .map_err(|e| Error::malformed_record(line, e.to_string()))?;

        row.into_registration()
            .map_err(|message| Error::malformed_record(line, message))
    }
}

impl fmt::Debug for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("path", &self.path)
            .field("exhausted", &self.inner.is_none())
            .finish_non_exhaustive()
    }
}

impl Iterator for Records {
    type Item = Result<Registration>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.as_mut()?.next()?;
        match next {
            Ok(record) => Some(self.parse(&record)),
            Err(e) if e.is_io_error() => {
                self.inner = None;
                Some(Err(Error::storage_read(&self.path, e)))
            }
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                Some(Err(Error::malformed_record(line, e.to_string())))
            }
        }
    }
}

/// Statistics about the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of stored rows, as counted against the registration limit.
    pub total_registrations: usize,
    /// Rows that hold keys but are left out of listings.
    pub malformed_records: usize,
    /// Timestamp of the earliest registration.
    pub oldest_registration: Option<NaiveDateTime>,
    /// Timestamp of the latest registration.
    pub newest_registration: Option<NaiveDateTime>,
    /// Size of the record file in bytes.
    pub file_size_bytes: u64,
}
