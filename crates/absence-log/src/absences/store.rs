use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use tracing::{debug, info};

use super::domain::AbsenceRecord;

const HEADER: &[u8] = b"name,details,date\n";

/// Append-only log of absence records.
pub trait RecordStore: Send + Sync {
    /// Durably adds one record; it is visible to every later read.
    fn append(&self, record: &AbsenceRecord) -> Result<(), StoreError>;

    /// Every record ever appended, in append order.
    fn load_all(&self) -> Result<Vec<AbsenceRecord>, StoreError>;

    /// Records whose timestamp falls on `day`. A timestamp that does not parse
    /// fails the whole load instead of being skipped.
    fn load_for_date(&self, day: NaiveDate) -> Result<Vec<AbsenceRecord>, StoreError> {
        let mut matching = Vec::new();
        for record in self.load_all()? {
            if recorded_on(&record)? == day {
                matching.push(record);
            }
        }
        Ok(matching)
    }
}

fn recorded_on(record: &AbsenceRecord) -> Result<NaiveDate, StoreError> {
    record
        .recorded_on()
        .map_err(|source| StoreError::InvalidTimestamp {
            timestamp: record.timestamp.clone(),
            source,
        })
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("absence log unavailable: {0}")]
    Storage(#[from] std::io::Error),
    #[error("malformed absence record at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
    #[error("absence record has unparseable date '{timestamp}': {source}")]
    InvalidTimestamp {
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl StoreError {
    /// True when stored data, rather than the storage medium, is at fault.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::InvalidTimestamp { .. })
    }

    fn from_csv(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line()).unwrap_or_default();
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::Storage(source),
            _ => Self::Malformed { line, reason },
        }
    }
}

/// CSV-backed store with the header `name,details,date`.
///
/// Values are quoted by the `csv` writer, so commas, quotes and line breaks in
/// `details` survive a round trip. Each append is one `write_all` on an
/// `O_APPEND` handle taken under a process-wide lock, so appends from this
/// process never interleave. Separate processes only get whatever atomicity the
/// OS gives small appends.
#[derive(Debug)]
pub struct CsvRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvRecordStore {
    /// Opens the log at `path`, creating it with a header row if missing.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn initialize(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        if file.metadata()?.len() == 0 {
            file.write_all(HEADER)?;
            file.sync_data()?;
            info!(path = %self.path.display(), "initialized absence log");
        }
        Ok(())
    }
}

impl RecordStore for CsvRecordStore {
    fn append(&self, record: &AbsenceRecord) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(record).map_err(StoreError::from_csv)?;
        let row = writer
            .into_inner()
            .map_err(|err| StoreError::Storage(err.into_error()))?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.initialize()?;
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut line = Vec::with_capacity(row.len() + 1);
        if !ends_with_newline(&mut file)? {
            line.push(b'\n');
        }
        line.extend_from_slice(&row);
        file.write_all(&line)?;
        file.sync_data()?;

        debug!(department = %record.department, "appended absence record");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<AbsenceRecord>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut reader = csv::ReaderBuilder::new().from_reader(file);
        let headers = reader.headers().map_err(StoreError::from_csv)?.clone();
        let mut row = csv::StringRecord::new();
        let mut records = Vec::new();

        while reader.read_record(&mut row).map_err(StoreError::from_csv)? {
            let line = row.position().map(|pos| pos.line()).unwrap_or_default();
            let record = row
                .deserialize::<AbsenceRecord>(Some(&headers))
                .map_err(|err| StoreError::Malformed {
                    line,
                    reason: err.to_string(),
                })?;
            records.push(record);
        }

        Ok(records)
    }
}

/// A hand-edited log may lose its final newline; the next row must not be
/// glued onto the last record.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Volatile store for demos and tests.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<AbsenceRecord>>,
}

impl MemoryRecordStore {
    pub fn with_records(records: Vec<AbsenceRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn append(&self, record: &AbsenceRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<AbsenceRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
