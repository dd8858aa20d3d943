use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{AttendanceError, Result};

pub const STORE_FILE_NAME: &str = "attendance.csv";
pub const HEADER: [&str; 3] = ["Name", "Date", "Status"];

/// One row of the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub name: String,
    pub date: String,
    pub status: String,
}

/// Append-only attendance file inside a workspace directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_workspace(workspace: &Path) -> Self {
        Self::new(workspace.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Streams every row to `visit`. Columns are looked up by header name, so
    /// short rows and reordered columns read as empty fields instead of
    /// failing.
    pub fn for_each_record(&self, mut visit: impl FnMut(AttendanceRecord)) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.read_error(e))?;
        let headers = reader.headers().map_err(|e| self.read_error(e))?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let (name_col, date_col, status_col) = (column("Name"), column("Date"), column("Status"));

        for row in reader.records() {
            let row = row.map_err(|e| self.read_error(e))?;
            let field = |col: Option<usize>| {
                col.and_then(|i| row.get(i))
                    .unwrap_or_default()
                    .to_string()
            };
            visit(AttendanceRecord {
                name: field(name_col),
                date: field(date_col),
                status: field(status_col),
            });
        }
        Ok(())
    }

    /// (name, date) pairs already present in the store. Missing store reads
    /// as empty.
    pub fn existing_keys(&self) -> Result<HashSet<(String, String)>> {
        let mut keys = HashSet::new();
        if !self.exists() {
            return Ok(keys);
        }
        self.for_each_record(|r| {
            keys.insert((r.name, r.date));
        })?;
        Ok(keys)
    }

    /// Opens the store for appending, writing the header first when the file
    /// is new or empty. A last line without a terminator is closed off so the
    /// first appended row starts on its own line.
    pub fn appender(&self) -> Result<Appender> {
        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e.into()))?;
        if !needs_header && !self.ends_with_newline()? {
            file.write_all(b"\n")
                .map_err(|e| self.write_error(e.into()))?;
        }
        let mut appender = Appender {
            writer: csv::Writer::from_writer(file),
            path: self.path.clone(),
        };
        if needs_header {
            appender.write_row(&HEADER)?;
        }
        Ok(appender)
    }

    fn ends_with_newline(&self) -> Result<bool> {
        let mut last = [0u8; 1];
        File::open(&self.path)
            .and_then(|mut f| {
                f.seek(SeekFrom::End(-1))?;
                f.read_exact(&mut last)
            })
            .map_err(|e| self.write_error(e.into()))?;
        Ok(last[0] == b'\n')
    }

    fn read_error(&self, source: csv::Error) -> AttendanceError {
        AttendanceError::StoreRead {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, source: csv::Error) -> AttendanceError {
        AttendanceError::StoreWrite {
            path: self.path.clone(),
            source,
        }
    }
}

/// Row writer over an open store. Each row is flushed as it is written, so a
/// failure part-way through a save leaves the earlier rows on disk.
pub struct Appender {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl Appender {
    pub fn append(&mut self, record: &AttendanceRecord) -> Result<()> {
        self.write_row(&[
            record.name.as_str(),
            record.date.as_str(),
            record.status.as_str(),
        ])
    }

    fn write_row(&mut self, fields: &[&str; 3]) -> Result<()> {
        self.writer
            .write_record(fields)
            .and_then(|_| self.writer.flush().map_err(csv::Error::from))
            .map_err(|source| AttendanceError::StoreWrite {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, date: &str, status: &str) -> AttendanceRecord {
        AttendanceRecord {
            name: name.to_string(),
            date: date.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn first_append_writes_header_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());

        store
            .appender()
            .and_then(|mut a| a.append(&record("Alice", "2024-05-01", "P")))
            .expect("append");
        store
            .appender()
            .and_then(|mut a| a.append(&record("Bob", "2024-05-01", "A")))
            .expect("append");

        let text = std::fs::read_to_string(store.path()).expect("read store");
        assert_eq!(
            text,
            "Name,Date,Status\nAlice,2024-05-01,P\nBob,2024-05-01,A\n"
        );
    }

    #[test]
    fn append_after_unterminated_last_line_starts_a_new_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        std::fs::write(store.path(), "Name,Date,Status\nAlice,2024-05-01,P").expect("seed");

        store
            .appender()
            .and_then(|mut a| a.append(&record("Bob", "2024-05-02", "A")))
            .expect("append");

        let text = std::fs::read_to_string(store.path()).expect("read store");
        assert_eq!(
            text,
            "Name,Date,Status\nAlice,2024-05-01,P\nBob,2024-05-02,A\n"
        );
        let mut rows = Vec::new();
        store.for_each_record(|r| rows.push(r)).expect("read");
        assert_eq!(
            rows,
            vec![
                record("Alice", "2024-05-01", "P"),
                record("Bob", "2024-05-02", "A")
            ]
        );
    }

    #[test]
    fn names_with_commas_survive_a_read_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        store
            .appender()
            .and_then(|mut a| a.append(&record("Doe, Jane", "2024-05-01", "P")))
            .expect("append");

        let mut rows = Vec::new();
        store.for_each_record(|r| rows.push(r)).expect("read");
        assert_eq!(rows, vec![record("Doe, Jane", "2024-05-01", "P")]);
    }

    #[test]
    fn short_rows_read_as_empty_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        std::fs::write(store.path(), "Name,Date,Status\nAlice,2024-05-01\n").expect("seed");

        let mut rows = Vec::new();
        store.for_each_record(|r| rows.push(r)).expect("read");
        assert_eq!(rows, vec![record("Alice", "2024-05-01", "")]);
    }

    #[test]
    fn missing_store_has_no_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::in_workspace(dir.path());
        assert!(store.existing_keys().expect("keys").is_empty());
    }
}
