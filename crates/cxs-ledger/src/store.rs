//! On-disk ledger storage.
//!
//! The store is the only writer of the ledger file. Writes are appends of a
//! single CSV record; existing content is read only to check the header.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info, warn};

use crate::error::{HeaderMismatch, LedgerError};
use crate::report::{Finding, ValidationReport};
use crate::schema::LEDGER_HEADER;
use crate::validator::validate_row;
use crate::Result;

/// Handle to a ledger file at an explicit path.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
    locking: bool,
}

impl LedgerStore {
    /// Create a store for the ledger at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            locking: false,
        }
    }

    /// Hold an exclusive advisory lock on the ledger while writing.
    ///
    /// Without it, concurrent writers in different processes can interleave
    /// their appends.
    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_locking(&self) -> bool {
        self.locking
    }

    /// Write the canonical header to a missing or empty ledger, or check the
    /// header of an existing one.
    ///
    /// A mismatching header is reported and the file is left unchanged.
    pub fn ensure_header(&self) -> Result<()> {
        let file = self.open_for_append()?;
        self.lock(&file)?;
        self.ensure_header_in(&file).map(|_| ())
    }

    /// Validate `row` and append it as one record at the end of the ledger.
    ///
    /// Nothing is written, and no file is created, when validation fails.
    pub fn append_row<S: AsRef<str>>(&self, row: &[S]) -> Result<()> {
        validate_row(row)?;

        let file = self.open_for_append()?;
        self.lock(&file)?;
        let terminated = self.ensure_header_in(&file)?;

        let mut handle = &file;
        if !terminated {
            handle
                .write_all(b"\n")
                .map_err(|e| LedgerError::io(&self.path, e))?;
            debug!(path = %self.path.display(), "terminated last ledger line");
        }

        let mut writer = csv::Writer::from_writer(handle);
        writer
            .write_record(row.iter().map(|field| field.as_ref()))
            .map_err(|e| LedgerError::csv(&self.path, e))?;
        writer.flush().map_err(|e| LedgerError::io(&self.path, e))?;

        info!(
            path = %self.path.display(),
            session_id = row[1].as_ref(),
            status = row[6].as_ref(),
            "appended ledger row"
        );
        // The advisory lock, if any, is released when `file` closes.
        Ok(())
    }

    /// Scan the whole ledger without modifying it.
    ///
    /// Every rejected row is collected; only a missing file or an I/O
    /// failure ends the scan early. Blank lines are rows with no columns.
    pub fn validate_file(&self) -> Result<ValidationReport> {
        let data = self.read_all()?;
        let mut lines = LedgerLines::new(&data);

        let header_mismatch = match self.next_line(&mut lines)? {
            Some(fields) => check_header(fields),
            None => Some(HeaderMismatch::new(Vec::new())),
        };
        if let Some(mismatch) = &header_mismatch {
            warn!(path = %self.path.display(), "{mismatch}");
        }

        let mut row_count = 0;
        let mut findings = Vec::new();
        while let Some(fields) = self.next_line(&mut lines)? {
            row_count += 1;
            let line = row_count + 1;
            if let Err(error) = validate_row(&fields) {
                debug!(path = %self.path.display(), line, %error, "rejected ledger row");
                findings.push(Finding { line, error });
            }
        }

        let report = ValidationReport::new(&self.path, row_count, header_mismatch, findings);
        info!(
            path = %self.path.display(),
            rows = report.row_count,
            errors = report.error_count(),
            "validated ledger"
        );
        Ok(report)
    }

    /// Read every data record, header excluded, in file order.
    ///
    /// A blank line comes back as an empty record.
    pub fn read_records(&self) -> Result<Vec<Vec<String>>> {
        let data = self.read_all()?;
        let mut lines = LedgerLines::new(&data);
        let mut records = Vec::new();

        // Skip the header line.
        if self.next_line(&mut lines)?.is_none() {
            return Ok(records);
        }
        while let Some(fields) = self.next_line(&mut lines)? {
            records.push(fields);
        }
        Ok(records)
    }

    /// Returns whether the ledger ends with a line terminator.
    fn ensure_header_in(&self, file: &File) -> Result<bool> {
        let mut handle = file;
        let mut data = Vec::new();
        handle
            .seek(SeekFrom::Start(0))
            .map_err(|e| LedgerError::io(&self.path, e))?;
        handle
            .read_to_end(&mut data)
            .map_err(|e| LedgerError::io(&self.path, e))?;

        if data.is_empty() {
            let mut writer = csv::Writer::from_writer(handle);
            writer
                .write_record(LEDGER_HEADER)
                .map_err(|e| LedgerError::csv(&self.path, e))?;
            writer.flush().map_err(|e| LedgerError::io(&self.path, e))?;
            debug!(path = %self.path.display(), "wrote ledger header");
            return Ok(true);
        }

        let found = match self.next_line(&mut LedgerLines::new(&data))? {
            Some(fields) => check_header(fields),
            None => Some(HeaderMismatch::new(Vec::new())),
        };

        match found {
            None => Ok(matches!(data.last(), Some(b'\n' | b'\r'))),
            Some(mismatch) => {
                warn!(path = %self.path.display(), "{mismatch}");
                Err(LedgerError::HeaderMismatch(mismatch))
            }
        }
    }

    fn open_for_append(&self) -> Result<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
        }

        OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| LedgerError::io(&self.path, e))
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LedgerError::FileNotFound {
                path: self.path.clone(),
            },
            _ => LedgerError::io(&self.path, e),
        })
    }

    fn lock(&self, file: &File) -> Result<()> {
        if self.locking {
            file.lock_exclusive()
                .map_err(|e| LedgerError::io(&self.path, e))?;
            debug!(path = %self.path.display(), "acquired ledger lock");
        }
        Ok(())
    }

    fn next_line(&self, lines: &mut LedgerLines<'_>) -> Result<Option<Vec<String>>> {
        lines
            .next()
            .transpose()
            .map_err(|e| LedgerError::csv(&self.path, e))
    }
}

/// Ensure the ledger at `path` starts with the canonical header.
pub fn ensure_header(path: impl AsRef<Path>) -> Result<()> {
    LedgerStore::new(path.as_ref()).ensure_header()
}

/// Validate `row` and append it to the ledger at `path`.
pub fn append_row<S: AsRef<str>>(path: impl AsRef<Path>, row: &[S]) -> Result<()> {
    LedgerStore::new(path.as_ref()).append_row(row)
}

/// Scan the ledger at `path` and report every problem found.
pub fn validate_file(path: impl AsRef<Path>) -> Result<ValidationReport> {
    LedgerStore::new(path.as_ref()).validate_file()
}

/// Ledger lines in file order.
///
/// The CSV parser skips empty lines; they are recovered from the bytes it
/// consumed between records and yielded as empty records, so every line
/// keeps its ordinal. A quoted field spanning several lines is one record.
struct LedgerLines<'a> {
    data: &'a [u8],
    reader: csv::Reader<&'a [u8]>,
    record: csv::ByteRecord,
    consumed: usize,
    after_cr: bool,
    blanks: usize,
    pending: bool,
    done: bool,
}

impl<'a> LedgerLines<'a> {
    fn new(data: &'a [u8]) -> Self {
        // Rows of any width are read so that the validator can report them.
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);
        Self {
            data,
            reader,
            record: csv::ByteRecord::new(),
            consumed: 0,
            after_cr: false,
            blanks: 0,
            pending: false,
            done: false,
        }
    }

    fn advance(&mut self) -> csv::Result<()> {
        let more = self.reader.read_byte_record(&mut self.record)?;
        let end = usize::try_from(self.reader.position().byte())
            .map_or(self.data.len(), |end| end.min(self.data.len()));
        let skipped = self.data.get(self.consumed..end).unwrap_or_default();

        self.blanks = blank_lines(skipped, self.after_cr);
        if let Some(&last) = skipped.last() {
            self.after_cr = last == b'\r';
        }
        self.consumed = end;
        self.pending = more;
        self.done = !more;
        Ok(())
    }
}

impl Iterator for LedgerLines<'_> {
    type Item = csv::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.blanks > 0 {
                self.blanks -= 1;
                return Some(Ok(Vec::new()));
            }
            if self.pending {
                self.pending = false;
                return Some(Ok(decode_fields(&self.record)));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.advance() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

// Empty lines at the start of `bytes`. The `\n` finishing a `\r\n` whose
// `\r` ended the previous record is not a line of its own.
fn blank_lines(bytes: &[u8], after_cr: bool) -> usize {
    let mut rest = match bytes {
        [b'\n', tail @ ..] if after_cr => tail,
        _ => bytes,
    };
    let mut count = 0;
    loop {
        rest = match rest {
            [b'\r', b'\n', tail @ ..] | [b'\r' | b'\n', tail @ ..] => tail,
            _ => return count,
        };
        count += 1;
    }
}

// Invalid UTF-8 is replaced so that such rows still reach the validator.
fn decode_fields(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

fn check_header(fields: Vec<String>) -> Option<HeaderMismatch> {
    if fields.iter().map(String::as_str).eq(LEDGER_HEADER.iter().copied()) {
        None
    } else {
        Some(HeaderMismatch::new(fields))
    }
}
