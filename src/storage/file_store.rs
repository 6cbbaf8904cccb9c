//! File Store
//!
//! Owns the data directory and every file handle that touches entity data.
//!
//! ## Responsibilities
//! - Load whole data files into typed records on startup
//! - Append new rows to a data file
//! - Rewrite a data file through a scratch file and an atomic rename
//! - Hand out the raw contents of a file for listings

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::record::Record;
use super::DataFile;

/// What to do with one row during a rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite<T> {
    /// Copy the original line through untouched
    Keep,

    /// Write this record in place of the original line
    Replace(T),

    /// Omit the line from the new file
    Drop,
}

/// Flat-file persistence for the record store
///
/// ## Update discipline
/// Every rewrite reads the whole file, streams each row into
/// `{file}.tmp` in the same directory, fsyncs it, then renames it over the
/// original. The original file is untouched until the rename, so a failure at
/// any earlier step leaves the previous contents intact.
///
/// No locking is done here: callers must serialize writers.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding every data file
    data_dir: PathBuf,
}

impl FileStore {
    /// Open the store rooted at `path`, creating the directory if needed
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;
        Ok(Self {
            data_dir: path.to_path_buf(),
        })
    }

    /// Read every parseable record of a file
    ///
    /// A missing file reads as empty. Lines that fail to decode are skipped
    /// (and logged); they stay on disk and are carried through later rewrites.
    pub fn load<T: Record>(&self, file: DataFile) -> Result<Vec<T>> {
        let contents = self.read_raw(file)?;
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (number, line) in contents.lines().enumerate() {
            match T::decode(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("{}: skipping line {}: {}", file, number + 1, e);
                }
            }
        }

        tracing::debug!(
            "{}: loaded {} records ({} skipped)",
            file,
            records.len(),
            skipped
        );
        Ok(records)
    }

    /// Raw contents of a file (empty if it does not exist yet)
    pub fn read_raw(&self, file: DataFile) -> Result<String> {
        match fs::read_to_string(self.path(file)) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append one record as a new line
    pub fn append<T: Record>(&self, file: DataFile, record: &T) -> Result<()> {
        let path = self.path(file);
        let mut handle = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut line = record.encode()?;
        line.push('\n');
        handle.write_all(line.as_bytes())?;
        handle.sync_data()?;
        Ok(())
    }

    /// Rewrite a file row by row
    ///
    /// `edit` is called for each line that decodes as `T`; lines that do not
    /// decode are copied through verbatim. Returns the number of rows that were
    /// replaced or dropped. When that number is zero the original file is left
    /// as it was and the scratch file is discarded. An error from `edit` aborts
    /// the rewrite the same way.
    pub fn rewrite<T, F>(&self, file: DataFile, mut edit: F) -> Result<usize>
    where
        T: Record,
        F: FnMut(&T) -> Result<Rewrite<T>>,
    {
        let original = match fs::read_to_string(self.path(file)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let scratch = self.scratch_path(file);
        let outcome = Self::write_scratch(&scratch, &original, &mut edit);

        match outcome {
            Ok(0) => {
                let _ = fs::remove_file(&scratch);
                Ok(0)
            }
            Ok(changed) => {
                if let Err(e) = fs::rename(&scratch, self.path(file)) {
                    let _ = fs::remove_file(&scratch);
                    return Err(e.into());
                }
                tracing::trace!("{}: rewrote {} rows", file, changed);
                Ok(changed)
            }
            Err(e) => {
                let _ = fs::remove_file(&scratch);
                Err(e)
            }
        }
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of a data file
    pub fn path(&self, file: DataFile) -> PathBuf {
        self.data_dir.join(file.file_name())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Scratch file used while rewriting `file`
    /// "books.txt" → "books.txt.tmp"
    fn scratch_path(&self, file: DataFile) -> PathBuf {
        self.data_dir.join(format!("{}.tmp", file.file_name()))
    }

    /// Stream the edited contents into the scratch file, returning rows changed
    fn write_scratch<T, F>(scratch: &Path, original: &str, edit: &mut F) -> Result<usize>
    where
        T: Record,
        F: FnMut(&T) -> Result<Rewrite<T>>,
    {
        let mut writer = BufWriter::new(File::create(scratch)?);
        let mut changed = 0usize;

        for raw in original.split_inclusive('\n') {
            let line = raw.trim_end_matches(&['\n', '\r'][..]);

            let action = match T::decode(line) {
                Ok(record) => edit(&record)?,
                Err(_) => Rewrite::Keep,
            };

            match action {
                Rewrite::Keep => {
                    writer.write_all(raw.as_bytes())?;
                    if !raw.ends_with('\n') {
                        writer.write_all(b"\n")?;
                    }
                }
                Rewrite::Replace(record) => {
                    changed += 1;
                    writer.write_all(record.encode()?.as_bytes())?;
                    writer.write_all(b"\n")?;
                }
                Rewrite::Drop => changed += 1,
            }
        }

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(changed)
    }
}
