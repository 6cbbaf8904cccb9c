//! Record codec
//!
//! Line encoding shared by every data file.
//!
//! ## Line Format
//! ```text
//! field1|field2|...|fieldN\n
//! ```
//! Each entity maps to a flat serde row that is read and written with `csv`
//! using `|` as the delimiter, no header and no quoting. Fields never contain
//! `|` or a newline; the protocol layer rejects such values before they reach
//! a record.

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{LibraryError, Result};

/// Field separator used on disk and on the wire
pub const FIELD_SEPARATOR: char = '|';

/// A value that is stored as one line of a data file
pub trait Record: Sized + Clone {
    /// Flat on-disk shape of the record
    type Row: Serialize + DeserializeOwned;

    /// Name used in corrupt-record errors ("book", "user", ...)
    const KIND: &'static str;

    /// Exact number of columns in a line
    const FIELDS: usize;

    fn to_row(&self) -> Self::Row;

    fn from_row(row: Self::Row) -> Self;

    /// Encode to a single line, without the trailing newline
    fn encode(&self) -> Result<String> {
        encode_row(&self.to_row())
    }

    /// Decode from a single line (trailing `\r`/`\n` already removed)
    fn decode(line: &str) -> Result<Self> {
        decode_row(line, Self::FIELDS, Self::KIND).map(Self::from_row)
    }
}

/// Serialize one row as a `|`-delimited line
pub fn encode_row<T: Serialize>(row: &T) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(FIELD_SEPARATOR as u8)
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());
    writer.serialize(row)?;

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let line = String::from_utf8(bytes)
        .map_err(|e| LibraryError::CorruptRecord(format!("encoded row is not UTF-8: {}", e)))?;
    Ok(line.trim_end_matches(&['\n', '\r'][..]).to_string())
}

/// Deserialize one `|`-delimited line with exactly `expected` non-empty fields
pub fn decode_row<T: DeserializeOwned>(line: &str, expected: usize, kind: &str) -> Result<T> {
    let mut reader = ReaderBuilder::new()
        .delimiter(FIELD_SEPARATOR as u8)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    let corrupt = |reason: String| LibraryError::CorruptRecord(format!("{} record: {}", kind, reason));

    if !reader
        .read_record(&mut record)
        .map_err(|e| corrupt(e.to_string()))?
    {
        return Err(corrupt("empty line".to_string()));
    }
    if record.len() != expected {
        return Err(corrupt(format!(
            "expected {} fields, got {}",
            expected,
            record.len()
        )));
    }
    if let Some(pos) = record.iter().position(|f| f.is_empty()) {
        return Err(corrupt(format!("field {} is empty", pos + 1)));
    }

    record
        .deserialize(None)
        .map_err(|e| corrupt(e.to_string()))
}

/// `bool` stored as `0`/`1`
pub mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Ok(raw != 0)
    }
}
