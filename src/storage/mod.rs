//! Storage Module
//!
//! Flat-file persistence for every entity collection.
//!
//! ## Responsibilities
//! - Map each collection to its file in the data directory
//! - Encode/decode one record per line
//! - Rewrite files through a scratch file and an atomic rename
//! - Append to the ledgers
//!
//! ## File Layout
//! ```text
//! {data_dir}/
//!   members.txt     name|email|phone|password
//!   users.txt       name|email|phone|password|payment_due(0/1)|fines_due
//!   books.txt       title|author|subject|price|copies
//!   borrowings.txt  email|title|due_timestamp
//!   payments.txt    email|amount|YYYY-MM-DD
//!   fines.txt       email|amount|YYYY-MM-DD
//! ```

pub mod record;
mod file_store;

pub use file_store::{FileStore, Rewrite};
pub use record::Record;

/// The data files kept in the data directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    Members,
    Users,
    Books,
    Borrowings,
    Payments,
    Fines,
}

impl DataFile {
    /// File name inside the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            DataFile::Members => "members.txt",
            DataFile::Users => "users.txt",
            DataFile::Books => "books.txt",
            DataFile::Borrowings => "borrowings.txt",
            DataFile::Payments => "payments.txt",
            DataFile::Fines => "fines.txt",
        }
    }
}

impl std::fmt::Display for DataFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}
