//! Borrowing records

use serde::{Deserialize, Serialize};

use crate::storage::record::Record;

/// An active loan: `email|title|due_timestamp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrowing {
    pub email: String,
    pub title: String,
    /// Unix seconds
    pub due: i64,
}

impl Borrowing {
    pub fn new(email: impl Into<String>, title: impl Into<String>, due: i64) -> Self {
        Self {
            email: email.into(),
            title: title.into(),
            due,
        }
    }

    pub fn is_for(&self, email: &str, title: &str) -> bool {
        self.email == email && self.title == title
    }
}

impl Record for Borrowing {
    type Row = Borrowing;
    const KIND: &'static str = "borrowing";
    const FIELDS: usize = 3;

    fn to_row(&self) -> Borrowing {
        self.clone()
    }

    fn from_row(row: Borrowing) -> Self {
        row
    }
}
