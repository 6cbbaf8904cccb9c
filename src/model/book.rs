//! Book inventory rows

use serde::{Deserialize, Serialize};

use crate::storage::record::Record;

/// One title in the inventory: `title|author|subject|price|copies`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique key
    pub title: String,
    pub author: String,
    pub subject: String,
    pub price: u32,
    /// Copies currently on the shelf
    pub copies: u32,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        subject: impl Into<String>,
        price: u32,
        copies: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            subject: subject.into(),
            price,
            copies,
        }
    }

    /// Copy of this row with a different copy count
    pub fn with_copies(&self, copies: u32) -> Book {
        Book {
            copies,
            ..self.clone()
        }
    }
}

impl Record for Book {
    type Row = Book;
    const KIND: &'static str = "book";
    const FIELDS: usize = 5;

    fn to_row(&self) -> Book {
        self.clone()
    }

    fn from_row(row: Book) -> Self {
        row
    }
}
