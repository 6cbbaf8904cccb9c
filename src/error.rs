//! Error types for the library server
//!
//! Provides a unified error type for all operations. Every variant is
//! recoverable: the session turns it into an `Error:` response and keeps going.

use thiserror::Error;

/// Result type alias using LibraryError
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Unified error type for library operations
#[derive(Debug, Error)]
pub enum LibraryError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record encoding error: {0}")]
    Csv(#[from] csv::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Unknown command.")]
    UnknownCommand(String),

    /// Wrong field count, empty field or non-numeric integer field.
    /// `label` is the human name of the request ("sign-up", "book", ...).
    #[error("Invalid {label} format.")]
    InvalidFormat { label: &'static str, reason: String },

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    // -------------------------------------------------------------------------
    // Authorization Errors
    // -------------------------------------------------------------------------
    #[error("Please sign in first.")]
    NotSignedIn,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Email already exists.")]
    EmailExists,

    #[error("User not found.")]
    UserNotFound,

    #[error("Book not found.")]
    BookNotFound,

    #[error("Book title already exists.")]
    TitleExists,

    #[error("No copies of this book are available.")]
    NoCopiesAvailable,

    #[error("User has outstanding fines and cannot borrow a book.")]
    FinesOutstanding,

    #[error("User has not borrowed this book.")]
    NotBorrowed,

    #[error("User has no outstanding payment.")]
    NoPaymentDue,

    #[error("User has no outstanding fines.")]
    NoFinesDue,

    #[error("User accounts cannot be deleted.")]
    DeletionForbidden,

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),
}

impl LibraryError {
    /// Text sent to the client after `Error: `.
    ///
    /// Storage failures are not leaked to clients; they only reach the log.
    pub fn client_message(&self) -> String {
        match self {
            LibraryError::Io(_)
            | LibraryError::Csv(_)
            | LibraryError::CorruptRecord(_)
            | LibraryError::Network(_) => {
                "Server failed to process request.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// True for storage and network failures, as opposed to request or domain errors
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LibraryError::Io(_)
                | LibraryError::Csv(_)
                | LibraryError::CorruptRecord(_)
                | LibraryError::Network(_)
        )
    }
}
