//! Response definitions
//!
//! Represents responses to clients.

use crate::error::LibraryError;

/// Response status, sent as the text prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

impl Status {
    pub fn prefix(&self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Error => "Error",
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Human-readable text after the prefix; may span lines (VIEW_USERS)
    pub message: String,
}

impl Response {
    /// Create a Success response
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    /// Create an Error response from any library error
    pub fn error(error: &LibraryError) -> Self {
        Self {
            status: Status::Error,
            message: error.client_message(),
        }
    }

    /// Clients treat anything starting with "Success" as success
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status.prefix(), self.message)
    }
}
