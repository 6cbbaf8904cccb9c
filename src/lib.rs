//! # libraryd
//!
//! A small multi-user library server with:
//! - A pipe-delimited, line-oriented text protocol over TCP
//! - Per-connection sign-in sessions
//! - Book inventory, borrowing with due dates and late fines
//! - Flat-file persistence with rewrite-then-rename updates
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one connection at a time)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                Session (per connection)                      │
//! │        Anonymous ⇄ Authenticated{email, role}                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Library                                │
//! │                  (command routing)                           │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │  Record Store   │            │    Lending      │
//!   │    (Mutex)      │            │ (due / fines)   │
//!   └────────┬────────┘            └─────────────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │   File Store    │
//!   │ (rewrite+rename)│
//!   └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod clock;

pub mod model;
pub mod storage;
pub mod store;
pub mod lending;
pub mod protocol;
pub mod session;
pub mod network;
pub mod library;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LibraryError, Result};
pub use config::Config;
pub use library::{Library, Outcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of libraryd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
