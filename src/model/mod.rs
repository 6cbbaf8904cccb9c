//! Model Module
//!
//! Entity types held by the record store.
//!
//! ## Entities
//! - `Account`: a `Member` (staff) or a `User` (borrower), keyed by email
//! - `Book`: inventory row keyed by title
//! - `Borrowing`: an active loan with its due timestamp
//! - `LedgerEntry`: one payment or fine collection
//!
//! Every entity implements `storage::Record`, so it maps to exactly one line
//! of its data file.

mod account;
mod book;
mod borrowing;
mod ledger;

pub use account::{Account, Member, Profile, Role, User};
pub use book::Book;
pub use borrowing::Borrowing;
pub use ledger::{LedgerEntry, LEDGER_DATE_FORMAT};
