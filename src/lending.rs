//! Lending rules
//!
//! Pure computation over accounts and books: due dates, late fines and the
//! preconditions a borrow must satisfy. Nothing here touches the store.

use crate::error::{LibraryError, Result};
use crate::model::{Account, Book};

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Due timestamp for a loan starting at `borrowed_at`
pub fn due_date(borrowed_at: i64, loan_period_secs: i64) -> i64 {
    borrowed_at.saturating_add(loan_period_secs)
}

/// Fine owed when returning at `returned_at` a loan due at `due`
///
/// Only full days count: one second to 23h59m late is free.
pub fn late_fine(returned_at: i64, due: i64, daily_fine: u32) -> u32 {
    if returned_at <= due {
        return 0;
    }
    let days_late = returned_at.saturating_sub(due) / SECONDS_PER_DAY;
    let fine = days_late.saturating_mul(i64::from(daily_fine));
    u32::try_from(fine).unwrap_or(u32::MAX)
}

/// Check whether `account` may borrow `book`
///
/// Checked in order, first failure wins: account exists, book exists,
/// a copy is on the shelf, no fines outstanding.
pub fn check_borrow(account: Option<&Account>, book: Option<&Book>) -> Result<()> {
    let account = account.ok_or(LibraryError::UserNotFound)?;
    let book = book.ok_or(LibraryError::BookNotFound)?;

    if book.copies == 0 {
        return Err(LibraryError::NoCopiesAvailable);
    }
    if account.fines_due() > 0 {
        return Err(LibraryError::FinesOutstanding);
    }
    Ok(())
}
