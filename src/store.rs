//! Record Store
//!
//! In-memory collections for every entity, loaded once from the data files.
//! The store is the source of truth while the server runs; `Library` keeps
//! the files in step with it.

use crate::error::Result;
use crate::model::{Account, Book, Borrowing, LedgerEntry, Member, User};
use crate::storage::{DataFile, FileStore};

/// All entity collections
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    /// Members first, then Users, in file order
    pub accounts: Vec<Account>,
    pub books: Vec<Book>,
    pub borrowings: Vec<Borrowing>,
    pub payments: Vec<LedgerEntry>,
    pub fines: Vec<LedgerEntry>,
}

impl RecordStore {
    /// Load every collection from its file
    pub fn load(files: &FileStore) -> Result<Self> {
        let members: Vec<Member> = files.load(DataFile::Members)?;
        let users: Vec<User> = files.load(DataFile::Users)?;

        let accounts = members
            .into_iter()
            .map(Account::Member)
            .chain(users.into_iter().map(Account::User))
            .collect();

        Ok(Self {
            accounts,
            books: files.load(DataFile::Books)?,
            borrowings: files.load(DataFile::Borrowings)?,
            payments: files.load(DataFile::Payments)?,
            fines: files.load(DataFile::Fines)?,
        })
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    pub fn account(&self, email: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.email() == email)
    }

    pub fn account_index(&self, email: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.email() == email)
    }

    /// Index of the borrower (not staff) account with this email
    pub fn user_index(&self, email: &str) -> Option<usize> {
        self.accounts
            .iter()
            .position(|a| matches!(a, Account::User(u) if u.profile.email == email))
    }

    /// True if `email` belongs to any account other than the one at `except`
    pub fn email_taken(&self, email: &str, except: Option<usize>) -> bool {
        self.accounts
            .iter()
            .enumerate()
            .any(|(i, a)| Some(i) != except && a.email() == email)
    }

    // =========================================================================
    // Books
    // =========================================================================

    pub fn book(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.title == title)
    }

    pub fn book_index(&self, title: &str) -> Option<usize> {
        self.books.iter().position(|b| b.title == title)
    }

    // =========================================================================
    // Borrowings
    // =========================================================================

    /// Oldest active loan of `title` by `email`
    pub fn borrowing_index(&self, email: &str, title: &str) -> Option<usize> {
        self.borrowings.iter().position(|b| b.is_for(email, title))
    }
}
