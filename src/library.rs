//! Library Module
//!
//! The core service that coordinates the record store, the lending rules and
//! the data files.
//!
//! ## Responsibilities
//! - Load every collection on startup
//! - Route decoded requests to their handlers
//! - Apply each mutation to the data files first, then to memory
//! - Report outcomes the session turns into state transitions

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{LibraryError, Result};
use crate::lending;
use crate::model::{Account, Book, Borrowing, LedgerEntry, Member, Profile, Role, User};
use crate::protocol::Request;
use crate::storage::{DataFile, FileStore, Record, Rewrite};
use crate::store::RecordStore;

/// What a successfully executed request means for the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Plain success with a message for the client
    Done(String),

    /// Credentials accepted
    SignedIn { email: String, role: Role },

    /// Session identity dropped
    SignedOut,

    /// The caller's own profile changed; `email` is the (possibly new) key
    ProfileUpdated { email: String, message: String },
}

/// The library service
///
/// ## Concurrency Model
///
/// All state sits behind one `Mutex<RecordStore>`. Every handler holds the
/// lock for its whole read-modify-rewrite cycle, so file rewrites never
/// interleave. The listener serves one connection at a time, so the lock is
/// never contended in practice.
///
/// ## Write Ordering
///
/// Handlers compute the new rows, write them to the data files, and only then
/// commit them to memory. Handlers that touch several files rewrite before
/// they append, and a failed step undoes the steps before it through a
/// `Rollback`. A storage failure therefore leaves both the files and the
/// in-memory store as they were.
pub struct Library {
    /// Service configuration
    config: Config,

    /// Data files
    files: FileStore,

    /// In-memory collections
    store: Mutex<RecordStore>,

    /// Time source for due dates, fines and ledger dates
    clock: Arc<dyn Clock>,
}

impl Library {
    /// Open the library with the wall clock
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    /// Open the library with an explicit time source
    ///
    /// On startup:
    /// 1. Create the data directory if needed
    /// 2. Load every data file into the record store
    pub fn open_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let files = FileStore::open(&config.data_dir)?;
        let store = RecordStore::load(&files)?;

        tracing::info!(
            "Loaded {} accounts, {} books, {} active borrowings",
            store.accounts.len(),
            store.books.len(),
            store.borrowings.len()
        );

        Ok(Self {
            config,
            files,
            store: Mutex::new(store),
            clock,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Execute a request
    ///
    /// `caller` is the email of the signed-in account, if any. Authorization
    /// gating happens in the session; handlers that act on "self" still
    /// require a caller.
    pub fn execute(&self, request: Request, caller: Option<&str>) -> Result<Outcome> {
        match request {
            Request::SignUp {
                profile,
                initial_payment,
            } => self.sign_up(profile, initial_payment).map(Outcome::Done),
            Request::SignIn { email, password } => {
                let role = self.sign_in(&email, &password)?;
                Ok(Outcome::SignedIn { email, role })
            }
            Request::Logout => Ok(Outcome::SignedOut),
            Request::AddBook(book) => self.add_book(book).map(Outcome::Done),
            Request::RemoveBook { title } => self.remove_book(&title).map(Outcome::Done),
            Request::UpdateBook { old_title, book } => {
                self.update_book(&old_title, book).map(Outcome::Done)
            }
            Request::CheckCopies { title } => self.check_copies(&title).map(Outcome::Done),
            Request::UpdateInfo(profile) => {
                let caller = caller.ok_or(LibraryError::NotSignedIn)?;
                let email = self.update_info(caller, profile)?;
                Ok(Outcome::ProfileUpdated {
                    email,
                    message: "Information updated successfully.".to_string(),
                })
            }
            Request::UpdateUserInfo {
                target_email,
                profile,
            } => {
                let email = profile.email.clone();
                let message = self.update_user_info(&target_email, profile)?;
                if caller == Some(target_email.as_str()) {
                    Ok(Outcome::ProfileUpdated { email, message })
                } else {
                    Ok(Outcome::Done(message))
                }
            }
            Request::CollectPayment { email, amount } => {
                self.collect_payment(&email, amount).map(Outcome::Done)
            }
            Request::CollectFine { email, amount } => {
                self.collect_fine(&email, amount).map(Outcome::Done)
            }
            Request::ViewUsers => self.view_users().map(Outcome::Done),
            Request::DeleteUser { email } => self.delete_user(&email).map(Outcome::Done),
            Request::BorrowBook { email, title } => {
                self.borrow_book(&email, &title).map(Outcome::Done)
            }
            Request::ReturnBook { email, title } => {
                self.return_book(&email, &title).map(Outcome::Done)
            }
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register a new borrower
    ///
    /// A non-zero initial payment settles the signup fee and is logged to the
    /// payments ledger. The caller is not signed in.
    pub fn sign_up(&self, profile: Profile, initial_payment: u32) -> Result<String> {
        let mut store = self.store.lock();

        if store.email_taken(&profile.email, None) {
            return Err(LibraryError::EmailExists);
        }

        let email = profile.email.clone();
        let user = User::new(profile, initial_payment);
        let mut rollback = Rollback::new(self);

        self.files.append(DataFile::Users, &user)?;
        rollback.push(|library: &Library| {
            library.delete_row(DataFile::Users, |r: &User| r.profile.email == email)
        });

        let entry = if initial_payment > 0 {
            let entry = LedgerEntry::new(&email, initial_payment, self.clock.today());
            rollback.guard(self.files.append(DataFile::Payments, &entry))?;
            Some(entry)
        } else {
            None
        };

        store.accounts.push(Account::User(user));
        store.payments.extend(entry);

        tracing::info!("New user signed up: {}", email);
        Ok("Sign-up successful.".to_string())
    }

    /// Check credentials, returning the account's role
    ///
    /// Unknown email and wrong password fail identically.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Role> {
        let store = self.store.lock();

        match store.account(email) {
            Some(account) if account.password_matches(password) => {
                tracing::info!("{} signed in: {}", account.role(), email);
                Ok(account.role())
            }
            _ => {
                tracing::warn!("Failed sign-in attempt for email: {}", email);
                Err(LibraryError::InvalidCredentials)
            }
        }
    }

    /// Replace the profile of the signed-in account, returning its new email
    pub fn update_info(&self, caller: &str, profile: Profile) -> Result<String> {
        let mut store = self.store.lock();

        let index = store
            .account_index(caller)
            .ok_or(LibraryError::UserNotFound)?;
        if store.email_taken(&profile.email, Some(index)) {
            return Err(LibraryError::EmailExists);
        }

        let new_email = profile.email.clone();
        let updated = store.accounts[index].with_profile(profile);
        self.persist_account(caller, &updated)?;
        store.accounts[index] = updated;

        tracing::info!("Updated account info for: {}", caller);
        Ok(new_email)
    }

    /// Replace the profile of a borrower account
    pub fn update_user_info(&self, target_email: &str, profile: Profile) -> Result<String> {
        let mut store = self.store.lock();

        let index = store
            .user_index(target_email)
            .ok_or(LibraryError::UserNotFound)?;
        if store.email_taken(&profile.email, Some(index)) {
            return Err(LibraryError::EmailExists);
        }

        let updated = store.accounts[index].with_profile(profile);
        self.persist_account(target_email, &updated)?;
        store.accounts[index] = updated;

        tracing::info!("Updated info for user: {}", target_email);
        Ok("User updated successfully.".to_string())
    }

    /// Settle a borrower's signup fee
    pub fn collect_payment(&self, email: &str, amount: u32) -> Result<String> {
        let mut store = self.store.lock();

        let index = store.user_index(email).ok_or(LibraryError::UserNotFound)?;
        let mut user = match &store.accounts[index] {
            Account::User(u) => u.clone(),
            Account::Member(_) => return Err(LibraryError::UserNotFound),
        };
        if !user.payment_due {
            return Err(LibraryError::NoPaymentDue);
        }

        let before = user.clone();
        user.payment_due = false;
        let mut rollback = Rollback::new(self);
        self.persist_row(DataFile::Users, |r: &User| r.profile.email == email, &user)?;
        rollback.restore_user(before);

        let entry = LedgerEntry::new(email, amount, self.clock.today());
        rollback.guard(self.files.append(DataFile::Payments, &entry))?;

        store.accounts[index] = Account::User(user);
        store.payments.push(entry);

        tracing::info!("Payment of {} recorded for user: {}", amount, email);
        Ok("Payment collected successfully.".to_string())
    }

    /// Pay down a borrower's fines; overpayment clamps the balance at zero
    pub fn collect_fine(&self, email: &str, amount: u32) -> Result<String> {
        let mut store = self.store.lock();

        let index = store.user_index(email).ok_or(LibraryError::UserNotFound)?;
        let mut user = match &store.accounts[index] {
            Account::User(u) => u.clone(),
            Account::Member(_) => return Err(LibraryError::UserNotFound),
        };
        if user.fines_due == 0 {
            return Err(LibraryError::NoFinesDue);
        }

        let before = user.clone();
        user.fines_due = user.fines_due.saturating_sub(amount);
        let remaining = user.fines_due;
        let mut rollback = Rollback::new(self);
        self.persist_row(DataFile::Users, |r: &User| r.profile.email == email, &user)?;
        rollback.restore_user(before);

        let entry = LedgerEntry::new(email, amount, self.clock.today());
        rollback.guard(self.files.append(DataFile::Fines, &entry))?;

        store.accounts[index] = Account::User(user);
        store.fines.push(entry);

        tracing::info!("Fine of {} recorded for user: {}", amount, email);
        Ok(format!(
            "Fine of {} collected. Remaining fine: {}.",
            amount, remaining
        ))
    }

    /// Raw users file behind a header line
    pub fn view_users(&self) -> Result<String> {
        let _store = self.store.lock();
        let raw = self.files.read_raw(DataFile::Users)?;
        Ok(format!("List of Users\n{}", raw))
    }

    /// Account deletion is not allowed
    pub fn delete_user(&self, email: &str) -> Result<String> {
        tracing::warn!("Attempt to delete user {} refused: deletion is not allowed", email);
        Err(LibraryError::DeletionForbidden)
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Add copies of a title, creating the title if it is new
    ///
    /// For an existing title only `copies` changes; the other columns of the
    /// request are ignored.
    pub fn add_book(&self, book: Book) -> Result<String> {
        let mut store = self.store.lock();

        if let Some(index) = store.book_index(&book.title) {
            let current = &store.books[index];
            let updated = current.with_copies(current.copies.saturating_add(book.copies));
            self.persist_row(DataFile::Books, |r: &Book| r.title == book.title, &updated)?;

            tracing::info!(
                "Updated copies for book '{}'. New count: {}",
                updated.title,
                updated.copies
            );
            store.books[index] = updated;
            return Ok("Book copies updated successfully.".to_string());
        }

        self.files.append(DataFile::Books, &book)?;
        tracing::info!("New book added: '{}' by {}", book.title, book.author);
        store.books.push(book);
        Ok("Book added successfully.".to_string())
    }

    /// Remove one copy of a title; the last copy removes the title
    pub fn remove_book(&self, title: &str) -> Result<String> {
        let mut store = self.store.lock();

        let index = store.book_index(title).ok_or(LibraryError::BookNotFound)?;
        let current = store.books[index].clone();

        if current.copies > 1 {
            let updated = current.with_copies(current.copies - 1);
            self.persist_row(DataFile::Books, |r: &Book| r.title == title, &updated)?;
            tracing::info!(
                "Decreased copies for book '{}'. New count: {}",
                title,
                updated.copies
            );
            store.books[index] = updated;
            return Ok("Book copy removed successfully.".to_string());
        }

        self.delete_row(DataFile::Books, |r: &Book| r.title == title)?;
        store.books.remove(index);
        tracing::info!("Removed last copy of book: '{}'", title);
        Ok("Book removed successfully.".to_string())
    }

    /// Replace every column of the row titled `old_title`
    pub fn update_book(&self, old_title: &str, book: Book) -> Result<String> {
        let mut store = self.store.lock();

        let index = store
            .book_index(old_title)
            .ok_or(LibraryError::BookNotFound)?;
        if book.title != old_title && store.book_index(&book.title).is_some() {
            return Err(LibraryError::TitleExists);
        }

        self.persist_row(DataFile::Books, |r: &Book| r.title == old_title, &book)?;
        store.books[index] = book;

        tracing::info!("Updated book info for: {}", old_title);
        Ok("Book updated successfully.".to_string())
    }

    /// Copies of a title on the shelf
    pub fn check_copies(&self, title: &str) -> Result<String> {
        let store = self.store.lock();
        let book = store.book(title).ok_or(LibraryError::BookNotFound)?;
        Ok(format!("'{}' has {} copies.", book.title, book.copies))
    }

    // =========================================================================
    // Lending
    // =========================================================================

    /// Lend one copy of `title` to `email`
    pub fn borrow_book(&self, email: &str, title: &str) -> Result<String> {
        let mut store = self.store.lock();

        lending::check_borrow(store.account(email), store.book(title))?;
        let index = store.book_index(title).ok_or(LibraryError::BookNotFound)?;

        let now = self.clock.timestamp();
        let record = Borrowing::new(
            email,
            title,
            lending::due_date(now, self.config.loan_period_secs()),
        );
        let current = store.books[index].clone();
        let updated = current.with_copies(current.copies - 1);

        let mut rollback = Rollback::new(self);
        self.persist_row(DataFile::Books, |r: &Book| r.title == title, &updated)?;
        rollback.restore_book(current);
        rollback.guard(self.files.append(DataFile::Borrowings, &record))?;

        tracing::info!(
            "Book '{}' borrowed by '{}'. Due at {}",
            title,
            email,
            record.due
        );
        store.books[index] = updated;
        store.borrowings.push(record);
        Ok("Book borrowed successfully.".to_string())
    }

    /// Take back one copy of `title` from `email`, charging any late fine
    pub fn return_book(&self, email: &str, title: &str) -> Result<String> {
        let mut store = self.store.lock();

        let loan_index = store
            .borrowing_index(email, title)
            .ok_or(LibraryError::NotBorrowed)?;
        let loan = store.borrowings[loan_index].clone();

        let fine = lending::late_fine(self.clock.timestamp(), loan.due, self.config.daily_fine);
        let mut rollback = Rollback::new(self);

        let restocked = match store.book_index(title) {
            Some(index) => {
                let current = store.books[index].clone();
                let book = current.with_copies(current.copies.saturating_add(1));
                self.persist_row(DataFile::Books, |r: &Book| r.title == title, &book)?;
                rollback.restore_book(current);
                Some((index, book))
            }
            None => None,
        };

        let fined_user = match store.user_index(email) {
            Some(index) if fine > 0 => match &store.accounts[index] {
                Account::User(u) => {
                    let mut user = u.clone();
                    user.fines_due = user.fines_due.saturating_add(fine);
                    rollback.guard(self.persist_row(
                        DataFile::Users,
                        |r: &User| r.profile.email == email,
                        &user,
                    ))?;
                    rollback.restore_user(u.clone());
                    Some((index, user))
                }
                Account::Member(_) => None,
            },
            _ => None,
        };

        rollback.guard(self.delete_row(DataFile::Borrowings, |r: &Borrowing| *r == loan))?;

        store.borrowings.remove(loan_index);
        if let Some((index, user)) = fined_user {
            store.accounts[index] = Account::User(user);
        }
        if let Some((index, book)) = restocked {
            store.books[index] = book;
        }

        if fine > 0 {
            tracing::info!(
                "User '{}' is late returning book '{}'. Fine due: {}",
                email,
                title,
                fine
            );
            Ok(format!("Book returned. Fine of {} due.", fine))
        } else {
            tracing::info!("Book '{}' returned on time by '{}'", title, email);
            Ok("Book returned on time. No fine.".to_string())
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Snapshot of the in-memory collections
    pub fn snapshot(&self) -> RecordStore {
        self.store.lock().clone()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        self.files.data_dir()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write `account` over the row keyed by `old_email` in its own file
    fn persist_account(&self, old_email: &str, account: &Account) -> Result<()> {
        match account {
            Account::Member(member) => self.persist_row(
                DataFile::Members,
                |r: &Member| r.profile.email == old_email,
                member,
            ),
            Account::User(user) => self.persist_row(
                DataFile::Users,
                |r: &User| r.profile.email == old_email,
                user,
            ),
        }
    }

    /// Replace the first row `matches` selects; append if the file has none
    fn persist_row<T, F>(&self, file: DataFile, matches: F, replacement: &T) -> Result<()>
    where
        T: Record,
        F: Fn(&T) -> bool,
    {
        let mut done = false;
        let changed = self.files.rewrite(file, |row: &T| {
            if !done && matches(row) {
                done = true;
                Ok(Rewrite::Replace(replacement.clone()))
            } else {
                Ok(Rewrite::Keep)
            }
        })?;

        if changed == 0 {
            tracing::warn!("{}: row missing on disk, appending", file);
            self.files.append(file, replacement)?;
        }
        Ok(())
    }

    /// Drop the first row `matches` selects
    fn delete_row<T, F>(&self, file: DataFile, matches: F) -> Result<()>
    where
        T: Record,
        F: Fn(&T) -> bool,
    {
        let mut done = false;
        let changed = self.files.rewrite(file, |row: &T| {
            if !done && matches(row) {
                done = true;
                Ok(Rewrite::Drop)
            } else {
                Ok(Rewrite::Keep)
            }
        })?;

        if changed == 0 {
            tracing::warn!("{}: row to delete missing on disk", file);
        }
        Ok(())
    }
}

// =============================================================================
// Rollback
// =============================================================================

type UndoStep<'a> = Box<dyn FnOnce(&Library) -> Result<()> + 'a>;

/// Compensating writes for a handler that touches several files
///
/// Each completed step pushes its inverse. When a later step fails, `guard`
/// replays the inverses newest first, so the files end up as they were before
/// the handler ran. Nothing happens on success.
struct Rollback<'a> {
    library: &'a Library,
    steps: Vec<UndoStep<'a>>,
}

impl<'a> Rollback<'a> {
    fn new(library: &'a Library) -> Self {
        Self {
            library,
            steps: Vec::new(),
        }
    }

    fn push(&mut self, undo: impl FnOnce(&Library) -> Result<()> + 'a) {
        self.steps.push(Box::new(undo));
    }

    /// Put a book row back as it was
    fn restore_book(&mut self, book: Book) {
        self.push(move |library: &Library| {
            let title = book.title.clone();
            library.persist_row(DataFile::Books, |r: &Book| r.title == title, &book)
        });
    }

    /// Put a user row back as it was
    fn restore_user(&mut self, user: User) {
        self.push(move |library: &Library| {
            let email = user.profile.email.clone();
            library.persist_row(DataFile::Users, |r: &User| r.profile.email == email, &user)
        });
    }

    /// Pass `result` through, undoing the recorded steps if it failed
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::error!("Write failed, undoing {} earlier step(s): {}", self.steps.len(), e);
            while let Some(undo) = self.steps.pop() {
                if let Err(undo_err) = undo(self.library) {
                    tracing::error!("Rollback step failed: {}", undo_err);
                }
            }
        }
        result
    }
}
