//! Request definitions
//!
//! Represents decoded commands from clients.

use crate::model::{Book, Profile};

/// The fixed table of verbs the server understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    SignUp,
    SignIn,
    Logout,
    AddBook,
    RemoveBook,
    UpdateBook,
    CheckCopies,
    UpdateInfo,
    UpdateUserInfo,
    CollectPayment,
    CollectFine,
    ViewUsers,
    DeleteUser,
    BorrowBook,
    ReturnBook,
}

impl Verb {
    pub const ALL: [Verb; 15] = [
        Verb::SignUp,
        Verb::SignIn,
        Verb::Logout,
        Verb::AddBook,
        Verb::RemoveBook,
        Verb::UpdateBook,
        Verb::CheckCopies,
        Verb::UpdateInfo,
        Verb::UpdateUserInfo,
        Verb::CollectPayment,
        Verb::CollectFine,
        Verb::ViewUsers,
        Verb::DeleteUser,
        Verb::BorrowBook,
        Verb::ReturnBook,
    ];

    /// Look a verb up by its wire name (exact match)
    pub fn from_name(name: &str) -> Option<Verb> {
        Self::ALL.iter().copied().find(|v| v.name() == name)
    }

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            Verb::SignUp => "SIGN_UP",
            Verb::SignIn => "SIGN_IN",
            Verb::Logout => "LOGOUT",
            Verb::AddBook => "ADD_BOOK",
            Verb::RemoveBook => "REMOVE_BOOK",
            Verb::UpdateBook => "UPDATE_BOOK",
            Verb::CheckCopies => "CHECK_COPIES",
            Verb::UpdateInfo => "UPDATE_INFO",
            Verb::UpdateUserInfo => "UPDATE_USER_INFO",
            Verb::CollectPayment => "COLLECT_PAYMENT",
            Verb::CollectFine => "COLLECT_FINE",
            Verb::ViewUsers => "VIEW_USERS",
            Verb::DeleteUser => "DELETE_USER",
            Verb::BorrowBook => "BORROW_BOOK",
            Verb::ReturnBook => "RETURN_BOOK",
        }
    }

    /// Exact number of fields after the verb
    pub fn arity(&self) -> usize {
        match self {
            Verb::Logout | Verb::ViewUsers => 0,
            Verb::RemoveBook | Verb::CheckCopies | Verb::DeleteUser => 1,
            Verb::SignIn | Verb::CollectPayment | Verb::CollectFine => 2,
            Verb::BorrowBook | Verb::ReturnBook => 2,
            Verb::UpdateInfo => 4,
            Verb::SignUp | Verb::AddBook | Verb::UpdateUserInfo => 5,
            Verb::UpdateBook => 6,
        }
    }

    /// Only sign-up and sign-in are reachable without a session
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Verb::SignUp | Verb::SignIn)
    }

    /// Name used in "Invalid ... format." errors
    pub fn format_label(&self) -> &'static str {
        match self {
            Verb::SignUp => "sign-up",
            Verb::SignIn => "sign-in",
            Verb::Logout => "logout",
            Verb::AddBook => "book",
            Verb::RemoveBook | Verb::CheckCopies => "title",
            Verb::UpdateBook | Verb::UpdateInfo | Verb::UpdateUserInfo => "update",
            Verb::CollectPayment => "payment",
            Verb::CollectFine => "fine",
            Verb::ViewUsers => "view",
            Verb::DeleteUser => "delete",
            Verb::BorrowBook => "borrowing",
            Verb::ReturnBook => "return",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully decoded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Register a new borrower
    SignUp { profile: Profile, initial_payment: u32 },

    /// Authenticate this connection
    SignIn { email: String, password: String },

    /// Drop the session identity
    Logout,

    /// Add copies of a title (creating it if new)
    AddBook(Book),

    /// Remove one copy of a title
    RemoveBook { title: String },

    /// Replace every column of a title
    UpdateBook { old_title: String, book: Book },

    /// Look up copies on the shelf
    CheckCopies { title: String },

    /// Edit the signed-in account
    UpdateInfo(Profile),

    /// Edit a borrower account
    UpdateUserInfo { target_email: String, profile: Profile },

    /// Settle the signup fee
    CollectPayment { email: String, amount: u32 },

    /// Pay down late fines
    CollectFine { email: String, amount: u32 },

    /// Dump the users file
    ViewUsers,

    /// Always refused
    DeleteUser { email: String },

    BorrowBook { email: String, title: String },

    ReturnBook { email: String, title: String },
}

impl Request {
    /// Get the verb
    pub fn verb(&self) -> Verb {
        match self {
            Request::SignUp { .. } => Verb::SignUp,
            Request::SignIn { .. } => Verb::SignIn,
            Request::Logout => Verb::Logout,
            Request::AddBook(_) => Verb::AddBook,
            Request::RemoveBook { .. } => Verb::RemoveBook,
            Request::UpdateBook { .. } => Verb::UpdateBook,
            Request::CheckCopies { .. } => Verb::CheckCopies,
            Request::UpdateInfo(_) => Verb::UpdateInfo,
            Request::UpdateUserInfo { .. } => Verb::UpdateUserInfo,
            Request::CollectPayment { .. } => Verb::CollectPayment,
            Request::CollectFine { .. } => Verb::CollectFine,
            Request::ViewUsers => Verb::ViewUsers,
            Request::DeleteUser { .. } => Verb::DeleteUser,
            Request::BorrowBook { .. } => Verb::BorrowBook,
            Request::ReturnBook { .. } => Verb::ReturnBook,
        }
    }
}
