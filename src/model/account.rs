//! Accounts
//!
//! Members (staff) and Users (borrowers) share one identity space keyed by
//! email. Only Users carry payment and fine state.

use serde::{Deserialize, Serialize};

use crate::storage::record::{flag, Record};

/// Which kind of account signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Contact and credential fields common to both account kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Stored and compared in plain text
    pub password: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            password: password.into(),
        }
    }
}

/// Staff account: `name|email|phone|password`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub profile: Profile,
}

/// Borrower account: `name|email|phone|password|payment_due|fines_due`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub profile: Profile,

    /// Signup fee still unpaid
    pub payment_due: bool,

    /// Accrued late fines
    pub fines_due: u32,
}

impl User {
    /// A fresh borrower; `payment_due` is set unless an initial payment was made
    pub fn new(profile: Profile, initial_payment: u32) -> Self {
        Self {
            profile,
            payment_due: initial_payment == 0,
            fines_due: 0,
        }
    }
}

/// Either account kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    Member(Member),
    User(User),
}

impl Account {
    pub fn profile(&self) -> &Profile {
        match self {
            Account::Member(m) => &m.profile,
            Account::User(u) => &u.profile,
        }
    }

    pub fn email(&self) -> &str {
        &self.profile().email
    }

    pub fn role(&self) -> Role {
        match self {
            Account::Member(_) => Role::Member,
            Account::User(_) => Role::User,
        }
    }

    /// Outstanding fines; staff never accrue any
    pub fn fines_due(&self) -> u32 {
        match self {
            Account::Member(_) => 0,
            Account::User(u) => u.fines_due,
        }
    }

    /// Exact, case-sensitive password comparison
    pub fn password_matches(&self, password: &str) -> bool {
        self.profile().password == password
    }

    /// Copy of this account with its profile replaced, balances kept
    pub fn with_profile(&self, profile: Profile) -> Account {
        match self {
            Account::Member(_) => Account::Member(Member { profile }),
            Account::User(u) => Account::User(User {
                profile,
                payment_due: u.payment_due,
                fines_due: u.fines_due,
            }),
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Account::User(u) => Some(u),
            Account::Member(_) => None,
        }
    }
}

impl Record for Member {
    type Row = Profile;
    const KIND: &'static str = "member";
    const FIELDS: usize = 4;

    fn to_row(&self) -> Profile {
        self.profile.clone()
    }

    fn from_row(row: Profile) -> Self {
        Member { profile: row }
    }
}

/// Flat `users.txt` line
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRow {
    name: String,
    email: String,
    phone: String,
    password: String,
    #[serde(with = "flag")]
    payment_due: bool,
    fines_due: u32,
}

impl Record for User {
    type Row = UserRow;
    const KIND: &'static str = "user";
    const FIELDS: usize = 6;

    fn to_row(&self) -> UserRow {
        let p = self.profile.clone();
        UserRow {
            name: p.name,
            email: p.email,
            phone: p.phone,
            password: p.password,
            payment_due: self.payment_due,
            fines_due: self.fines_due,
        }
    }

    fn from_row(row: UserRow) -> Self {
        User {
            profile: Profile::new(row.name, row.email, row.phone, row.password),
            payment_due: row.payment_due,
            fines_due: row.fines_due,
        }
    }
}
