//! Record Tests
//!
//! Tests for the on-disk line format of every entity.

use chrono::NaiveDate;
use libraryd::model::{Account, Book, Borrowing, LedgerEntry, Member, Profile, Role, User};
use libraryd::storage::Record;
use libraryd::LibraryError;

fn profile() -> Profile {
    Profile::new("Ada Lovelace", "ada@example.com", "555-0100", "pw")
}

// =============================================================================
// Account Tests
// =============================================================================

#[test]
fn test_member_line() {
    let member = Member { profile: profile() };

    assert_eq!(member.encode().unwrap(), "Ada Lovelace|ada@example.com|555-0100|pw");
    assert_eq!(Member::decode(&member.encode().unwrap()).unwrap(), member);
}

#[test]
fn test_user_line() {
    let user = User {
        profile: profile(),
        payment_due: true,
        fines_due: 15,
    };

    assert_eq!(user.encode().unwrap(), "Ada Lovelace|ada@example.com|555-0100|pw|1|15");
    assert_eq!(User::decode("Ada Lovelace|ada@example.com|555-0100|pw|1|15").unwrap(), user);
}

#[test]
fn test_user_payment_flag_from_initial_payment() {
    assert!(User::new(profile(), 0).payment_due);
    assert!(!User::new(profile(), 20).payment_due);
    assert_eq!(User::new(profile(), 20).fines_due, 0);
}

#[test]
fn test_user_rejects_wrong_field_count() {
    // A member line is not a user line
    let err = User::decode("Ada Lovelace|ada@example.com|555-0100|pw").unwrap_err();

    assert!(matches!(err, LibraryError::CorruptRecord(_)));
}

#[test]
fn test_user_rejects_bad_fines() {
    assert!(User::decode("A|a@x|1|pw|0|lots").is_err());
    assert!(User::decode("A|a@x|1|pw|0|-3").is_err());
}

#[test]
fn test_account_accessors() {
    let member = Account::Member(Member { profile: profile() });
    let user = Account::User(User {
        profile: profile(),
        payment_due: false,
        fines_due: 7,
    });

    assert_eq!(member.role(), Role::Member);
    assert_eq!(user.role(), Role::User);
    assert_eq!(member.fines_due(), 0);
    assert_eq!(user.fines_due(), 7);
    assert!(member.as_user().is_none());
    assert_eq!(user.email(), "ada@example.com");
}

#[test]
fn test_password_match_is_exact() {
    let account = Account::User(User::new(profile(), 0));

    assert!(account.password_matches("pw"));
    assert!(!account.password_matches("PW"));
    assert!(!account.password_matches("pw "));
}

#[test]
fn test_with_profile_keeps_balances() {
    let account = Account::User(User {
        profile: profile(),
        payment_due: true,
        fines_due: 9,
    });

    let updated = account.with_profile(Profile::new("Ada", "ada@new.org", "1", "x"));

    let user = updated.as_user().unwrap();
    assert_eq!(user.profile.email, "ada@new.org");
    assert!(user.payment_due);
    assert_eq!(user.fines_due, 9);
}

// =============================================================================
// Book / Borrowing Tests
// =============================================================================

#[test]
fn test_book_line() {
    let book = Book::new("Dune", "Frank Herbert", "SF", 12, 3);

    assert_eq!(book.encode().unwrap(), "Dune|Frank Herbert|SF|12|3");
    assert_eq!(Book::decode("Dune|Frank Herbert|SF|12|3").unwrap(), book);
}

#[test]
fn test_book_text_is_stored_verbatim() {
    let book = Book::new("\"Quoted\" Title", " Padded Author ", "Sci, Fi", 12, 3);

    let line = book.encode().unwrap();

    assert_eq!(line, "\"Quoted\" Title| Padded Author |Sci, Fi|12|3");
    assert_eq!(Book::decode(&line).unwrap(), book);
}

#[test]
fn test_book_rejects_extra_field() {
    assert!(matches!(
        Book::decode("Dune|Frank Herbert|SF|12|3|extra"),
        Err(LibraryError::CorruptRecord(_))
    ));
}

#[test]
fn test_book_rejects_empty_field() {
    assert!(Book::decode("Dune||SF|12|3").is_err());
}

#[test]
fn test_with_copies() {
    let book = Book::new("Dune", "Frank Herbert", "SF", 12, 3);

    let fewer = book.with_copies(1);

    assert_eq!(fewer.copies, 1);
    assert_eq!(fewer.title, book.title);
    assert_eq!(fewer.price, book.price);
}

#[test]
fn test_borrowing_line() {
    let loan = Borrowing::new("ada@example.com", "Dune", 1_700_604_800);

    assert_eq!(loan.encode().unwrap(), "ada@example.com|Dune|1700604800");
    assert_eq!(Borrowing::decode(&loan.encode().unwrap()).unwrap(), loan);
    assert!(loan.is_for("ada@example.com", "Dune"));
    assert!(!loan.is_for("ada@example.com", "Emma"));
}

// =============================================================================
// Ledger Tests
// =============================================================================

#[test]
fn test_ledger_line() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let entry = LedgerEntry::new("ada@example.com", 40, date);

    assert_eq!(entry.encode().unwrap(), "ada@example.com|40|2024-03-09");
    assert_eq!(LedgerEntry::decode("ada@example.com|40|2024-03-09").unwrap(), entry);
}

#[test]
fn test_ledger_rejects_bad_date() {
    assert!(LedgerEntry::decode("ada@example.com|40|09/03/2024").is_err());
}
