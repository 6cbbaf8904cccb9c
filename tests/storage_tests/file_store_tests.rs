//! File Store Tests
//!
//! Tests for loading, appending and rewriting data files.

use std::fs;

use libraryd::model::Book;
use libraryd::storage::{DataFile, FileStore, Rewrite};
use libraryd::LibraryError;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

fn setup_temp_store() -> (FileStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path()).unwrap();
    (store, temp_dir)
}

fn write_books(store: &FileStore, contents: &str) {
    fs::write(store.path(DataFile::Books), contents).unwrap();
}

fn read_books(store: &FileStore) -> String {
    fs::read_to_string(store.path(DataFile::Books)).unwrap()
}

// =============================================================================
// Open / Load Tests
// =============================================================================

#[test]
fn test_open_creates_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b");

    let store = FileStore::open(&nested).unwrap();

    assert!(nested.is_dir());
    assert_eq!(store.data_dir(), nested.as_path());
}

#[test]
fn test_file_names() {
    let (store, temp_dir) = setup_temp_store();

    assert_eq!(store.path(DataFile::Members), temp_dir.path().join("members.txt"));
    assert_eq!(store.path(DataFile::Users), temp_dir.path().join("users.txt"));
    assert_eq!(store.path(DataFile::Books), temp_dir.path().join("books.txt"));
    assert_eq!(
        store.path(DataFile::Borrowings),
        temp_dir.path().join("borrowings.txt")
    );
    assert_eq!(store.path(DataFile::Payments), temp_dir.path().join("payments.txt"));
    assert_eq!(store.path(DataFile::Fines), temp_dir.path().join("fines.txt"));
}

#[test]
fn test_load_missing_file_is_empty() {
    let (store, _temp) = setup_temp_store();

    let books: Vec<Book> = store.load(DataFile::Books).unwrap();

    assert!(books.is_empty());
    assert_eq!(store.read_raw(DataFile::Books).unwrap(), "");
}

#[test]
fn test_load_skips_corrupt_lines() {
    let (store, _temp) = setup_temp_store();
    write_books(
        &store,
        "Dune|Herbert|SF|10|2\nthis is not a book\nEmma|Austen|Novel|x|1\nEmma|Austen|Novel|8|1\n",
    );

    let books: Vec<Book> = store.load(DataFile::Books).unwrap();

    assert_eq!(
        books,
        vec![
            Book::new("Dune", "Herbert", "SF", 10, 2),
            Book::new("Emma", "Austen", "Novel", 8, 1),
        ]
    );
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_append_creates_and_extends_file() {
    let (store, _temp) = setup_temp_store();

    store
        .append(DataFile::Books, &Book::new("Dune", "Herbert", "SF", 10, 2))
        .unwrap();
    store
        .append(DataFile::Books, &Book::new("Emma", "Austen", "Novel", 8, 1))
        .unwrap();

    assert_eq!(read_books(&store), "Dune|Herbert|SF|10|2\nEmma|Austen|Novel|8|1\n");
}

// =============================================================================
// Rewrite Tests
// =============================================================================

#[test]
fn test_rewrite_replaces_matching_row() {
    let (store, _temp) = setup_temp_store();
    write_books(&store, "Dune|Herbert|SF|10|2\nEmma|Austen|Novel|8|1\n");

    let changed = store
        .rewrite(DataFile::Books, |book: &Book| {
            if book.title == "Emma" {
                Ok(Rewrite::Replace(book.with_copies(5)))
            } else {
                Ok(Rewrite::Keep)
            }
        })
        .unwrap();

    assert_eq!(changed, 1);
    assert_eq!(read_books(&store), "Dune|Herbert|SF|10|2\nEmma|Austen|Novel|8|5\n");
}

#[test]
fn test_rewrite_drops_row() {
    let (store, _temp) = setup_temp_store();
    write_books(&store, "Dune|Herbert|SF|10|2\nEmma|Austen|Novel|8|1\n");

    let changed = store
        .rewrite(DataFile::Books, |book: &Book| {
            Ok(if book.title == "Dune" {
                Rewrite::Drop
            } else {
                Rewrite::Keep
            })
        })
        .unwrap();

    assert_eq!(changed, 1);
    assert_eq!(read_books(&store), "Emma|Austen|Novel|8|1\n");
}

#[test]
fn test_rewrite_passes_corrupt_lines_through() {
    let (store, _temp) = setup_temp_store();
    write_books(&store, "garbage line\nDune|Herbert|SF|10|2\n\nEmma|Austen|Novel|8|1");

    store
        .rewrite(DataFile::Books, |book: &Book| {
            Ok(Rewrite::Replace(book.with_copies(book.copies + 1)))
        })
        .unwrap();

    assert_eq!(
        read_books(&store),
        "garbage line\nDune|Herbert|SF|10|3\n\nEmma|Austen|Novel|8|2\n"
    );
}

#[test]
fn test_rewrite_without_changes_leaves_file_alone() {
    let (store, temp_dir) = setup_temp_store();
    let original = "Dune|Herbert|SF|10|2\r\nEmma|Austen|Novel|8|1";
    write_books(&store, original);

    let changed = store
        .rewrite(DataFile::Books, |_: &Book| Ok(Rewrite::Keep))
        .unwrap();

    assert_eq!(changed, 0);
    assert_eq!(read_books(&store), original);
    assert!(!temp_dir.path().join("books.txt.tmp").exists());
}

#[test]
fn test_rewrite_missing_file() {
    let (store, temp_dir) = setup_temp_store();

    let changed = store
        .rewrite(DataFile::Books, |_: &Book| Ok(Rewrite::Drop))
        .unwrap();

    assert_eq!(changed, 0);
    assert!(!store.path(DataFile::Books).exists());
    assert!(!temp_dir.path().join("books.txt.tmp").exists());
}

#[test]
fn test_rewrite_error_keeps_original() {
    let (store, temp_dir) = setup_temp_store();
    let original = "Dune|Herbert|SF|10|2\nEmma|Austen|Novel|8|1\n";
    write_books(&store, original);

    let result = store.rewrite(DataFile::Books, |book: &Book| {
        if book.title == "Emma" {
            Err(LibraryError::BookNotFound)
        } else {
            Ok(Rewrite::Drop)
        }
    });

    assert!(matches!(result, Err(LibraryError::BookNotFound)));
    assert_eq!(read_books(&store), original);
    assert!(!temp_dir.path().join("books.txt.tmp").exists());
}

#[test]
fn test_rewrite_then_reload() {
    let (store, _temp) = setup_temp_store();
    for i in 0..10u32 {
        store
            .append(
                DataFile::Books,
                &Book::new(format!("Title {}", i), "Author", "Subject", i, 1),
            )
            .unwrap();
    }

    store
        .rewrite(DataFile::Books, |book: &Book| {
            Ok(if book.price % 2 == 0 {
                Rewrite::Drop
            } else {
                Rewrite::Keep
            })
        })
        .unwrap();

    let books: Vec<Book> = store.load(DataFile::Books).unwrap();
    let prices: Vec<u32> = books.iter().map(|b| b.price).collect();
    assert_eq!(prices, vec![1, 3, 5, 7, 9]);
}
