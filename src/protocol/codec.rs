//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! VERB|field1|field2|...[\n]
//! ```
//! One request per send. The trailing newline is optional; when a send holds
//! several newline-separated requests they are handled one by one. Fields are
//! separated by `|`. A zero-field verb may be sent as `VERB` or `VERB|`.
//! Every field must be non-empty and free of control characters; integer
//! fields must be non-negative decimal numbers.
//!
//! ### Response
//! ```text
//! Success: <message>\0
//! Error: <message>\0
//! ```
//! The message may contain newlines, so responses end with a NUL byte.

use std::io::{BufRead, Write};

use crate::error::{LibraryError, Result};
use crate::model::{Book, Profile};
use crate::storage::record::FIELD_SEPARATOR;

use super::{Request, Response, Status, Verb};

/// Byte that ends every response on the wire
pub const RESPONSE_TERMINATOR: u8 = 0;

/// Longest request line accepted (bytes, excluding the newline)
pub const MAX_REQUEST_LEN: usize = 4096;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Split a request line into its verb and the raw field payload
///
/// Unknown verbs fail here, before any field is looked at.
pub fn parse_verb(line: &str) -> Result<(Verb, Option<&str>)> {
    let line = line.trim_end_matches(&['\n', '\r'][..]);
    let (name, payload) = match line.split_once(FIELD_SEPARATOR) {
        Some((name, payload)) => (name, Some(payload)),
        None => (line, None),
    };

    let verb = Verb::from_name(name.trim())
        .ok_or_else(|| LibraryError::UnknownCommand(name.to_string()))?;
    Ok((verb, payload))
}

/// Decode the field payload of `verb` into a request
///
/// Rejects the whole request if the field count is wrong, any field is empty
/// or any integer field does not parse.
pub fn decode_fields(verb: Verb, payload: Option<&str>) -> Result<Request> {
    let fields: Vec<&str> = match payload {
        None => Vec::new(),
        Some("") if verb.arity() == 0 => Vec::new(),
        Some(payload) => payload.split(FIELD_SEPARATOR).collect(),
    };

    if fields.len() != verb.arity() {
        return Err(LibraryError::InvalidFormat {
            label: verb.format_label(),
            reason: format!("{} expects {} fields, got {}", verb, verb.arity(), fields.len()),
        });
    }

    let mut f = FieldReader {
        verb,
        fields: fields.into_iter(),
    };

    let request = match verb {
        Verb::SignUp => Request::SignUp {
            profile: f.profile()?,
            initial_payment: f.number("initial_payment")?,
        },
        Verb::SignIn => Request::SignIn {
            email: f.text("email")?,
            password: f.text("password")?,
        },
        Verb::Logout => Request::Logout,
        Verb::AddBook => Request::AddBook(f.book()?),
        Verb::RemoveBook => Request::RemoveBook {
            title: f.text("title")?,
        },
        Verb::UpdateBook => Request::UpdateBook {
            old_title: f.text("old_title")?,
            book: f.book()?,
        },
        Verb::CheckCopies => Request::CheckCopies {
            title: f.text("title")?,
        },
        Verb::UpdateInfo => Request::UpdateInfo(f.profile()?),
        Verb::UpdateUserInfo => Request::UpdateUserInfo {
            target_email: f.text("target_email")?,
            profile: f.profile()?,
        },
        Verb::CollectPayment => Request::CollectPayment {
            email: f.text("email")?,
            amount: f.number("amount")?,
        },
        Verb::CollectFine => Request::CollectFine {
            email: f.text("email")?,
            amount: f.number("amount")?,
        },
        Verb::ViewUsers => Request::ViewUsers,
        Verb::DeleteUser => Request::DeleteUser {
            email: f.text("email")?,
        },
        Verb::BorrowBook => Request::BorrowBook {
            email: f.text("email")?,
            title: f.text("title")?,
        },
        Verb::ReturnBook => Request::ReturnBook {
            email: f.text("email")?,
            title: f.text("title")?,
        },
    };

    Ok(request)
}

/// Decode a complete request line
pub fn decode_request(line: &str) -> Result<Request> {
    let (verb, payload) = parse_verb(line)?;
    decode_fields(verb, payload)
}

/// Encode a request as a line, without the trailing newline
pub fn encode_request(request: &Request) -> String {
    let mut fields: Vec<String> = Vec::new();

    match request {
        Request::SignUp {
            profile,
            initial_payment,
        } => {
            push_profile(&mut fields, profile);
            fields.push(initial_payment.to_string());
        }
        Request::SignIn { email, password } => {
            fields.push(email.clone());
            fields.push(password.clone());
        }
        Request::Logout | Request::ViewUsers => {}
        Request::AddBook(book) => push_book(&mut fields, book),
        Request::RemoveBook { title } | Request::CheckCopies { title } => {
            fields.push(title.clone());
        }
        Request::UpdateBook { old_title, book } => {
            fields.push(old_title.clone());
            push_book(&mut fields, book);
        }
        Request::UpdateInfo(profile) => push_profile(&mut fields, profile),
        Request::UpdateUserInfo {
            target_email,
            profile,
        } => {
            fields.push(target_email.clone());
            push_profile(&mut fields, profile);
        }
        Request::CollectPayment { email, amount } | Request::CollectFine { email, amount } => {
            fields.push(email.clone());
            fields.push(amount.to_string());
        }
        Request::DeleteUser { email } => fields.push(email.clone()),
        Request::BorrowBook { email, title } | Request::ReturnBook { email, title } => {
            fields.push(email.clone());
            fields.push(title.clone());
        }
    }

    let mut line = request.verb().name().to_string();
    for field in fields {
        line.push(FIELD_SEPARATOR);
        line.push_str(&field);
    }
    line
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes, terminator included
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut bytes = response.to_string().into_bytes();
    bytes.push(RESPONSE_TERMINATOR);
    bytes
}

/// Decode a response from its text (terminator already removed)
pub fn decode_response(text: &str) -> Result<Response> {
    let (status, rest) = if let Some(rest) = text.strip_prefix(Status::Success.prefix()) {
        (Status::Success, rest)
    } else if let Some(rest) = text.strip_prefix(Status::Error.prefix()) {
        (Status::Error, rest)
    } else {
        return Err(LibraryError::Network(format!(
            "Malformed response: {:?}",
            text
        )));
    };

    let message = rest.strip_prefix(':').unwrap_or(rest);
    let message = message.strip_prefix(' ').unwrap_or(message);

    Ok(Response {
        status,
        message: message.to_string(),
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read the next request from a stream
///
/// One receive carries one request. If the received bytes contain newlines,
/// the request ends at the first one and the rest stays buffered for the next
/// call; otherwise everything received is the request. Returns `Ok(None)` at
/// end of stream. Overlong requests are rejected.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let chunk = reader.fill_buf()?;
    if chunk.is_empty() {
        return Ok(None);
    }

    let (len, consumed) = match chunk.iter().position(|&b| b == b'\n') {
        Some(pos) => (pos, pos + 1),
        None => (chunk.len(), chunk.len()),
    };
    let line = String::from_utf8_lossy(&chunk[..len])
        .trim_end_matches(&['\r', '\n'][..])
        .to_string();
    reader.consume(consumed);

    if len > MAX_REQUEST_LEN {
        return Err(LibraryError::Network(format!(
            "Request longer than {} bytes",
            MAX_REQUEST_LEN
        )));
    }
    Ok(Some(line))
}

/// Write a request line to a stream
pub fn write_request<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
///
/// Returns `Ok(None)` if the peer closed the connection before sending one.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Option<Response>> {
    let mut buf = Vec::new();
    let read = reader.read_until(RESPONSE_TERMINATOR, &mut buf)?;
    if read == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&RESPONSE_TERMINATOR) {
        buf.pop();
    }
    decode_response(&String::from_utf8_lossy(&buf)).map(Some)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Sequential access to the fields of one request
struct FieldReader<'a> {
    verb: Verb,
    fields: std::vec::IntoIter<&'a str>,
}

impl FieldReader<'_> {
    fn invalid(&self, reason: String) -> LibraryError {
        LibraryError::InvalidFormat {
            label: self.verb.format_label(),
            reason,
        }
    }

    /// Next field as non-empty text without control characters
    fn text(&mut self, name: &str) -> Result<String> {
        match self.fields.next() {
            Some(field) if field.chars().any(char::is_control) => {
                Err(self.invalid(format!("{} contains a control character", name)))
            }
            Some(field) if !field.is_empty() => Ok(field.to_string()),
            Some(_) => Err(self.invalid(format!("{} is empty", name))),
            None => Err(self.invalid(format!("{} is missing", name))),
        }
    }

    /// Next field as a non-negative integer
    fn number(&mut self, name: &str) -> Result<u32> {
        let text = self.text(name)?;
        text.trim()
            .parse()
            .map_err(|_| self.invalid(format!("{} '{}' is not a non-negative integer", name, text)))
    }

    fn profile(&mut self) -> Result<Profile> {
        Ok(Profile {
            name: self.text("name")?,
            email: self.text("email")?,
            phone: self.text("phone")?,
            password: self.text("password")?,
        })
    }

    fn book(&mut self) -> Result<Book> {
        Ok(Book {
            title: self.text("title")?,
            author: self.text("author")?,
            subject: self.text("subject")?,
            price: self.number("price")?,
            copies: self.number("copies")?,
        })
    }
}

fn push_profile(fields: &mut Vec<String>, profile: &Profile) {
    fields.push(profile.name.clone());
    fields.push(profile.email.clone());
    fields.push(profile.phone.clone());
    fields.push(profile.password.clone());
}

fn push_book(fields: &mut Vec<String>, book: &Book) {
    fields.push(book.title.clone());
    fields.push(book.author.clone());
    fields.push(book.subject.clone());
    fields.push(book.price.to_string());
    fields.push(book.copies.to_string());
}
