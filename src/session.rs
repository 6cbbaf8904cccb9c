//! Session Module
//!
//! Per-connection authentication state.
//!
//! ## States
//! ```text
//!              SIGN_IN (ok)
//!   Anonymous ─────────────▶ Authenticated{email, role}
//!       ▲  │                        │
//!       │  └─ SIGN_UP (stays)       │
//!       └────────── LOGOUT ─────────┘
//! ```
//! Privileged verbs sent while `Anonymous` are refused before their fields are
//! decoded, so they can have no side effect.

use crate::error::{LibraryError, Result};
use crate::library::{Library, Outcome};
use crate::model::Role;
use crate::protocol::{decode_fields, parse_verb, Response};

/// Who is signed in on this connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

/// Authentication state of one connection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

/// Drives one connection's requests through the library
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// A fresh, anonymous session
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    /// Handle one request line and produce the response to send back
    ///
    /// Every error becomes an `Error:` response; nothing here ends the session.
    pub fn handle_line(&mut self, library: &Library, line: &str) -> Response {
        match self.process(library, line) {
            Ok(message) => Response::success(message),
            Err(e) => {
                if e.is_internal() {
                    tracing::error!("Request {:?} failed: {}", line, e);
                } else {
                    tracing::debug!("Request {:?} rejected: {:?}", line, e);
                }
                Response::error(&e)
            }
        }
    }

    fn process(&mut self, library: &Library, line: &str) -> Result<String> {
        let (verb, payload) = parse_verb(line)?;

        if verb.requires_auth() && !self.is_authenticated() {
            return Err(LibraryError::NotSignedIn);
        }

        let request = decode_fields(verb, payload)?;
        let caller = self.identity().map(|i| i.email.clone());
        let outcome = library.execute(request, caller.as_deref())?;

        Ok(self.apply(outcome))
    }

    /// Apply a state transition and return the client message
    fn apply(&mut self, outcome: Outcome) -> String {
        match outcome {
            Outcome::Done(message) => message,
            Outcome::SignedIn { email, role } => {
                self.state = SessionState::Authenticated(Identity { email, role });
                "Sign-in successful.".to_string()
            }
            Outcome::SignedOut => {
                if let Some(identity) = self.identity() {
                    tracing::info!("Logged out: {}", identity.email);
                }
                self.state = SessionState::Anonymous;
                "Logged out.".to_string()
            }
            Outcome::ProfileUpdated { email, message } => {
                if let SessionState::Authenticated(identity) = &mut self.state {
                    identity.email = email;
                }
                message
            }
        }
    }
}
