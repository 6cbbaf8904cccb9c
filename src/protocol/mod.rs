//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (line oriented text)
//!
//! ### Request Format
//! ```text
//! VERB|field1|field2|...\n
//! ```
//!
//! ### Verbs
//! | Verb             | Auth | Fields                                            |
//! |------------------|------|---------------------------------------------------|
//! | SIGN_UP          | no   | name, email, phone, password, initial_payment     |
//! | SIGN_IN          | no   | email, password                                   |
//! | LOGOUT           | yes  | -                                                 |
//! | ADD_BOOK         | yes  | title, author, subject, price, copies             |
//! | REMOVE_BOOK      | yes  | title                                             |
//! | UPDATE_BOOK      | yes  | old_title, new_title, author, subject, price, copies |
//! | CHECK_COPIES     | yes  | title                                             |
//! | UPDATE_INFO      | yes  | name, email, phone, password                      |
//! | UPDATE_USER_INFO | yes  | target_email, name, email, phone, password        |
//! | COLLECT_PAYMENT  | yes  | email, amount                                     |
//! | COLLECT_FINE     | yes  | email, amount                                     |
//! | VIEW_USERS       | yes  | -                                                 |
//! | DELETE_USER      | yes  | email                                             |
//! | BORROW_BOOK      | yes  | email, title                                      |
//! | RETURN_BOOK      | yes  | email, title                                      |
//!
//! ### Response Format
//! ```text
//! Success: <message>\0
//! Error: <message>\0
//! ```

mod request;
mod response;
mod codec;

pub use request::{Request, Verb};
pub use response::{Response, Status};
pub use codec::{
    decode_fields, decode_request, decode_response, encode_request, encode_response,
    parse_verb, read_request, read_response, write_request, write_response,
    MAX_REQUEST_LEN, RESPONSE_TERMINATOR,
};
