//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single accept loop, one connection served at a time
//! - Each connection owns its session state
//! - Requests routed through the Library

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use client::Client;
