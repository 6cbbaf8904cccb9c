//! Client
//!
//! Minimal blocking client: send a request line, wait for its response.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{LibraryError, Result};
use crate::protocol::{encode_request, read_response, write_request, Request, Response};

/// A connection to a library server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a raw `VERB|field|...` line and wait for the response
    pub fn send_line(&mut self, line: &str) -> Result<Response> {
        write_request(&mut self.writer, line)?;
        read_response(&mut self.reader)?
            .ok_or_else(|| LibraryError::Network("Server closed the connection".to_string()))
    }

    /// Send a structured request and wait for the response
    pub fn send(&mut self, request: &Request) -> Result<Response> {
        self.send_line(&encode_request(request))
    }
}
