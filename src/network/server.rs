//! TCP Server
//!
//! Accepts connections one at a time and serves each to completion.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{LibraryError, Result};
use crate::library::Library;

use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cloneable handle that stops a running server
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop after the current connection ends
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for the library
///
/// ## Session model
/// - One accept loop, no worker threads
/// - Each accepted connection is drained before the next accept
/// - The listener is non-blocking so the loop can notice shutdown; accepted
///   streams are switched back to blocking I/O
pub struct Server {
    config: Config,
    library: Arc<Library>,
    listener: Option<TcpListener>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Create a new server with the given config and library
    pub fn new(config: Config, library: Arc<Library>) -> Self {
        Self {
            config,
            library,
            listener: None,
            shutdown: ShutdownHandle::default(),
        }
    }

    /// Bind the listen address (if not bound yet) and return the local address
    ///
    /// Binding to port 0 picks a free port; the returned address has the real one.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            LibraryError::Network(format!("Failed to bind {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);

        tracing::info!("Server listening on {}", addr);
        Ok(addr)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        self.bind()?;
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| LibraryError::Network("Listener not bound".to_string()))?;

        while !self.shutdown.is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    tracing::info!("Connection accepted from {}", addr);
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    self.serve(stream);
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Server shutting down");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Serve one connection to completion; errors end only this connection
    fn serve(&self, stream: std::net::TcpStream) {
        let mut connection = match Connection::new(stream, Arc::clone(&self.library)) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Failed to set up connection: {}", e);
                return;
            }
        };

        if let Err(e) =
            connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)
        {
            tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        }

        match connection.handle() {
            Ok(()) => tracing::info!("Connection from {} closed", connection.peer_addr()),
            Err(e) => tracing::warn!("Connection from {} ended: {}", connection.peer_addr(), e),
        }
    }
}
