//! libraryd Server Binary
//!
//! Starts the TCP server for the library.

use std::sync::Arc;

use clap::Parser;
use libraryd::network::Server;
use libraryd::{Config, Library};
use tracing_subscriber::{fmt, EnvFilter};

/// libraryd Server
#[derive(Parser, Debug)]
#[command(name = "libraryd")]
#[command(about = "Multi-user library server")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./library_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Loan period in days
    #[arg(long, default_value = "7")]
    loan_days: u32,

    /// Fine per full overdue day
    #[arg(long, default_value = "5")]
    daily_fine: u32,

    /// Read timeout per connection in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout per connection in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,libraryd=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("libraryd v{}", libraryd::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .loan_period_days(args.loan_days)
        .daily_fine(args.daily_fine)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    // Load the library
    let library = match Library::open(config.clone()) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            tracing::error!("Failed to open library: {}", e);
            std::process::exit(1);
        }
    };

    // Start server
    let mut server = Server::new(config, library);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
