//! libraryd CLI Client
//!
//! Sends request lines to a library server over one connection and prints
//! each response.
//!
//! ```text
//! library-cli 'SIGN_IN|admin@lib.org|secret' 'CHECK_COPIES|Dune'
//! printf 'SIGN_IN|a@b.c|pw\nVIEW_USERS\n' | library-cli
//! ```

use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::Parser;
use libraryd::network::Client;

/// libraryd CLI
#[derive(Parser, Debug)]
#[command(name = "library-cli")]
#[command(about = "CLI for the libraryd server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Request lines (`VERB|field|...`); read from stdin when none are given
    requests: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Connection to {} failed: {}", args.server, e);
            return ExitCode::FAILURE;
        }
    };

    let lines: Box<dyn Iterator<Item = io::Result<String>>> = if args.requests.is_empty() {
        Box::new(io::stdin().lock().lines())
    } else {
        Box::new(args.requests.into_iter().map(Ok))
    };

    let mut all_ok = true;
    for line in lines {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match client.send_line(&line) {
            Ok(response) => {
                all_ok &= response.is_success();
                println!("{}", response);
            }
            Err(e) => {
                eprintln!("Request failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
