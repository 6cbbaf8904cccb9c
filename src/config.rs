//! Configuration for the library server
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a library server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── members.txt
    ///     ├── users.txt
    ///     ├── books.txt
    ///     ├── borrowings.txt
    ///     ├── payments.txt
    ///     └── fines.txt
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Lending Configuration
    // -------------------------------------------------------------------------
    /// How long a borrowed book may be kept (days)
    pub loan_period_days: u32,

    /// Fine charged per full day a book is overdue (currency units)
    pub daily_fine: u32,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Connection read timeout (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./library_data"),
            loan_period_days: 7,
            daily_fine: 5,
            listen_addr: "127.0.0.1:8080".to_string(),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Loan period in seconds
    pub fn loan_period_secs(&self) -> i64 {
        i64::from(self.loan_period_days) * crate::lending::SECONDS_PER_DAY
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the loan period (in days)
    pub fn loan_period_days(mut self, days: u32) -> Self {
        self.config.loan_period_days = days;
        self
    }

    /// Set the fine charged per full overdue day
    pub fn daily_fine(mut self, amount: u32) -> Self {
        self.config.daily_fine = amount;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
