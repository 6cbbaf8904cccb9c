//! Payment and fine ledgers
//!
//! Both ledgers share one append-only line format and are never rewritten.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::record::Record;

/// Date format used in ledger files
pub const LEDGER_DATE_FORMAT: &str = "%Y-%m-%d";

/// A collected payment or fine: `email|amount|YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub email: String,
    pub amount: u32,
    #[serde(with = "ledger_date")]
    pub date: NaiveDate,
}

impl LedgerEntry {
    pub fn new(email: impl Into<String>, amount: u32, date: NaiveDate) -> Self {
        Self {
            email: email.into(),
            amount,
            date,
        }
    }
}

impl Record for LedgerEntry {
    type Row = LedgerEntry;
    const KIND: &'static str = "ledger";
    const FIELDS: usize = 3;

    fn to_row(&self) -> LedgerEntry {
        self.clone()
    }

    fn from_row(row: LedgerEntry) -> Self {
        row
    }
}

/// `NaiveDate` stored as `YYYY-MM-DD`
mod ledger_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::LEDGER_DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(LEDGER_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(raw.trim(), LEDGER_DATE_FORMAT).map_err(de::Error::custom)
    }
}
