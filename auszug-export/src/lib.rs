//! auszug-export: write parsed transactions as generic CSV or in the
//! MoneyMoney import format, and read the generic CSV back.

pub mod csv_export;
pub mod moneymoney;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use anyhow::Result;
use auszug_core::Transaction;
use serde::{Deserialize, Serialize};

pub use csv_export::{read_transactions, write_transactions, CsvRecord};
pub use moneymoney::write_moneymoney;

/// Output flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    MoneyMoney,
}

impl ExportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::MoneyMoney => "moneymoney",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "moneymoney" => Ok(ExportFormat::MoneyMoney),
            other => Err(format!("unknown output format '{other}' (expected csv or moneymoney)")),
        }
    }
}

/// Write `transactions` in `format`.
pub fn write<W: Write>(format: ExportFormat, writer: W, transactions: &[Transaction]) -> Result<()> {
    match format {
        ExportFormat::Csv => write_transactions(writer, transactions),
        ExportFormat::MoneyMoney => write_moneymoney(writer, transactions),
    }
}

/// Newest value date first. Equal dates keep their input order.
pub(crate) fn sort_newest_first(transactions: &mut [&Transaction]) {
    transactions.sort_by(|a, b| b.valued.cmp(&a.valued));
}
