//! Generic transaction CSV, one row per booking:
//!
//! account,year,statement,transaction,booked,valued,value,type,payee,comment
//!
//! Dates are ISO (`yyyy-mm-dd`), amounts use a decimal point, statement and
//! transaction numbers are zero-padded so the file sorts naturally.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use auszug_core::Transaction;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::sort_newest_first;

pub const HEADER: [&str; 10] = [
    "account",
    "year",
    "statement",
    "transaction",
    "booked",
    "valued",
    "value",
    "type",
    "payee",
    "comment",
];

/// Fraction digits kept when reading amounts back.
pub const READ_SCALE: u32 = 2;

/// One CSV row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRecord {
    pub account: String,
    pub year: i32,
    pub statement: String,
    pub transaction: String,
    pub booked: NaiveDate,
    pub valued: NaiveDate,
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
    pub payee: Option<String>,
    pub comment: String,
}

impl From<&Transaction> for CsvRecord {
    fn from(t: &Transaction) -> Self {
        Self {
            account: t.account.clone(),
            year: t.year,
            statement: t.statement_label(),
            transaction: t.ordinal_label(),
            booked: t.booked,
            valued: t.valued,
            value: t.value,
            kind: t.kind.clone(),
            payee: t.payee.clone(),
            comment: t.comment.clone(),
        }
    }
}

impl CsvRecord {
    /// Back to a transaction. Foreign-currency details are not part of the
    /// file and come back as `None`.
    pub fn into_transaction(self) -> Result<Transaction> {
        let statement = self
            .statement
            .parse()
            .with_context(|| format!("statement number '{}'", self.statement))?;
        let ordinal = self
            .transaction
            .parse()
            .with_context(|| format!("transaction number '{}'", self.transaction))?;
        let mut value = self.value.round_dp(READ_SCALE);
        value.rescale(READ_SCALE);

        Ok(Transaction {
            account: self.account,
            year: self.year,
            statement,
            ordinal,
            booked: self.booked,
            valued: self.valued,
            kind: self.kind,
            value,
            payee: self.payee.filter(|p| !p.is_empty()),
            comment: self.comment,
            foreign: None,
        })
    }
}

/// Write `transactions` as CSV, newest value date first. The header is
/// written even when there are no rows.
pub fn write_transactions<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sort_newest_first(&mut sorted);

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(HEADER).context("writing CSV header")?;
    for t in sorted {
        wtr.serialize(CsvRecord::from(t))
            .with_context(|| format!("writing transaction {}/{}", t.statement_label(), t.ordinal_label()))?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// Read a file produced by [`write_transactions`].
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut txns = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRecord>().enumerate() {
        // header is line 1
        let record = row.with_context(|| format!("reading CSV row {}", i + 2))?;
        txns.push(record.into_transaction()?);
    }
    Ok(txns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(day: u32, value: Decimal, payee: Option<&str>) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2015, 3, day).unwrap();
        Transaction {
            account: "0000001010001491".to_string(),
            year: 2015,
            statement: 4,
            ordinal: day,
            booked: date,
            valued: date,
            kind: "Lastschrift".to_string(),
            value,
            payee: payee.map(str::to_string),
            comment: payee.unwrap_or_default().to_string(),
            foreign: None,
        }
    }

    #[test]
    fn test_header_and_padding() {
        let mut out = Vec::new();
        write_transactions(&mut out, &[txn(4, dec!(-42.30), Some("STADTWERKE"))]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("account,year,statement,transaction,booked,valued,value,type,payee,comment")
        );
        assert_eq!(
            lines.next(),
            Some("0000001010001491,2015,04,004,2015-03-04,2015-03-04,-42.30,Lastschrift,STADTWERKE,STADTWERKE")
        );
    }

    #[test]
    fn test_empty_input_still_has_header() {
        let mut out = Vec::new();
        write_transactions(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", HEADER.join(",")));
        assert!(read_transactions(HEADER.join(",").as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_newest_value_date_first() {
        let mut out = Vec::new();
        let txns = [txn(1, dec!(1.00), None), txn(9, dec!(2.00), None), txn(5, dec!(3.00), None)];
        write_transactions(&mut out, &txns).unwrap();
        let back = read_transactions(out.as_slice()).unwrap();
        let days: Vec<u32> = back.iter().map(|t| t.ordinal).collect();
        assert_eq!(days, vec![9, 5, 1]);
    }

    #[test]
    fn test_read_quantizes_to_cents() {
        let csv = "account,year,statement,transaction,booked,valued,value,type,payee,comment\n\
                   0000001010001491,2015,04,001,2015-03-04,2015-03-04,-42.3,Lastschrift,,note\n";
        let back = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(back[0].value.to_string(), "-42.30");
        assert_eq!(back[0].payee, None);
        assert_eq!(back[0].statement, 4);
    }

    #[test]
    fn test_bad_row_names_line() {
        let csv = "account,year,statement,transaction,booked,valued,value,type,payee,comment\n\
                   x,2015,04,001,04.03.2015,2015-03-04,1.00,VISA,,\n";
        let err = read_transactions(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("row 2"), "{err:#}");
    }
}
