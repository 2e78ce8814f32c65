//! CSV import format of the MoneyMoney banking app.
//!
//! Semicolon separated, German dates and decimal commas. Card bookings name
//! the card as counter account so they can be told apart after import.

use std::io::Write;

use anyhow::{Context, Result};
use auszug_core::Transaction;
use rust_decimal::Decimal;

use crate::sort_newest_first;

pub const HEADER: [&str; 9] = [
    "Datum",
    "Wertstellung",
    "Kategorie",
    "Name",
    "Verwendungszweck",
    "Konto",
    "Bank",
    "Betrag",
    "Währung",
];

const CARD_KIND: &str = "VISA";
const CURRENCY: &str = "EUR";

/// `-1234.5` -> `-1234,50`
pub fn format_betrag(value: Decimal) -> String {
    let mut v = value.round_dp(2);
    v.rescale(2);
    v.to_string().replace('.', ",")
}

fn row(t: &Transaction) -> [String; 9] {
    let (konto, bank) = if t.kind == CARD_KIND {
        (t.account.replace('X', "*"), CARD_KIND.to_string())
    } else {
        (String::new(), String::new())
    };
    [
        t.booked.format("%d.%m.%Y").to_string(),
        t.valued.format("%d.%m.%Y").to_string(),
        String::new(),
        t.payee.clone().unwrap_or_else(|| t.kind.clone()),
        t.comment.clone(),
        konto,
        bank,
        format_betrag(t.value),
        CURRENCY.to_string(),
    ]
}

/// Write `transactions` in MoneyMoney CSV, newest value date first.
pub fn write_moneymoney<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sort_newest_first(&mut sorted);

    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    wtr.write_record(HEADER).context("writing MoneyMoney header")?;
    for t in sorted {
        wtr.write_record(row(t))
            .with_context(|| format!("writing transaction {}/{}", t.statement_label(), t.ordinal_label()))?;
    }
    wtr.flush().context("flushing MoneyMoney output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn card_txn() -> Transaction {
        Transaction {
            account: "493012XXXXXX0815".to_string(),
            year: 2019,
            statement: 3,
            ordinal: 1,
            booked: NaiveDate::from_ymd_opt(2019, 2, 7).unwrap(),
            valued: NaiveDate::from_ymd_opt(2019, 2, 8).unwrap(),
            kind: "VISA".to_string(),
            value: dec!(-23.45),
            payee: None,
            comment: "REWE MARKT BERLIN".to_string(),
            foreign: None,
        }
    }

    #[test]
    fn test_format_betrag() {
        assert_eq!(format_betrag(dec!(-1234.5)), "-1234,50");
        assert_eq!(format_betrag(dec!(0)), "0,00");
        assert_eq!(format_betrag(dec!(12.345)), "12,34");
    }

    #[test]
    fn test_card_row() {
        let mut out = Vec::new();
        write_moneymoney(&mut out, &[card_txn()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Datum;Wertstellung;Kategorie;Name;Verwendungszweck;Konto;Bank;Betrag;Währung"
        );
        assert_eq!(
            lines[1],
            "07.02.2019;08.02.2019;;VISA;REWE MARKT BERLIN;493012******0815;VISA;-23,45;EUR"
        );
    }

    #[test]
    fn test_account_row_uses_payee_and_no_counter_account() {
        let mut t = card_txn();
        t.kind = "Lastschrift".to_string();
        t.account = "0000001010001491".to_string();
        t.payee = Some("STADTWERKE".to_string());
        t.comment = "STADTWERKE Abschlag; Strom".to_string();

        let mut out = Vec::new();
        write_moneymoney(&mut out, &[t]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "07.02.2019;08.02.2019;;STADTWERKE;\"STADTWERKE Abschlag; Strom\";;;-23,45;EUR"
        );
    }
}
