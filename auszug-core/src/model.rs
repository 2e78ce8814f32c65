//! Statement and transaction records produced by the parsers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reconcile::Reconciliation;

/// Width account numbers of current-account statements are zero-padded to.
pub const ACCOUNT_WIDTH: usize = 16;

/// Page layout a statement was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Older current-account layout: sign by column position, `dd.mm.` dates.
    Legacy,
    /// Current-account layout with separate Soll/Haben amount columns.
    Modern,
    /// Credit-card statement with explicit sign markers.
    Card,
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Legacy => "legacy",
            Layout::Modern => "modern",
            Layout::Card => "card",
        }
    }
}

/// One billing-period document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Where the text came from (usually the PDF path)
    pub source: String,
    pub layout: Layout,
    pub account: Option<String>,
    /// Only printed by the legacy layout
    pub iban: Option<String>,
    /// Statement sequence number; the month number for card statements
    pub number: Option<u32>,
    pub year: Option<i32>,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
    pub opening_balance: Option<Decimal>,
    pub opening_date: Option<NaiveDate>,
    pub closing_balance: Option<Decimal>,
    pub closing_date: Option<NaiveDate>,
}

impl Statement {
    pub fn new(source: impl Into<String>, layout: Layout) -> Self {
        Self {
            source: source.into(),
            layout,
            account: None,
            iban: None,
            number: None,
            year: None,
            period_from: None,
            period_to: None,
            opening_balance: None,
            opening_date: None,
            closing_balance: None,
            closing_date: None,
        }
    }

    /// Balance movement the statement itself reports, if both ends are known.
    pub fn balance_delta(&self) -> Option<Decimal> {
        Some(self.closing_balance? - self.opening_balance?)
    }
}

/// Account number left-padded with zeros to [`ACCOUNT_WIDTH`].
pub fn pad_account(account: &str) -> String {
    format!("{:0>width$}", account.trim(), width = ACCOUNT_WIDTH)
}

/// Card number with the grouping blanks removed (`1234 56XX XXXX 7890` → `123456XXXXXX7890`).
pub fn compact_card_number(card: &str) -> String {
    card.split_whitespace().collect()
}

/// Extra columns of a card booking settled in another currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignAmount {
    /// ISO 4217 code
    pub currency: String,
    pub amount: Decimal,
    pub rate: Decimal,
}

/// One booked line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub account: String,
    pub year: i32,
    pub statement: u32,
    /// 1-based position within the statement, in document order
    pub ordinal: u32,
    pub booked: NaiveDate,
    pub valued: NaiveDate,
    /// Short booking type, e.g. "Lastschrift" or "VISA"
    pub kind: String,
    /// Negative = debit, positive = credit
    pub value: Decimal,
    pub payee: Option<String>,
    pub comment: String,
    pub foreign: Option<ForeignAmount>,
}

impl Transaction {
    /// Apply a wrapped free-text line from an account statement.
    ///
    /// The first one becomes the payee and starts the comment; later ones
    /// are appended to the comment only.
    pub fn push_detail(&mut self, text: &str) {
        let text = text.trim();
        if self.payee.is_none() {
            self.payee = Some(text.to_string());
            self.comment = text.to_string();
        } else {
            self.extend_comment(text);
        }
    }

    /// Append a line to the comment, space separated.
    pub fn extend_comment(&mut self, text: &str) {
        let text = text.trim();
        if self.comment.is_empty() {
            self.comment = text.to_string();
        } else {
            self.comment.push(' ');
            self.comment.push_str(text);
        }
    }

    /// Statement number as exported (`"04"`).
    pub fn statement_label(&self) -> String {
        format!("{:02}", self.statement)
    }

    /// Ordinal as exported (`"007"`).
    pub fn ordinal_label(&self) -> String {
        format!("{:03}", self.ordinal)
    }
}

/// Everything one parse of one document yields.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub statement: Statement,
    pub transactions: Vec<Transaction>,
    pub reconciliation: Reconciliation,
}

impl ParsedStatement {
    pub fn total(&self) -> Decimal {
        self.transactions.iter().map(|t| t.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn() -> Transaction {
        Transaction {
            account: pad_account("1010001491"),
            year: 2015,
            statement: 4,
            ordinal: 7,
            booked: NaiveDate::from_ymd_opt(2015, 4, 1).unwrap(),
            valued: NaiveDate::from_ymd_opt(2015, 4, 1).unwrap(),
            kind: "Lastschrift".to_string(),
            value: dec!(-12.30),
            payee: None,
            comment: String::new(),
            foreign: None,
        }
    }

    #[test]
    fn test_details_fill_payee_then_comment() {
        let mut t = txn();
        t.push_detail("Foo");
        t.push_detail("Bar");
        assert_eq!(t.payee.as_deref(), Some("Foo"));
        assert_eq!(t.comment, "Foo Bar");
    }

    #[test]
    fn test_comment_is_superset_of_payee() {
        let mut t = txn();
        for line in ["ACME GmbH", "Rechnung 42", "Kundennr. 7"] {
            t.push_detail(line);
        }
        let payee = t.payee.clone().unwrap();
        assert!(t.comment.starts_with(&payee));
        assert_eq!(t.comment, "ACME GmbH Rechnung 42 Kundennr. 7");
    }

    #[test]
    fn test_extend_comment_on_existing_text() {
        let mut t = txn();
        t.comment = "AMAZON".to_string();
        t.extend_comment("  Seattle  ");
        assert_eq!(t.comment, "AMAZON Seattle");
        assert!(t.payee.is_none());
    }

    #[test]
    fn test_labels_and_account_normalization() {
        let t = txn();
        assert_eq!(t.account, "0000001010001491");
        assert_eq!(t.statement_label(), "04");
        assert_eq!(t.ordinal_label(), "007");
        assert_eq!(compact_card_number("4930 12XX XXXX 0815"), "493012XXXXXX0815");
    }

    #[test]
    fn test_balance_delta_requires_both() {
        let mut s = Statement::new("x.pdf", Layout::Legacy);
        s.opening_balance = Some(dec!(100.00));
        assert_eq!(s.balance_delta(), None);
        s.closing_balance = Some(dec!(80.50));
        assert_eq!(s.balance_delta(), Some(dec!(-19.50)));
    }

    #[test]
    fn test_transaction_serializes() {
        let json = serde_json::to_value(txn()).unwrap();
        assert_eq!(json["kind"], "Lastschrift");
        assert_eq!(json["booked"], "2015-04-01");
        assert_eq!(json["value"], "-12.30");
    }
}
