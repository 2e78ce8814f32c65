//! Balance reconciliation: do the extracted bookings add up to the reported
//! balance movement?

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{Statement, Transaction};

/// A statement whose bookings do not add up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// closing - opening, as printed
    pub expected: Decimal,
    /// sum of extracted transaction values
    pub actual: Decimal,
    /// actual - expected
    pub difference: Decimal,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "balance difference of {} but transaction sum of {} (off by {})",
            self.expected, self.actual, self.difference
        )
    }
}

/// Outcome of the end-of-parse balance check. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconciliation {
    Balanced,
    Mismatch(Discrepancy),
    /// Opening or closing balance was not found.
    Skipped,
}

impl Reconciliation {
    pub fn check(statement: &Statement, transactions: &[Transaction]) -> Self {
        let (Some(opening), Some(closing)) = (statement.opening_balance, statement.closing_balance)
        else {
            return Reconciliation::Skipped;
        };
        match discrepancy(opening, closing, transactions) {
            Some(d) => Reconciliation::Mismatch(d),
            None => Reconciliation::Balanced,
        }
    }

    pub fn is_balanced(&self) -> bool {
        matches!(self, Reconciliation::Balanced)
    }

    pub fn discrepancy(&self) -> Option<Discrepancy> {
        match self {
            Reconciliation::Mismatch(d) => Some(*d),
            _ => None,
        }
    }
}

/// `None` when the bookings sum to `closing - opening` exactly.
pub fn discrepancy(
    opening: Decimal,
    closing: Decimal,
    transactions: &[Transaction],
) -> Option<Discrepancy> {
    let expected = closing - opening;
    let actual: Decimal = transactions.iter().map(|t| t.value).sum();
    let difference = actual - expected;
    if difference.is_zero() {
        None
    } else {
        Some(Discrepancy {
            expected,
            actual,
            difference,
        })
    }
}

/// Discrepancy for a statement, or `None` if it balances or lacks a balance.
pub fn reconcile(statement: &Statement, transactions: &[Transaction]) -> Option<Discrepancy> {
    Reconciliation::check(statement, transactions).discrepancy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layout;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn txn(value: Decimal) -> Transaction {
        let day = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        Transaction {
            account: "0000001010001491".to_string(),
            year: 2024,
            statement: 8,
            ordinal: 1,
            booked: day,
            valued: day,
            kind: "Gutschrift".to_string(),
            value,
            payee: None,
            comment: String::new(),
            foreign: None,
        }
    }

    fn statement(opening: Option<Decimal>, closing: Option<Decimal>) -> Statement {
        let mut s = Statement::new("test", Layout::Modern);
        s.opening_balance = opening;
        s.closing_balance = closing;
        s
    }

    #[test]
    fn test_balanced() {
        let s = statement(Some(dec!(100.00)), Some(dec!(157.70)));
        let txns = vec![txn(dec!(-42.30)), txn(dec!(100.00))];
        assert_eq!(Reconciliation::check(&s, &txns), Reconciliation::Balanced);
        assert_eq!(reconcile(&s, &txns), None);
    }

    #[test]
    fn test_mismatch_reports_all_three_numbers() {
        let s = statement(Some(dec!(100.00)), Some(dec!(150.00)));
        let txns = vec![txn(dec!(49.99))];
        let d = reconcile(&s, &txns).unwrap();
        assert_eq!(d.expected, dec!(50.00));
        assert_eq!(d.actual, dec!(49.99));
        assert_eq!(d.difference, dec!(-0.01));
    }

    #[test]
    fn test_missing_balance_skips() {
        let s = statement(Some(dec!(100.00)), None);
        assert_eq!(Reconciliation::check(&s, &[]), Reconciliation::Skipped);
        assert_eq!(reconcile(&s, &[]), None);
    }

    #[test]
    fn test_empty_statement_with_equal_balances() {
        let s = statement(Some(dec!(-5.00)), Some(dec!(-5.00)));
        assert!(Reconciliation::check(&s, &[]).is_balanced());
    }
}
