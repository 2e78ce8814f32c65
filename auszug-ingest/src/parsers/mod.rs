//! Statement parsers, one per document family.

pub mod bank_statement;
pub mod card_statement;
pub mod patterns;

use auszug_core::{ParsedStatement, Reconciliation, Statement, Transaction};
use tracing::{debug, error, warn};

pub use bank_statement::{parse_bank_statement, parse_bank_statement_lines};
pub use card_statement::{parse_card_statement, parse_card_statement_lines};

/// Close a parse: run the balance check once and log its outcome.
pub(crate) fn finish(statement: Statement, transactions: Vec<Transaction>) -> ParsedStatement {
    let reconciliation = Reconciliation::check(&statement, &transactions);
    match &reconciliation {
        Reconciliation::Balanced => {
            debug!(
                source = %statement.source,
                transactions = transactions.len(),
                "statement balanced"
            );
        }
        Reconciliation::Mismatch(d) => {
            error!(source = %statement.source, "parsed {d}");
        }
        Reconciliation::Skipped => {
            warn!(
                source = %statement.source,
                opening = statement.opening_balance.is_some(),
                closing = statement.closing_balance.is_some(),
                "missing balance information, reconciliation skipped"
            );
        }
    }
    ParsedStatement {
        statement,
        transactions,
        reconciliation,
    }
}
