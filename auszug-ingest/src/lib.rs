//! auszug-ingest: text extraction, line rules and the statement parsers for
//! current-account and credit-card statements.

pub mod batch;
pub mod document;
pub mod extract;
pub mod matcher;
pub mod parsers;

pub use batch::{parse_documents, run_batch, BatchReport, DocumentFailure};
pub use document::{parse_text, read_document, Document};
pub use extract::Extractor;
pub use matcher::{Dispatch, LineMatch, RuleSet, UnmatchedLine};
pub use parsers::{
    parse_bank_statement, parse_bank_statement_lines, parse_card_statement,
    parse_card_statement_lines,
};
