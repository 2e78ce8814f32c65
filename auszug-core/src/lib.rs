//! auszug-core: statement/transaction records, locale converters,
//! reconciliation and filename metadata shared by the parsers and exporters.

pub mod convert;
pub mod error;
pub mod filename;
pub mod model;
pub mod reconcile;

pub use convert::{
    german_month, parse_amount, parse_date, parse_day_month, parse_decimal, parse_short_date,
    parse_number, resolve_sign, Sign,
};
pub use error::ParseError;
pub use filename::{DocumentKind, FilenameMatcher, FilenameMetadata};
pub use model::{
    compact_card_number, pad_account, ForeignAmount, Layout, ParsedStatement, Statement,
    Transaction,
};
pub use reconcile::{discrepancy, reconcile, Discrepancy, Reconciliation};
