//! Current-account statement parser (text).
//!
//! Two page layouts exist. The legacy one:
//!
//! ```text
//! Kontoauszug Nummer 004 / 2015 vom 02.03.2015 bis 01.04.2015
//! Kontonummer 1010001491 / IBAN DE02120300001010001491
//! ALTER KONTOSTAND                                                  1.000,00 H EUR
//! Bu.Tag   Wert     Wir haben für Sie gebucht          Belastung in EUR   Gutschrift in EUR
//! 04.03.   04.03.   Lastschrift                                   42,30
//!                   STADTWERKE MUSTERSTADT
//! ```
//!
//! gives the sign of an amount only through the column it is printed in, and
//! its rows carry `dd.mm.` dates. The modern one:
//!
//! ```text
//! Kontoauszug 8/2024
//! Datum      Erläuterung                              Betrag Soll EUR      Betrag Haben EUR
//! 05.08.2024 Lastschrift                                       -42,30
//!               STADTWERKE MUSTERSTADT
//! ```
//!
//! separates the columns far enough that a debit and a credit row can be told
//! apart by the gap before the amount.

use auszug_core::{
    pad_account, parse_amount, parse_date, parse_day_month, parse_number, resolve_sign,
    FilenameMetadata, Layout, ParseError, ParsedStatement, Sign, Statement, Transaction,
};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::matcher::{LineMatch, RuleSet};
use crate::parsers::finish;
use crate::parsers::patterns::{
    join, BLANK, DATE, DATE_NO_YEAR, DECIMAL, DECIMAL_FIXED_POINT, SIGN, TEXT,
};

/// Marker whose presence anywhere in the text selects the modern layout.
const MODERN_MARKER: &str = r"Kontoauszug \d{1,2}/\d{4}";

/// Leading blanks that make a modern-layout line a detail of the previous row.
pub const MODERN_DETAIL_INDENT: usize = 14;

/// Minimum gap before an amount in the modern Haben (credit) column.
pub const MODERN_CREDIT_GAP: usize = 70;

/// Column positions read from the legacy table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHeader {
    /// Where free text of detail lines starts
    pub comment_column: usize,
    /// Amounts starting left of this column are debits
    pub debit_end: usize,
}

/// Mutable state of one account-statement parse.
pub struct BankContext {
    statement: Statement,
    transactions: Vec<Transaction>,
    header: Option<ColumnHeader>,
    table_seen: bool,
}

impl BankContext {
    fn new(source: &str, layout: Layout, meta: Option<&FilenameMetadata>) -> Self {
        let mut statement = Statement::new(source, layout);
        if let Some(meta) = meta {
            statement.number = Some(meta.statement_no);
            statement.year = Some(meta.year);
            statement.account = Some(meta.account.clone());
        }
        Self {
            statement,
            transactions: Vec::new(),
            header: None,
            table_seen: false,
        }
    }

    fn year(&self) -> Result<i32, ParseError> {
        self.statement
            .year
            .ok_or_else(|| ParseError::structural("transaction row before the statement year is known"))
    }

    fn push_transaction(
        &mut self,
        booked: NaiveDate,
        valued: NaiveDate,
        kind: &str,
        value: Decimal,
    ) -> Result<(), ParseError> {
        let account = self
            .statement
            .account
            .as_deref()
            .map(pad_account)
            .ok_or_else(|| ParseError::structural("transaction row before the account number is known"))?;
        let statement = self
            .statement
            .number
            .ok_or_else(|| ParseError::structural("transaction row before the statement number is known"))?;
        let year = self.year()?;
        let ordinal = self.transactions.len() as u32 + 1;

        self.transactions.push(Transaction {
            account,
            year,
            statement,
            ordinal,
            booked,
            valued,
            kind: kind.trim().to_string(),
            value,
            payee: None,
            comment: String::new(),
            foreign: None,
        });
        Ok(())
    }
}

fn legacy_rules() -> Result<RuleSet<BankContext>, ParseError> {
    RuleSet::new("legacy")
        .rule(
            "range",
            &join(&[
                r"Kontoauszug Nummer (?P<no>\d*) / (?P<year>\d*) vom (?P<from>",
                DATE,
                r") bis (?P<to>",
                DATE,
                r")",
            ]),
            legacy_range,
        )?
        .rule(
            "account",
            r"Kontonummer (?P<account>[0-9]*) / IBAN (?P<iban>[A-Z0-9 ]*)",
            legacy_account,
        )?
        .rule(
            "opening-balance",
            &join(&[r"ALTER KONTOSTAND\s*(?P<value>", DECIMAL, r") (?P<sign>", SIGN, r") EUR"]),
            legacy_opening,
        )?
        .rule(
            "closing-balance",
            &join(&[r"NEUER KONTOSTAND\s*(?P<value>", DECIMAL, r") (?P<sign>", SIGN, r") EUR"]),
            legacy_closing,
        )?
        .rule(
            "table-header",
            concat!(
                r"(?P<booked>Bu.Tag)\s+(?P<valued>Wert)\s+(?P<comment>Wir haben für Sie gebucht)",
                r"\s+(?P<minus>Belastung in EUR)\s+(?P<plus>Gutschrift in EUR)"
            ),
            legacy_header,
        )?
        .rule(
            "transaction",
            &join(&[
                r"\s*(?P<booked>",
                DATE_NO_YEAR,
                r")",
                BLANK,
                r"(?P<valued>",
                DATE_NO_YEAR,
                r")",
                BLANK,
                r"(?P<type>",
                TEXT,
                r")",
                BLANK,
                r"(?P<value>",
                DECIMAL_FIXED_POINT,
                r")\s*$",
            ]),
            legacy_transaction,
        )?
        .rule(
            "detail",
            &join(&[
                r"(?:",
                BLANK,
                r"|",
                DATE_NO_YEAR,
                r"\s+",
                DATE_NO_YEAR,
                r"\s+)(?P<line>",
                TEXT,
                r")",
            ]),
            legacy_detail,
        )
}

fn legacy_range(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    let s = &mut ctx.statement;
    s.number = Some(parse_number("statement number", m.text("no")?)?);
    s.year = Some(parse_number("statement year", m.text("year")?)?);
    s.period_from = Some(parse_date(m.text("from")?)?);
    s.period_to = Some(parse_date(m.text("to")?)?);
    Ok(())
}

fn legacy_account(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.account = Some(m.text("account")?.to_string());
    ctx.statement.iban = Some(m.text("iban")?.trim_end().to_string());
    Ok(())
}

fn signed_balance(m: &LineMatch<'_>) -> Result<Decimal, ParseError> {
    Ok(resolve_sign(m.get("sign")).apply(parse_amount(m.text("value")?)?))
}

fn legacy_opening(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.opening_balance = Some(signed_balance(m)?);
    Ok(())
}

fn legacy_closing(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.closing_balance = Some(signed_balance(m)?);
    Ok(())
}

fn legacy_header(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    let comment_column = m.start_column("comment");
    let debit_end = m.end_column("minus");
    if let (Some(comment_column), Some(debit_end)) = (comment_column, debit_end) {
        ctx.header = Some(ColumnHeader {
            comment_column,
            debit_end,
        });
    }
    Ok(())
}

fn legacy_transaction(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    let header = ctx.header.ok_or_else(|| {
        ParseError::structural(format!(
            "transaction row before the column header, sign cannot be attributed: '{}'",
            m.line().trim()
        ))
    })?;

    let amount = parse_amount(m.text("value")?)?;
    let side = match m.start_column("value") {
        Some(col) if col < header.debit_end => Sign::Debit,
        _ => Sign::Credit,
    };

    let year = ctx.year()?;
    let booked = parse_day_month(m.text("booked")?, year)?;
    let valued = parse_day_month(m.text("valued")?, year)?;
    ctx.push_transaction(booked, valued, m.text("type")?, side.apply(amount))
}

fn legacy_detail(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    let Some(header) = ctx.header else {
        debug!(line = m.line(), "detail line before column header, ignored");
        return Ok(());
    };
    if m.start_column("line") != Some(header.comment_column) {
        debug!(line = m.line(), "detail line outside the comment column, ignored");
        return Ok(());
    }
    let text = m.text("line")?;
    match ctx.transactions.last_mut() {
        Some(last) => {
            last.push_detail(text);
            Ok(())
        }
        None => Err(ParseError::structural(format!(
            "detail line before any transaction row: '{text}'"
        ))),
    }
}

fn modern_rules() -> Result<RuleSet<BankContext>, ParseError> {
    let amount = r"\d{1,3}(?:\.\d{3})*,\d{2}";
    let row_start = r"\s*(?P<booked>\d{2}\.\d{2}\.\d{4})\s+(?P<type>\S(?:.*\S)?)";
    let debit_gap = format!(r"\s{{1,{}}}", MODERN_CREDIT_GAP - 1);
    let credit_gap = format!(r"\s{{{},}}", MODERN_CREDIT_GAP);

    RuleSet::new("modern")
        .rule(
            "statement",
            r"Kontoauszug (?P<no>\d{1,2})/(?P<year>\d{4})",
            modern_statement,
        )?
        .rule(
            "opening-balance",
            &join(&[
                r"Kontostand am (?P<date>",
                DATE,
                r"), Auszug Nr\. \d+\s+(?P<value>-?",
                DECIMAL,
                r")",
            ]),
            modern_opening,
        )?
        .rule(
            "closing-balance",
            &join(&[
                r"Kontostand am (?P<date>",
                DATE,
                r") um \d{2}:\d{2} Uhr\s+(?P<value>-?",
                DECIMAL,
                r")",
            ]),
            modern_closing,
        )?
        .rule(
            "table-header",
            r"Datum\s+Erläuterung\s+Betrag Soll EUR\s+Betrag Haben EUR",
            modern_header,
        )?
        // a printed minus is a debit wherever the amount stands
        .rule(
            "signed-debit",
            &join(&[row_start, r"\s+(?P<amount>-", amount, r")\s*$"]),
            modern_debit,
        )?
        .rule(
            "debit",
            &join(&[row_start, debit_gap.as_str(), r"(?P<amount>", amount, r")\s*$"]),
            modern_debit,
        )?
        .rule(
            "credit",
            &join(&[row_start, credit_gap.as_str(), r"(?P<amount>", amount, r")\s*$"]),
            modern_credit,
        )?
        .rule(
            "detail",
            &format!(r" {{{MODERN_DETAIL_INDENT}}}\s*(?P<line>\S.*)"),
            modern_detail,
        )
}

fn modern_statement(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    let s = &mut ctx.statement;
    s.number = Some(parse_number("statement number", m.text("no")?)?);
    s.year = Some(parse_number("statement year", m.text("year")?)?);
    Ok(())
}

fn modern_opening(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.opening_balance = Some(parse_amount(m.text("value")?)?);
    ctx.statement.opening_date = Some(parse_date(m.text("date")?)?);
    Ok(())
}

fn modern_closing(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.closing_balance = Some(parse_amount(m.text("value")?)?);
    ctx.statement.closing_date = Some(parse_date(m.text("date")?)?);
    Ok(())
}

fn modern_header(ctx: &mut BankContext, _m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.table_seen = true;
    Ok(())
}

fn modern_row(ctx: &mut BankContext, m: &LineMatch<'_>, side: Sign) -> Result<(), ParseError> {
    if !ctx.table_seen {
        debug!(line = m.line(), "transaction row before the table header");
    }
    let amount = parse_amount(m.text("amount")?)?.abs();
    let booked = parse_date(m.text("booked")?)?;
    ctx.push_transaction(booked, booked, m.text("type")?, side.apply(amount))
}

fn modern_debit(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    modern_row(ctx, m, Sign::Debit)
}

fn modern_credit(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    modern_row(ctx, m, Sign::Credit)
}

fn modern_detail(ctx: &mut BankContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    let text = m.text("line")?.trim();
    match ctx.transactions.last_mut() {
        Some(last) => last.push_detail(text),
        None => debug!(line = m.line(), "indented line before any transaction, ignored"),
    }
    Ok(())
}

/// Layout of an account statement, decided once from the whole text.
pub fn detect_layout(lines: &[&str]) -> Result<Layout, ParseError> {
    let marker = Regex::new(MODERN_MARKER)?;
    Ok(if lines.iter().any(|l| marker.is_match(l)) {
        Layout::Modern
    } else {
        Layout::Legacy
    })
}

/// Parse extracted current-account statement text.
///
/// `meta` seeds statement number, year and account; lines in the body that
/// print them take precedence.
pub fn parse_bank_statement(
    source: &str,
    text: &str,
    meta: Option<&FilenameMetadata>,
) -> Result<ParsedStatement, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    parse_bank_statement_lines(source, &lines, meta)
}

pub fn parse_bank_statement_lines(
    source: &str,
    lines: &[&str],
    meta: Option<&FilenameMetadata>,
) -> Result<ParsedStatement, ParseError> {
    let layout = detect_layout(lines)?;
    let rules = match layout {
        Layout::Modern => modern_rules()?,
        _ => legacy_rules()?,
    };
    debug!(source, layout = layout.name(), lines = lines.len(), "parsing account statement");

    let mut ctx = BankContext::new(source, layout, meta);
    for line in lines {
        rules.dispatch(&mut ctx, line)?;
    }
    Ok(finish(ctx.statement, ctx.transactions))
}
