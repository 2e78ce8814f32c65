//! Credit-card statement parser (text).
//!
//! Expected extracted-text rows:
//!
//! ```text
//!      Abrechnung: März 2019
//! Ihre Abrechnung vom 06.02.2019 bis 05.03.2019
//! DKB-VISA-Card: 4930 12XX XXXX 0815
//! 05.02.19  Saldo letzte Abrechnung                                    120,00 -
//! 07.02.19  08.02.19  REWE MARKT BERLIN                                 23,45 -
//! 11.02.19  12.02.19  AMAZON.COM         USD      12,99   1,13540       11,44 -
//!                   AMZN.COM/BILL WA
//!           Zwischensumme Seite 1                                      154,89 -
//!      Neuer Saldo                                                     154,89 -
//! ```
//!
//! Every amount carries its own sign marker, so no column positions are needed.

use auszug_core::{
    compact_card_number, german_month, parse_amount, parse_decimal, parse_number,
    parse_short_date, resolve_sign, ForeignAmount, Layout, ParseError, ParsedStatement, Statement,
    Transaction,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::matcher::{LineMatch, RuleSet};
use crate::parsers::finish;
use crate::parsers::patterns::{join, CARD_NO, CURRENCY, DATE, DECIMAL, SIGN, TEXT};

/// Exact indentation of a wrapped comment line under a card booking.
pub const CARD_COMMENT_INDENT: usize = 18;

/// Booking type label of every card transaction.
pub const CARD_KIND: &str = "VISA";

/// Mutable state of one card-statement parse.
pub struct CardContext {
    statement: Statement,
    transactions: Vec<Transaction>,
    last_booked: Option<NaiveDate>,
    last_valued: Option<NaiveDate>,
}

impl CardContext {
    fn new(source: &str) -> Self {
        let mut statement = Statement::new(source, Layout::Card);
        // Card statements without a carried-over balance start from zero.
        statement.opening_balance = Some(Decimal::ZERO);
        Self {
            statement,
            transactions: Vec::new(),
            last_booked: None,
            last_valued: None,
        }
    }
}

fn card_rules() -> Result<RuleSet<CardContext>, ParseError> {
    RuleSet::new("card")
        .rule(
            "opening-balance",
            &join(&[
                r"\s*(?P<date>",
                DATE,
                r")\s+Saldo letzte Abrechnung\s+(?P<value>",
                DECIMAL,
                r")\s*(?P<sign>",
                SIGN,
                r")",
            ]),
            on_opening,
        )?
        .rule(
            "month",
            r"\s+Abrechnung:\s+(?P<month>\b\S*\b) (?P<year>\d\d\d\d)",
            on_month,
        )?
        .rule(
            "period",
            &join(&[r"Ihre Abrechnung vom (?P<from>", DATE, r") bis (?P<to>", DATE, r")"]),
            on_period,
        )?
        .rule(
            "closing-balance",
            &join(&[r"\s*Neuer Saldo\s*(?P<value>", DECIMAL, r")\s*(?P<sign>", SIGN, r")?"]),
            on_closing,
        )?
        .rule(
            "subtotal",
            &join(&[
                r"\s*(?:Zwischensumme|Übertrag von) Seite \d+\s+(?P<value>",
                DECIMAL,
                r")\s*(?P<sign>",
                SIGN,
                r")",
            ]),
            on_subtotal,
        )?
        .rule(
            "foreign-transaction",
            &join(&[
                r"(?P<booked>",
                DATE,
                r")\s+(?P<valued>",
                DATE,
                r")\s+(?P<comment>",
                TEXT,
                r")\s+(?P<currency>",
                CURRENCY,
                r")\s+(?P<foreign>",
                DECIMAL,
                r")\s+(?P<rate>",
                DECIMAL,
                r")\s+(?P<value>",
                DECIMAL,
                r")\s*(?P<sign>",
                SIGN,
                r")\s*$",
            ]),
            on_foreign_transaction,
        )?
        .rule(
            "transaction",
            &join(&[
                r"(?P<booked>",
                DATE,
                r")?\s+(?P<valued>",
                DATE,
                r")?\s+(?P<comment>",
                TEXT,
                r")\s+(?P<value>",
                DECIMAL,
                r")\s*(?P<sign>",
                SIGN,
                r")\s*$",
            ]),
            on_transaction,
        )?
        .rule(
            "comment",
            &format!(r"\s{{{CARD_COMMENT_INDENT}}}(?P<comment>\S.*)$"),
            on_comment,
        )
}

/// The card number banner repeats on every page, independent of the
/// transaction flow, so it is checked on every line.
fn banner_rules() -> Result<RuleSet<CardContext>, ParseError> {
    RuleSet::new("card-banner").rule(
        "account",
        &join(&[
            r".*(?:(?:DKB-VISA-Card:)|(?:VISA\sCard-Nummer:))\s*(?P<account>",
            CARD_NO,
            r")",
        ]),
        on_account,
    )
}

fn signed_amount(m: &LineMatch<'_>) -> Result<Decimal, ParseError> {
    Ok(resolve_sign(m.get("sign")).apply(parse_amount(m.text("value")?)?))
}

fn on_opening(ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.opening_balance = Some(signed_amount(m)?);
    ctx.statement.opening_date = Some(parse_short_date(m.text("date")?)?);
    Ok(())
}

fn on_month(ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.number = Some(german_month(m.text("month")?)?);
    ctx.statement.year = Some(parse_number("statement year", m.text("year")?)?);
    Ok(())
}

fn on_period(ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.period_from = Some(parse_short_date(m.text("from")?)?);
    ctx.statement.period_to = Some(parse_short_date(m.text("to")?)?);
    Ok(())
}

fn on_closing(ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.closing_balance = Some(signed_amount(m)?);
    Ok(())
}

fn on_subtotal(_ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    debug!(line = m.line(), "page subtotal skipped");
    Ok(())
}

fn push_card_transaction(
    ctx: &mut CardContext,
    m: &LineMatch<'_>,
    foreign: Option<ForeignAmount>,
) -> Result<(), ParseError> {
    if let Some(booked) = m.get("booked") {
        ctx.last_booked = Some(parse_short_date(booked)?);
    }
    if let Some(valued) = m.get("valued") {
        ctx.last_valued = Some(parse_short_date(valued)?);
    }
    let value = signed_amount(m)?;

    // Rows without dates continue the date of the row above.
    let (Some(booked), Some(valued)) = (ctx.last_booked, ctx.last_valued) else {
        return Err(ParseError::structural(format!(
            "card row without dates and no earlier row to take them from: '{}'",
            m.line().trim()
        )));
    };
    let account = ctx
        .statement
        .account
        .as_deref()
        .map(compact_card_number)
        .ok_or_else(|| ParseError::structural("card row before the card number is known"))?;
    let year = ctx
        .statement
        .year
        .ok_or_else(|| ParseError::structural("card row before the statement month is known"))?;
    let statement = ctx
        .statement
        .number
        .ok_or_else(|| ParseError::structural("card row before the statement month is known"))?;

    let ordinal = ctx.transactions.len() as u32 + 1;
    ctx.transactions.push(Transaction {
        account,
        year,
        statement,
        ordinal,
        booked,
        valued,
        kind: CARD_KIND.to_string(),
        value,
        payee: None,
        comment: m.text("comment")?.to_string(),
        foreign,
    });
    Ok(())
}

fn on_foreign_transaction(ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    let foreign = ForeignAmount {
        currency: m.text("currency")?.to_string(),
        amount: parse_decimal(m.text("foreign")?)?,
        rate: parse_decimal(m.text("rate")?)?,
    };
    push_card_transaction(ctx, m, Some(foreign))
}

fn on_transaction(ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    push_card_transaction(ctx, m, None)
}

fn on_comment(ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    let text = m.text("comment")?;
    match ctx.transactions.last_mut() {
        Some(last) => last.extend_comment(text),
        None => debug!(line = m.line(), "indented line before any card row, ignored"),
    }
    Ok(())
}

fn on_account(ctx: &mut CardContext, m: &LineMatch<'_>) -> Result<(), ParseError> {
    ctx.statement.account = Some(m.text("account")?.to_string());
    Ok(())
}

/// Parse extracted credit-card statement text.
pub fn parse_card_statement(source: &str, text: &str) -> Result<ParsedStatement, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    parse_card_statement_lines(source, &lines)
}

pub fn parse_card_statement_lines(
    source: &str,
    lines: &[&str],
) -> Result<ParsedStatement, ParseError> {
    let rules = card_rules()?;
    let banner = banner_rules()?;
    debug!(source, lines = lines.len(), "parsing card statement");

    let mut ctx = CardContext::new(source);
    for line in lines {
        rules.dispatch(&mut ctx, line)?;
        banner.apply(&mut ctx, line)?;
    }
    Ok(finish(ctx.statement, ctx.transactions))
}
