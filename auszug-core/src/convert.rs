//! Locale-aware value converters for German statement text.
//!
//! Amounts print as `1.234,56` (dot groups thousands, comma separates the
//! fraction). Dates print as `dd.mm.yyyy`, `dd.mm.yy` on card statements, or
//! `dd.mm.` without a year on legacy account statements.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ParseError;

/// Scale of every booked amount and balance.
pub const AMOUNT_SCALE: u32 = 2;

fn normalize_decimal(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let plain: String = digits.chars().filter(|c| *c != '.').collect();
    let plain = plain.replacen(',', ".", 1);

    let mut parts = plain.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(f) = fraction {
        if f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }

    Some(if negative { format!("-{plain}") } else { plain })
}

/// Parse a German-formatted decimal of arbitrary precision (exchange rates).
pub fn parse_decimal(text: &str) -> Result<Decimal, ParseError> {
    normalize_decimal(text)
        .and_then(|s| Decimal::from_str(&s).ok())
        .ok_or_else(|| ParseError::format("decimal", text))
}

/// Parse a German-formatted money amount into a 2-decimal fixed-point value.
///
/// `"1.234,56"` → `1234.56`, `"0,00"` → `0.00`, `"-12,30"` → `-12.30`.
/// More than two fractional digits is a format error.
pub fn parse_amount(text: &str) -> Result<Decimal, ParseError> {
    let mut value = normalize_decimal(text)
        .and_then(|s| Decimal::from_str(&s).ok())
        .ok_or_else(|| ParseError::format("amount", text))?;
    if value.scale() > AMOUNT_SCALE {
        return Err(ParseError::format("amount", text));
    }
    value.rescale(AMOUNT_SCALE);
    Ok(value)
}

/// Parse a full `dd.mm.yyyy` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y").map_err(|_| ParseError::format("date", text))
}

/// Parse a `dd.mm.` date, taking the year from the enclosing statement.
pub fn parse_day_month(text: &str, year: i32) -> Result<NaiveDate, ParseError> {
    let trimmed = text.trim().trim_end_matches('.');
    let mut it = trimmed.split('.');
    let day = it.next().and_then(|d| d.parse::<u32>().ok());
    let month = it.next().and_then(|m| m.parse::<u32>().ok());
    match (day, month, it.next()) {
        (Some(d), Some(m), None) => NaiveDate::from_ymd_opt(year, m, d),
        _ => None,
    }
    .ok_or_else(|| ParseError::format("date", text))
}

/// Parse a card-statement date. A two-digit year is read as `20yy`.
///
/// This only holds for statements issued in the 21st century, which is all
/// the card layout ever printed.
pub fn parse_short_date(text: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = text.trim();
    match trimmed.rsplit_once('.') {
        Some((day_month, yy)) if yy.len() == 2 => parse_date(&format!("{day_month}.20{yy}"))
            .map_err(|_| ParseError::format("date", text)),
        _ => parse_date(trimmed),
    }
}

/// Soll/Haben side of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Soll: money leaves the account.
    Debit,
    /// Haben: money arrives.
    Credit,
}

impl Sign {
    pub fn factor(self) -> Decimal {
        match self {
            Sign::Debit => Decimal::NEGATIVE_ONE,
            Sign::Credit => Decimal::ONE,
        }
    }

    /// Signed value of an unsigned amount printed on this side.
    pub fn apply(self, amount: Decimal) -> Decimal {
        amount * self.factor()
    }
}

/// Map a textual sign marker to a side: `-` and `S` are debits, everything
/// else (`+`, `H`, no marker) is a credit.
pub fn resolve_sign(marker: Option<&str>) -> Sign {
    match marker.map(str::trim) {
        Some("-") | Some("S") => Sign::Debit,
        _ => Sign::Credit,
    }
}

/// Month number for a German month name as printed on card statements.
pub fn german_month(name: &str) -> Result<u32, ParseError> {
    let month = match name.trim() {
        "Januar" => 1,
        "Februar" => 2,
        "März" => 3,
        "April" => 4,
        "Mai" => 5,
        "Juni" => 6,
        "Juli" => 7,
        "August" => 8,
        "September" => 9,
        "Oktober" => 10,
        "November" => 11,
        "Dezember" => 12,
        _ => return Err(ParseError::format("month name", name)),
    };
    Ok(month)
}

/// Parse a plain unsigned integer field (statement number, year).
pub fn parse_number<T: FromStr>(what: &'static str, text: &str) -> Result<T, ParseError> {
    text.trim()
        .parse()
        .map_err(|_| ParseError::format(what, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount_grouped() {
        assert_eq!(parse_amount("1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("1.000.000,00").unwrap(), dec!(1000000.00));
    }

    #[test]
    fn test_parse_amount_zero_and_negative() {
        let zero = parse_amount("0,00").unwrap();
        assert_eq!(zero, Decimal::ZERO);
        assert_eq!(zero.scale(), 2);
        assert_eq!(parse_amount("-12,30").unwrap(), dec!(-12.30));
    }

    #[test]
    fn test_parse_amount_pads_scale() {
        let v = parse_amount("7").unwrap();
        assert_eq!(v.to_string(), "7.00");
        assert_eq!(parse_amount("7,5").unwrap().to_string(), "7.50");
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("12,3x").is_err());
        assert!(parse_amount("1,234").is_err());
        assert!(parse_amount(",50").is_err());
    }

    #[test]
    fn test_sign_marker_and_textual_minus_agree() {
        let from_marker = resolve_sign(Some("S")).apply(parse_amount("12,30").unwrap());
        let from_text = parse_amount("-12,30").unwrap();
        assert_eq!(from_marker, from_text);
    }

    #[test]
    fn test_resolve_sign() {
        assert_eq!(resolve_sign(Some("-")), Sign::Debit);
        assert_eq!(resolve_sign(Some("S")), Sign::Debit);
        assert_eq!(resolve_sign(Some("+")), Sign::Credit);
        assert_eq!(resolve_sign(Some("H")), Sign::Credit);
        assert_eq!(resolve_sign(None), Sign::Credit);
    }

    #[test]
    fn test_parse_decimal_keeps_precision() {
        assert_eq!(parse_decimal("1,08345").unwrap(), dec!(1.08345));
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            parse_date("29.02.2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("30.02.2024").is_err());
        assert_eq!(
            parse_day_month("03.11.", 2015).unwrap(),
            NaiveDate::from_ymd_opt(2015, 11, 3).unwrap()
        );
        assert!(parse_day_month("32.01.", 2015).is_err());
    }

    #[test]
    fn test_short_year_expands_to_2000s() {
        assert_eq!(
            parse_short_date("05.03.19").unwrap(),
            NaiveDate::from_ymd_opt(2019, 3, 5).unwrap()
        );
        assert_eq!(
            parse_short_date("05.03.2019").unwrap(),
            NaiveDate::from_ymd_opt(2019, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_german_month() {
        assert_eq!(german_month("Januar").unwrap(), 1);
        assert_eq!(german_month("März").unwrap(), 3);
        assert_eq!(german_month("Dezember").unwrap(), 12);
        assert!(german_month("March").is_err());
    }
}
