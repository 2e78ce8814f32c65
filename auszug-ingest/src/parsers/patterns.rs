//! Regex fragments shared by the statement line rules.

/// `dd.mm.yyyy` or `dd.mm.yy`
pub const DATE: &str = r"\d\d\.\d\d\.(?:\d\d\b|\d\d\d\d\b)";
/// `dd.mm.` (legacy rows print no year)
pub const DATE_NO_YEAR: &str = r"\d\d\.\d\d\.";
/// `1.234,5678`, fraction optional
pub const DECIMAL: &str = r"\d{1,3}(?:\.\d{3})*(?:,\d+)?";
/// `1.234,56`, exactly two fraction digits
pub const DECIMAL_FIXED_POINT: &str = r"\d{1,3}(?:\.\d{3})*(?:,\d{2})";
/// Free text that starts and ends with a non-blank
pub const TEXT: &str = r"\S.*\S";
pub const SIGN: &str = r"[\+\-SH]";
/// Column separator: three or more blanks
pub const BLANK: &str = r"\s{3,}";
/// Masked card number, `4930 12XX XXXX 0815`
pub const CARD_NO: &str = r"\b[0-9X]{4}\s[0-9X]{4}\s[0-9X]{4}\s[0-9X]{4}\b";

/// ISO 4217 codes accepted in the currency column of card statements.
pub const CURRENCY: &str = concat!(
    "AED|AFN|ALL|AMD|ANG|AOA|ARS|AUD|AWG|AZN|BAM|BBD|BDT|BGN|BHD|BIF|BMD|BND|BOB|BRL|",
    "BSD|BTN|BWP|BYR|BZD|CAD|CDF|CHF|CLP|CNY|COP|CRC|CUC|CUP|CVE|CZK|DJF|DKK|DOP|DZD|",
    "EGP|ERN|ETB|EUR|FJD|FKP|GBP|GEL|GGP|GHS|GIP|GMD|GNF|GTQ|GYD|HKD|HNL|HRK|HTG|HUF|",
    "IDR|ILS|IMP|INR|IQD|IRR|ISK|JEP|JMD|JOD|JPY|KES|KGS|KHR|KMF|KPW|KRW|KWD|KYD|KZT|",
    "LAK|LBP|LKR|LRD|LSL|LYD|MAD|MDL|MGA|MKD|MMK|MNT|MOP|MRO|MUR|MVR|MWK|MXN|MYR|MZN|",
    "NAD|NGN|NIO|NOK|NPR|NZD|OMR|PAB|PEN|PGK|PHP|PKR|PLN|PYG|QAR|RON|RSD|RUB|RWF|SAR|",
    "SBD|SCR|SDG|SEK|SGD|SHP|SLL|SOS|SPL|SRD|STD|SVC|SYP|SZL|THB|TJS|TMT|TND|TOP|TRY|",
    "TTD|TVD|TWD|TZS|UAH|UGX|USD|UYU|UZS|VEF|VND|VUV|WST|XAF|XCD|XDR|XOF|XPF|YER|ZAR|",
    "ZMW|ZWD"
);

/// Join fragments into one pattern.
pub fn join(parts: &[&str]) -> String {
    parts.concat()
}
