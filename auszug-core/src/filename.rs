//! Statement filenames as the bank's download portal names them.
//!
//! ```text
//! Kontoauszug_1010001491_Nr_2015_004_per_2015_04_02.pdf              legacy account
//! Kontoauszug_8_2024_vom_05.08.2024_zu_Konto_1010001491.pdf          modern account
//! Kreditkartenabrechnung_4930xxxxxxxx0815_per_2019_03_05.pdf         card
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    AccountLegacy,
    AccountModern,
    Card,
}

/// Statement identity recovered from a filename, used when the body text
/// does not print it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameMetadata {
    pub statement_no: u32,
    pub year: i32,
    pub account: String,
}

pub struct FilenameMatcher {
    legacy: Regex,
    modern: Regex,
    card: Regex,
}

impl FilenameMatcher {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            legacy: Regex::new(concat!(
                r"^Kontoauszug_(?P<account>\d{8,10})_Nr_(?P<year>\d{4})_(?P<no>\d{3})",
                r"_per_\d{4}_\d{2}_\d{2}\.pdf$"
            ))?,
            modern: Regex::new(concat!(
                r"^Kontoauszug_(?P<no>\d{1,2})_(?P<year>\d{4})",
                r"_vom_\d{2}\.\d{2}[._]\d{4}_?_?zu_Konto_(?P<account>\d{8,10})\.pdf$"
            ))?,
            card: Regex::new(r"^Kreditkartenabrechnung_\d{4}[_x]{8}\d{4}_per_\d{4}_\d{2}_\d{2}\.pdf$")?,
        })
    }

    /// Which parser a file belongs to; `None` for files to ignore.
    pub fn kind(&self, path: &Path) -> Option<DocumentKind> {
        let name = file_name(path)?;
        if self.card.is_match(name) {
            Some(DocumentKind::Card)
        } else if self.modern.is_match(name) {
            Some(DocumentKind::AccountModern)
        } else if self.legacy.is_match(name) {
            Some(DocumentKind::AccountLegacy)
        } else {
            None
        }
    }

    /// Statement number, year and account from an account-statement filename.
    pub fn metadata(&self, path: &Path) -> Option<FilenameMetadata> {
        let name = file_name(path)?;
        let caps = self
            .modern
            .captures(name)
            .or_else(|| self.legacy.captures(name))?;
        Some(FilenameMetadata {
            statement_no: caps["no"].parse().ok()?,
            year: caps["year"].parse().ok()?,
            account: caps["account"].to_string(),
        })
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let m = FilenameMatcher::new().unwrap();
        assert_eq!(
            m.kind(Path::new("a/b/Kontoauszug_1010001491_Nr_2015_004_per_2015_04_02.pdf")),
            Some(DocumentKind::AccountLegacy)
        );
        assert_eq!(
            m.kind(Path::new("Kontoauszug_8_2024_vom_05.08.2024_zu_Konto_1010001491.pdf")),
            Some(DocumentKind::AccountModern)
        );
        assert_eq!(
            m.kind(Path::new("Kontoauszug_8_2023_vom_07.08_2023_zu_Konto_1010001491.pdf")),
            Some(DocumentKind::AccountModern)
        );
        assert_eq!(
            m.kind(Path::new("Kreditkartenabrechnung_4930xxxxxxxx0815_per_2019_03_05.pdf")),
            Some(DocumentKind::Card)
        );
        assert_eq!(m.kind(Path::new("Kontoauszug_final.pdf")), None);
        assert_eq!(m.kind(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_modern_metadata() {
        let m = FilenameMatcher::new().unwrap();
        let meta = m
            .metadata(Path::new("Kontoauszug_8_2024_vom_05.08.2024_zu_Konto_1010001491.pdf"))
            .unwrap();
        assert_eq!(
            meta,
            FilenameMetadata {
                statement_no: 8,
                year: 2024,
                account: "1010001491".to_string(),
            }
        );
    }

    #[test]
    fn test_legacy_metadata() {
        let m = FilenameMatcher::new().unwrap();
        let meta = m
            .metadata(Path::new("Kontoauszug_1010001491_Nr_2015_004_per_2015_04_02.pdf"))
            .unwrap();
        assert_eq!(meta.statement_no, 4);
        assert_eq!(meta.year, 2015);
        assert_eq!(meta.account, "1010001491");
    }

    #[test]
    fn test_card_has_no_metadata() {
        let m = FilenameMatcher::new().unwrap();
        assert!(m
            .metadata(Path::new("Kreditkartenabrechnung_4930xxxxxxxx0815_per_2019_03_05.pdf"))
            .is_none());
    }
}
