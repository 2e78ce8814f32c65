//! One source document: decide the parser, feed it text.

use std::path::{Path, PathBuf};

use auszug_core::{DocumentKind, FilenameMatcher, FilenameMetadata, ParseError, ParsedStatement};

use crate::extract::Extractor;
use crate::parsers::{parse_bank_statement, parse_card_statement};

/// A file selected for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Parse already-extracted text with the parser for `kind`.
pub fn parse_text(
    kind: DocumentKind,
    source: &str,
    text: &str,
    meta: Option<&FilenameMetadata>,
) -> Result<ParsedStatement, ParseError> {
    match kind {
        DocumentKind::Card => parse_card_statement(source, text),
        DocumentKind::AccountLegacy | DocumentKind::AccountModern => {
            parse_bank_statement(source, text, meta)
        }
    }
}

/// Extract and parse one document. Filename metadata is only consulted for
/// account statements.
pub async fn read_document(
    doc: &Document,
    matcher: &FilenameMatcher,
    extractor: &Extractor,
) -> Result<ParsedStatement, ParseError> {
    let text = extractor.extract(&doc.path).await?;
    parse_text(doc.kind, &source_name(&doc.path), &text, matcher.metadata(&doc.path).as_ref())
}

fn source_name(path: &Path) -> String {
    path.display().to_string()
}
