//! Error taxonomy shared by every statement parser.

/// Per-document failure. Any of these aborts the document being parsed;
/// a batch keeps going with the next document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A primitive value (amount, date, month name, number) failed to convert.
    #[error("format error: cannot read {what} from '{input}'")]
    Format { what: &'static str, input: String },

    /// A line depends on state that was never established, e.g. a
    /// transaction row before the column header.
    #[error("structural error: {0}")]
    Structural(String),

    /// The text extraction step failed or produced nothing.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// A line rule failed to compile.
    #[error("invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ParseError {
    pub fn format(what: &'static str, input: impl Into<String>) -> Self {
        ParseError::Format {
            what,
            input: input.into(),
        }
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        ParseError::Structural(msg.into())
    }

    /// Short category name used in batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::Format { .. } => "format",
            ParseError::Structural(_) => "structural",
            ParseError::Extraction(_) => "extraction",
            ParseError::Pattern(_) => "pattern",
        }
    }
}
