use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

use unicode_width::UnicodeWidthStr;

use super::ExpressionError;
use crate::token::Operator;

// Line number and column starts at one, not zero,
// because actual humans might read this
pub(crate) fn src_line_no(offset: usize, src: &str) -> (usize, usize) {
    let end = offset.min(src.len());
    let mut line_no = 1;
    let mut pos = 0;

    while let Some(p) = &src[pos..end].find('\n') {
        pos += p + 1;
        line_no += 1;
    }

    // Set the column to at least one, as zero makes no sense to the end user
    let col = 1 + end - pos;

    (line_no, col)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub col: usize,
    pub src: String,
}

impl StdError for ParseError {}

impl ParseError {
    pub(crate) fn new(offset: usize, src: &str, kind: ParseErrorKind) -> Self {
        let (line, col) = src_line_no(offset, src);
        Self {
            line,
            col,
            src: src.to_string(),
            kind,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let start_line = self.line;
        let lines = self.src.lines().enumerate().skip(start_line.saturating_sub(2)).take(3);

        writeln!(f, "error on line {start_line}: {}", self.kind)?;

        for (no, line) in lines {
            let no = no + 1;
            let mark = if self.line == no { "-> " } else { "   " };
            let mark_line = format!("{mark}{no}");
            writeln!(f, "{mark_line} {line}")?;

            if self.line == no {
                // The column is a byte offset, the caret has to line up with
                // the display width of whatever precedes it
                let prefix = self.col.saturating_sub(1);
                let width = line.get(..prefix).map(UnicodeWidthStr::width).unwrap_or(prefix);
                writeln!(f, "{:width$} ^", "", width = width + mark_line.len())?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated tag (missing `}}`)")]
    UnterminatedTag,
    #[error("unterminated comment (missing `!}}`)")]
    UnterminatedComment,
    #[error("unterminated section `{0}`")]
    UnterminatedSection(String),
    #[error("invalid token (expected: \"{expected}\")")]
    InvalidToken { expected: &'static str },
    #[error("invalid number")]
    InvalidNumber,
    #[error("invalid map key")]
    InvalidKey,
    #[error("invalid operator: {0}")]
    InvalidOperator(Operator),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("empty expression")]
    EmptyExpression,
    #[error("missing section name")]
    MissingSectionName,
    #[error("unknown section `{0}`")]
    UnknownSection(String),
    #[error("`{label}` is not a block of section `{section}`")]
    InvalidLabel { section: String, label: String },
    #[error("block label `{0}` outside of a section")]
    UnexpectedLabel(String),
    #[error("end tag `{0}` without an open section")]
    UnexpectedEndTag(String),
    #[error("end tag `{found}` does not close section `{expected}`")]
    MismatchedEndTag { expected: String, found: String },
    #[error("missing parameter `{0}`")]
    MissingParameter(&'static str),
    #[error("{0}")]
    Expression(Box<ExpressionError>),
}
