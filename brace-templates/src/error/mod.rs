pub use self::parse::{ParseError, ParseErrorKind};

mod parse;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Failure to compile a single expression.
///
/// The offset is relative to the start of the expression source,
/// not the template containing it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} in expression `{expr}` (offset {offset})")]
pub struct ExpressionError {
    pub expr: String,
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl ExpressionError {
    pub(crate) fn new(expr: &str, offset: usize, kind: ParseErrorKind) -> Self {
        Self {
            expr: expr.to_string(),
            offset,
            kind,
        }
    }
}

impl From<ExpressionError> for ParseErrorKind {
    fn from(value: ExpressionError) -> Self {
        Self::Expression(Box::new(value))
    }
}
