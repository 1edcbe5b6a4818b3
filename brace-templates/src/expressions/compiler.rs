use std::sync::atomic::{AtomicUsize, Ordering};

use super::eval::eval;
use super::parser::parse_expr;
use super::{Expression, ExpressionKind};
use crate::error::{ExpressionError, ParseErrorKind};
use crate::lexer::Lexer;
use crate::token::Tokens;

/// Turns raw text into a compiled [`Expression`].
///
/// Block builders receive this capability from the parser and never
/// look at the grammar themselves. Any closure with the right signature
/// can stand in for the default [`ExpressionCompiler`].
pub trait CompileExpression {
    fn compile(&self, source: &str) -> Result<Expression, ExpressionError>;
}

impl<F> CompileExpression for F
where
    F: Fn(&str) -> Result<Expression, ExpressionError>,
{
    fn compile(&self, source: &str) -> Result<Expression, ExpressionError> {
        self(source)
    }
}

/// The default compiler.
/// Every expression it produces gets a fresh [`ExpressionId`](super::ExpressionId).
#[derive(Debug, Default)]
pub struct ExpressionCompiler {
    next_id: AtomicUsize,
}

impl ExpressionCompiler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CompileExpression for ExpressionCompiler {
    fn compile(&self, source: &str) -> Result<Expression, ExpressionError> {
        let source = source.trim();
        let kind = parse(source)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        log::trace!("compiled expression {id}: `{source}`");
        Ok(Expression::new(id, source, kind))
    }
}

fn parse(src: &str) -> Result<ExpressionKind, ExpressionError> {
    if src.is_empty() {
        return Err(ExpressionError::new(src, 0, ParseErrorKind::EmptyExpression));
    }

    let tokens = Lexer::new(src).collect::<Result<Vec<_>, _>>()?;
    let mut tokens = Tokens::new(tokens, src);
    let expr = parse_expr(&mut tokens).map_err(|kind| ExpressionError::new(src, tokens.position(), kind))?;
    eval(expr, src).map_err(|kind| ExpressionError::new(src, 0, kind))
}
