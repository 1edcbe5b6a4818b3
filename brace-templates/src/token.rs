use std::fmt::{self, Display, Formatter};

use crate::primitives::Primitive;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Operator {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LCurly,
    RCurly,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    EqualEqual,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Not,
    And,
    Or,
    Dot,
    Comma,
    Colon,
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
            Self::Mod => write!(f, "%"),
            Self::EqualEqual => write!(f, "=="),
            Self::NotEqual => write!(f, "!="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::Not => write!(f, "!"),
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::Dot => write!(f, "."),
            Self::Comma => write!(f, ","),
            Self::Colon => write!(f, ":"),
            Self::LCurly => write!(f, "{{"),
            Self::RCurly => write!(f, "}}"),
        }
    }
}

/// Byte range into the expression source.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Span {
    pub(crate) fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub(crate) fn as_str(self, src: &str) -> &str {
        &src[self.start..self.end]
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}..{}>", self.start, self.end)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Value {
    Primitive(Primitive),
    String(Span),
    Ident(Span),
}

impl<T: Into<Primitive>> From<T> for Value {
    fn from(value: T) -> Self {
        Self::Primitive(value.into())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Kind {
    Value(Value),
    Op(Operator),
    Eof,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Token(pub(crate) Kind, pub(crate) Span);

#[derive(Debug)]
pub(crate) struct Tokens<'src> {
    inner: Vec<Token>,
    index: usize,
    src: &'src str,
}

impl<'src> Tokens<'src> {
    pub fn new(inner: Vec<Token>, src: &'src str) -> Self {
        Self { inner, index: 0, src }
    }

    pub fn consume(&mut self) {
        let _ = self.next();
    }

    pub fn next(&mut self) -> Kind {
        match self.inner.get(self.index).copied() {
            Some(token) => {
                self.index += 1;
                token.0
            }
            None => Kind::Eof,
        }
    }

    pub fn peek(&self) -> Kind {
        self.inner.get(self.index).map(|token| token.0).unwrap_or(Kind::Eof)
    }

    /// Source text of the next token, empty at the end of input.
    pub fn peek_text(&self) -> &'src str {
        match self.inner.get(self.index) {
            Some(token) => token.1.as_str(self.src),
            None => "",
        }
    }

    /// Byte offset of the next token.
    pub fn position(&self) -> usize {
        match self.inner.get(self.index) {
            Some(token) => token.1.start,
            None => self.src.len(),
        }
    }
}
