use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{ExpressionError, ParseErrorKind};
use crate::token::{Kind, Operator, Span, Token, Value};

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ExpressionError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Token(Kind::Eof, _)) => None,
            val => Some(val),
        }
    }
}

/// Tokenizer for a single expression (the content of `{...}` or a parameter value).
pub(crate) struct Lexer<'src> {
    src: &'src str,
    chars: Peekable<CharIndices<'src>>,
}

impl<'src> Lexer<'src> {
    pub(crate) fn new(src: &'src str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            src,
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.src.len())
    }

    fn error(&self, offset: usize, kind: ParseErrorKind) -> ExpressionError {
        ExpressionError::new(self.src, offset, kind)
    }

    fn next_token(&mut self) -> Result<Token, ExpressionError> {
        while let Some((_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.chars.next();
        }

        let (index, c) = match self.chars.next() {
            None => return Ok(self.eof()),
            Some(c) => c,
        };

        let next = self.chars.peek().map(|(_, c)| *c);

        let kind = match (c, next) {
            // -----------------------------------------------------------------------------
            //     - Double tokens -
            // -----------------------------------------------------------------------------
            ('&', Some('&')) => {
                let _ = self.chars.next();
                Kind::Op(Operator::And)
            }
            ('|', Some('|')) => {
                let _ = self.chars.next();
                Kind::Op(Operator::Or)
            }
            ('=', Some('=')) => {
                let _ = self.chars.next();
                Kind::Op(Operator::EqualEqual)
            }
            ('!', Some('=')) => {
                let _ = self.chars.next();
                Kind::Op(Operator::NotEqual)
            }
            ('>', Some('=')) => {
                let _ = self.chars.next();
                Kind::Op(Operator::GreaterThanOrEqual)
            }
            ('<', Some('=')) => {
                let _ = self.chars.next();
                Kind::Op(Operator::LessThanOrEqual)
            }

            // -----------------------------------------------------------------------------
            //     - Single tokens -
            // -----------------------------------------------------------------------------
            ('(', _) => Kind::Op(Operator::LParen),
            (')', _) => Kind::Op(Operator::RParen),
            ('[', _) => Kind::Op(Operator::LBracket),
            (']', _) => Kind::Op(Operator::RBracket),
            ('{', _) => Kind::Op(Operator::LCurly),
            ('}', _) => Kind::Op(Operator::RCurly),
            (':', _) => Kind::Op(Operator::Colon),
            (',', _) => Kind::Op(Operator::Comma),
            ('.', _) => Kind::Op(Operator::Dot),
            ('!', _) => Kind::Op(Operator::Not),
            ('+', _) => Kind::Op(Operator::Plus),
            ('-', _) => Kind::Op(Operator::Minus),
            ('*', _) => Kind::Op(Operator::Mul),
            ('/', _) => Kind::Op(Operator::Div),
            ('%', _) => Kind::Op(Operator::Mod),
            ('>', _) => Kind::Op(Operator::GreaterThan),
            ('<', _) => Kind::Op(Operator::LessThan),

            // -----------------------------------------------------------------------------
            //     - Ident -
            // -----------------------------------------------------------------------------
            ('a'..='z' | 'A'..='Z' | '_', _) => self.take_ident_or_keyword(index),

            // -----------------------------------------------------------------------------
            //     - Number -
            // -----------------------------------------------------------------------------
            ('0'..='9', _) => self.take_number(index)?,

            // -----------------------------------------------------------------------------
            //     - String -
            // -----------------------------------------------------------------------------
            ('"' | '\'', _) => self.take_string(c, index)?,

            _ => return Err(self.error(index, ParseErrorKind::UnexpectedToken(c.to_string()))),
        };

        let end = self.offset();
        Ok(Token(kind, Span::new(index, end)))
    }

    fn eof(&self) -> Token {
        Token(Kind::Eof, Span::new(self.src.len(), self.src.len()))
    }

    fn take_string(&mut self, start_char: char, start_index: usize) -> Result<Kind, ExpressionError> {
        loop {
            match self.chars.next() {
                Some((end, nc)) if nc == start_char => {
                    let span = Span::new(start_index + 1, end);
                    break Ok(Kind::Value(Value::String(span)));
                }
                Some((_, '\\')) => {
                    // escaping string terminator
                    if let Some((_, next)) = self.chars.peek() {
                        if *next == start_char {
                            self.chars.next();
                        }
                    }
                }
                None => break Err(self.error(start_index, ParseErrorKind::UnterminatedString)),
                _ => {} // consume chars
            }
        }
    }

    fn take_number(&mut self, index: usize) -> Result<Kind, ExpressionError> {
        let mut end = index;
        let mut parse_float = false;

        while let Some((e, c @ ('0'..='9' | '.'))) = self.chars.peek() {
            if *c == '.' {
                parse_float = true;
            }
            end = *e;
            self.chars.next();
        }

        let input = &self.src[index..=end];

        match parse_float {
            true => match input.parse::<f64>() {
                Ok(num) => Ok(Kind::Value(num.into())),
                Err(_) => Err(self.error(index, ParseErrorKind::InvalidNumber)),
            },
            false => match input.parse::<i64>() {
                Ok(num) => Ok(Kind::Value(num.into())),
                Err(_) => Err(self.error(index, ParseErrorKind::InvalidNumber)),
            },
        }
    }

    fn take_ident_or_keyword(&mut self, index: usize) -> Kind {
        let mut end = index;
        while let Some((e, 'a'..='z' | 'A'..='Z' | '_' | '0'..='9')) = self.chars.peek() {
            end = *e;
            self.chars.next();
        }

        match &self.src[index..=end] {
            "true" => Kind::Value(true.into()),
            "false" => Kind::Value(false.into()),
            _ => Kind::Value(Value::Ident(Span::new(index, end + 1))),
        }
    }
}
