use std::fmt::Display;

use crate::error::ParseErrorKind;
use crate::primitives::Primitive;
use crate::token::{Kind, Operator, Span, Tokens, Value};

pub(crate) mod prec {
    pub const INITIAL: u8 = 0;
    pub const CONDITIONAL: u8 = 2;
    pub const EQUALITY: u8 = 3;
    pub const LOGICAL: u8 = 4;
    pub const SUM: u8 = 5;
    pub const PRODUCT: u8 = 6;
    pub const PREFIX: u8 = 8;
    pub const CALL: u8 = 10;
    pub const SUBCRIPT: u8 = 11;
}

fn get_precedence(op: Operator) -> u8 {
    match op {
        Operator::Dot | Operator::LBracket => prec::SUBCRIPT,
        Operator::LParen => prec::CALL,
        Operator::Mul | Operator::Div | Operator::Mod => prec::PRODUCT,
        Operator::Plus | Operator::Minus => prec::SUM,
        Operator::GreaterThan | Operator::GreaterThanOrEqual | Operator::LessThan | Operator::LessThanOrEqual => {
            prec::LOGICAL
        }
        Operator::EqualEqual | Operator::NotEqual => prec::EQUALITY,
        Operator::Or | Operator::And => prec::CONDITIONAL,

        _ => prec::INITIAL,
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Unary { op: Operator, expr: Box<Expr> },
    Binary { lhs: Box<Expr>, rhs: Box<Expr>, op: Operator },
    Primitive(Primitive),
    Ident(Span),
    Str(Span),
    Call { fun: Box<Expr>, args: Vec<Expr> },
    Array { lhs: Box<Expr>, index: Box<Expr> },
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Unary { op, expr } => write!(f, "({op}{expr})"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({op} {lhs} {rhs})"),
            Expr::Primitive(p) => write!(f, "{p}"),
            Expr::Ident(span) => write!(f, "{span}"),
            Expr::Str(span) => write!(f, "\"{span}\""),
            Expr::Array { lhs, index } => write!(f, "{lhs}[{index}]"),
            Expr::List(list) => {
                let s = list.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ");
                write!(f, "[{s}]")
            }
            Expr::Map(map) => {
                let s = map
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{s}}}")
            }
            Expr::Call { fun, args } => {
                let s = args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                write!(f, "{fun}({s})")
            }
        }
    }
}

/// Parse a complete expression. Every token has to be consumed.
pub(crate) fn parse_expr(tokens: &mut Tokens<'_>) -> Result<Expr, ParseErrorKind> {
    let expr = expr_bp(tokens, prec::INITIAL)?;
    match tokens.peek() {
        Kind::Eof => Ok(expr),
        _ => Err(ParseErrorKind::UnexpectedToken(tokens.peek_text().into())),
    }
}

fn expect(tokens: &mut Tokens<'_>, op: Operator, expected: &'static str) -> Result<(), ParseErrorKind> {
    match tokens.next() {
        Kind::Op(next) if next == op => Ok(()),
        Kind::Eof => Err(ParseErrorKind::UnexpectedEof),
        _ => Err(ParseErrorKind::InvalidToken { expected }),
    }
}

fn expr_bp(tokens: &mut Tokens<'_>, precedence: u8) -> Result<Expr, ParseErrorKind> {
    let mut left = match tokens.next() {
        Kind::Op(Operator::LBracket) => parse_collection(tokens)?,
        Kind::Op(Operator::LCurly) => parse_map(tokens)?,
        Kind::Op(Operator::LParen) => {
            let left = expr_bp(tokens, prec::INITIAL)?;
            expect(tokens, Operator::RParen, ")")?;
            left
        }
        Kind::Op(op @ (Operator::Not | Operator::Minus)) => Expr::Unary {
            op,
            expr: Box::new(expr_bp(tokens, prec::PREFIX)?),
        },
        Kind::Op(op) => return Err(ParseErrorKind::InvalidOperator(op)),
        Kind::Value(value) => match value {
            Value::Primitive(val) => Expr::Primitive(val),
            Value::Ident(ident) => Expr::Ident(ident),
            Value::String(span) => Expr::Str(span),
        },
        Kind::Eof => return Err(ParseErrorKind::UnexpectedEof),
    };

    loop {
        // Anything but an operator ends this expression.
        // Trailing values are rejected by `parse_expr`
        let Kind::Op(op) = tokens.peek() else {
            return Ok(left);
        };

        let token_prec = get_precedence(op);

        // If the current token precedence is higher than the current precedence, then we bind to the right,
        // otherwise we bind to the left
        if precedence >= token_prec {
            break;
        }

        tokens.consume();

        // Postfix parsing
        match op {
            Operator::LParen => {
                left = parse_function(tokens, left)?;
                continue;
            }
            Operator::LBracket => {
                left = Expr::Array {
                    lhs: Box::new(left),
                    index: Box::new(expr_bp(tokens, prec::INITIAL)?),
                };
                expect(tokens, Operator::RBracket, "]")?;
                continue;
            }
            _ => {}
        }

        let right = expr_bp(tokens, token_prec)?;
        left = Expr::Binary {
            lhs: Box::new(left),
            op,
            rhs: Box::new(right),
        };
    }

    Ok(left)
}

fn parse_function(tokens: &mut Tokens<'_>, left: Expr) -> Result<Expr, ParseErrorKind> {
    let mut args = vec![];

    loop {
        match tokens.peek() {
            Kind::Op(Operator::Comma) => {
                tokens.consume();
                continue;
            }
            Kind::Op(Operator::RParen) => {
                tokens.consume();
                break;
            }
            Kind::Eof => return Err(ParseErrorKind::UnexpectedEof),
            _ => (),
        }
        args.push(expr_bp(tokens, prec::INITIAL)?);
    }

    let expr = Expr::Call {
        fun: Box::new(left),
        args,
    };

    Ok(expr)
}

fn parse_collection(tokens: &mut Tokens<'_>) -> Result<Expr, ParseErrorKind> {
    let mut elements = vec![];

    loop {
        match tokens.peek() {
            Kind::Op(Operator::Comma) => {
                tokens.consume();
                continue;
            }
            Kind::Op(Operator::RBracket) => {
                tokens.consume();
                break;
            }
            Kind::Eof => return Err(ParseErrorKind::UnexpectedEof),
            _ => (),
        }
        elements.push(expr_bp(tokens, prec::INITIAL)?);
    }

    Ok(Expr::List(elements))
}

fn parse_map(tokens: &mut Tokens<'_>) -> Result<Expr, ParseErrorKind> {
    let mut elements = vec![];

    loop {
        match tokens.peek() {
            Kind::Op(Operator::Comma) => {
                tokens.consume();
                continue;
            }
            Kind::Op(Operator::RCurly) => {
                tokens.consume();
                break;
            }
            Kind::Eof => return Err(ParseErrorKind::UnexpectedEof),
            _ => (),
        }

        let key = expr_bp(tokens, prec::INITIAL)?;
        expect(tokens, Operator::Colon, ":")?;
        let value = expr_bp(tokens, prec::INITIAL)?;
        elements.push((key, value));
    }

    Ok(Expr::Map(elements))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_src(input: &str) -> Result<Expr, ParseErrorKind> {
        let tokens = Lexer::new(input).collect::<Result<_, _>>().unwrap();
        let mut tokens = Tokens::new(tokens, input);
        parse_expr(&mut tokens)
    }

    fn parse(input: &str) -> String {
        parse_src(input).unwrap().to_string()
    }

    #[test]
    fn add_sub() {
        assert_eq!(parse("1 + 2"), "(+ 1 2)");
        assert_eq!(parse("1 - 2"), "(- 1 2)");
    }

    #[test]
    fn mul_div() {
        assert_eq!(parse("5 + 1 * 2"), "(+ 5 (* 1 2))");
        assert_eq!(parse("5 - 1 / 2"), "(- 5 (/ 1 2))");
    }

    #[test]
    fn brackets() {
        assert_eq!(parse("(5 + 1) * 2"), "(* (+ 5 1) 2)");
    }

    #[test]
    fn function() {
        let input = "fun(1, a + 2 * 3, 3)";
        assert_eq!(parse(input), "<0..3>(1, (+ <7..8> (* 2 3)), 3)");
    }

    #[test]
    fn function_no_args() {
        assert_eq!(parse("f()"), "<0..1>()");
    }

    #[test]
    fn array_index() {
        assert_eq!(parse("array[0][1]"), "<0..5>[0][1]");
    }

    #[test]
    fn map_lookup() {
        assert_eq!(parse("map['key']"), "<0..3>[\"<5..8>\"]");
    }

    #[test]
    fn dot_lookup() {
        assert_eq!(parse("a.b.c"), "(. (. <0..1> <2..3>) <4..5>)");
    }

    #[test]
    fn modulo() {
        assert_eq!(parse("5 + 1 % 2"), "(+ 5 (% 1 2))");
    }

    #[test]
    fn nested_list() {
        assert_eq!(parse("[1, [2, 3, [4, 5]]]"), "[1, [2, 3, [4, 5]]]");
    }

    #[test]
    fn map() {
        assert_eq!(parse("{a: 1, b: c}"), "{<1..2>: 1, <7..8>: <10..11>}");
    }

    #[test]
    fn and() {
        assert_eq!(parse("1 == 2 && 3 == 4"), "(&& (== 1 2) (== 3 4))");
    }

    #[test]
    fn not() {
        assert_eq!(parse("!a && 3 != 4"), "(&& (!<1..2>) (!= 3 4))");
    }

    #[test]
    fn incomplete_binary() {
        assert_eq!(parse_src("1 +").unwrap_err(), ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn trailing_value() {
        assert_eq!(
            parse_src("a b").unwrap_err(),
            ParseErrorKind::UnexpectedToken("b".into())
        );
    }

    #[test]
    fn unclosed_groups() {
        assert_eq!(parse_src("(1 + 2").unwrap_err(), ParseErrorKind::UnexpectedEof);
        assert_eq!(parse_src("a[0").unwrap_err(), ParseErrorKind::UnexpectedEof);
        assert_eq!(parse_src("f(1, 2").unwrap_err(), ParseErrorKind::UnexpectedEof);
        assert_eq!(parse_src("[1, 2").unwrap_err(), ParseErrorKind::UnexpectedEof);
    }

    #[test]
    fn map_without_colon() {
        assert_eq!(
            parse_src("{a 1}").unwrap_err(),
            ParseErrorKind::InvalidToken { expected: ":" }
        );
    }

    #[test]
    fn leading_binary_operator() {
        assert_eq!(
            parse_src("* 2").unwrap_err(),
            ParseErrorKind::InvalidOperator(Operator::Mul)
        );
    }
}
