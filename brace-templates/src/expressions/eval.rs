use std::collections::HashMap;
use std::sync::Arc;

use super::parser::Expr;
use super::{Equality, ExpressionKind, Op};
use crate::error::ParseErrorKind;
use crate::token::Operator;

/// Turn the parse tree into an owned expression, resolving every span against `src`.
pub(crate) fn eval(expr: Expr, src: &str) -> Result<ExpressionKind, ParseErrorKind> {
    let output = match expr {
        Expr::Primitive(val) => ExpressionKind::Primitive(val),
        Expr::Ident(span) => ExpressionKind::Ident(Arc::from(span.as_str(src))),
        Expr::Str(span) => ExpressionKind::Str(Arc::from(unescape(span.as_str(src)))),
        Expr::Array { lhs, index } => {
            let lhs = eval(*lhs, src)?;
            let index = eval(*index, src)?;
            ExpressionKind::Index(lhs.into(), index.into())
        }
        Expr::Binary { op, lhs, rhs } => match op {
            Operator::Dot => {
                let lhs = eval(*lhs, src)?.into();
                let span = match *rhs {
                    Expr::Ident(span) => span,
                    _ => {
                        return Err(ParseErrorKind::InvalidToken {
                            expected: "this can only be an ident",
                        });
                    }
                };
                ExpressionKind::Index(lhs, ExpressionKind::Str(span.as_str(src).into()).into())
            }
            Operator::Mul | Operator::Plus | Operator::Minus | Operator::Div | Operator::Mod => {
                let (lhs, rhs) = (eval(*lhs, src)?.into(), eval(*rhs, src)?.into());
                let op = match op {
                    Operator::Mul => Op::Mul,
                    Operator::Plus => Op::Add,
                    Operator::Minus => Op::Sub,
                    Operator::Div => Op::Div,
                    Operator::Mod => Op::Mod,
                    _ => unreachable!(),
                };
                ExpressionKind::Op(lhs, rhs, op)
            }
            Operator::EqualEqual
            | Operator::NotEqual
            | Operator::GreaterThan
            | Operator::GreaterThanOrEqual
            | Operator::LessThan
            | Operator::LessThanOrEqual
            | Operator::And
            | Operator::Or => {
                let equality = match op {
                    Operator::EqualEqual => Equality::Eq,
                    Operator::NotEqual => Equality::NotEq,
                    Operator::GreaterThan => Equality::Gt,
                    Operator::GreaterThanOrEqual => Equality::Gte,
                    Operator::LessThan => Equality::Lt,
                    Operator::LessThanOrEqual => Equality::Lte,
                    Operator::And => Equality::And,
                    Operator::Or => Equality::Or,
                    _ => unreachable!(),
                };
                ExpressionKind::Equality(eval(*lhs, src)?.into(), eval(*rhs, src)?.into(), equality)
            }
            op => return Err(ParseErrorKind::InvalidOperator(op)),
        },
        Expr::Unary { op, expr } => {
            let expr = eval(*expr, src)?;

            match op {
                Operator::Not => ExpressionKind::Not(expr.into()),
                Operator::Minus => ExpressionKind::Negative(expr.into()),
                _ => {
                    return Err(ParseErrorKind::InvalidToken {
                        expected: "either ! or -",
                    });
                }
            }
        }
        Expr::List(list) => ExpressionKind::List(
            list.into_iter()
                .map(|expr| eval(expr, src))
                .collect::<Result<Vec<_>, _>>()?
                .into(),
        ),
        Expr::Map(map) => {
            let mut inner = HashMap::default();
            for (key, value) in map.into_iter() {
                let key = match eval(key, src)? {
                    ExpressionKind::Str(s) | ExpressionKind::Ident(s) => s,
                    _ => return Err(ParseErrorKind::InvalidKey),
                };
                inner.insert(key, eval(value, src)?);
            }

            ExpressionKind::Map(inner.into())
        }
        Expr::Call { fun, args } => {
            let args = args
                .into_iter()
                .map(|expr| eval(expr, src))
                .collect::<Result<Vec<_>, _>>()?;

            ExpressionKind::Call {
                fun: eval(*fun, src)?.into(),
                args: args.into_boxed_slice(),
            }
        }
    };

    Ok(output)
}

fn unescape(s: &str) -> String {
    s.replace("\\\"", "\"").replace("\\'", "'")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::expressions::parser::parse_expr;
    use crate::expressions::*;
    use crate::lexer::Lexer;
    use crate::token::Tokens;

    fn eval_src(input: &str) -> Result<ExpressionKind, ParseErrorKind> {
        let tokens = Lexer::new(input).collect::<Result<_, _>>().unwrap();
        let mut tokens = Tokens::new(tokens, input);
        let expr = parse_expr(&mut tokens)?;
        eval(expr, input)
    }

    #[test]
    fn eval_primitives() {
        assert_eq!(*num(2), eval_src("2").unwrap());
        assert_eq!(*float(2.5), eval_src("2.5").unwrap());
        assert_eq!(*boolean(true), eval_src("true").unwrap());
        assert_eq!(*strlit("it's"), eval_src(r"'it\'s'").unwrap());
    }

    #[test]
    fn eval_path() {
        let expected = index(index(ident("item"), strlit("tags")), num(0));
        assert_eq!(*expected, eval_src("item.tags[0]").unwrap());
    }

    #[test]
    fn eval_maths() {
        let expected = sub(add(num(1), mul(num(2), ident("x"))), neg(num(3)));
        assert_eq!(*expected, eval_src("1 + 2 * x - -3").unwrap());
    }

    #[test]
    fn eval_conditionals() {
        let expected = or(
            and(not(ident("a")), greater_than(ident("b"), num(1))),
            eq(ident("c"), strlit("d")),
        );
        assert_eq!(*expected, eval_src("!a && b > 1 || c == 'd'").unwrap());
    }

    #[test]
    fn eval_collections() {
        assert_eq!(*list([1i64, 2, 3]), eval_src("[1, 2, 3]").unwrap());
        assert_eq!(*map([("a", 1i64), ("b", 2)]), eval_src("{a: 1, 'b': 2}").unwrap());
    }

    #[test]
    fn eval_call() {
        let expected = ExpressionKind::Call {
            fun: ident("format"),
            args: vec![*ident("a"), *num(1)].into_boxed_slice(),
        };
        assert_eq!(expected, eval_src("format(a, 1)").unwrap());
    }

    #[test]
    fn invalid_map_key() {
        assert_eq!(eval_src("{1: 2}").unwrap_err(), ParseErrorKind::InvalidKey);
    }

    #[test]
    fn dot_requires_ident() {
        assert_eq!(
            eval_src("a.1").unwrap_err(),
            ParseErrorKind::InvalidToken {
                expected: "this can only be an ident"
            }
        );
    }
}
