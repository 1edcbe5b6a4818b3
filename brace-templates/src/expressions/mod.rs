use std::collections::HashMap;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::primitives::Primitive;

pub use self::compiler::{CompileExpression, ExpressionCompiler};

mod compiler;
pub(crate) mod eval;
pub(crate) mod parser;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Div,
    Mul,
    Mod,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Equality {
    Eq,
    NotEq,
    And,
    Or,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// The tree of a compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    // Value types
    Primitive(Primitive),
    Str(Arc<str>),
    List(Arc<[Self]>),
    Map(Arc<HashMap<Arc<str>, Self>>),

    // Unary
    Not(Box<Self>),
    Negative(Box<Self>),

    // Conditionals
    Equality(Box<Self>, Box<Self>, Equality),

    // Lookup
    Ident(Arc<str>),
    Index(Box<Self>, Box<Self>),

    // Operations
    Op(Box<Self>, Box<Self>, Op),

    // Function call
    Call { fun: Box<Self>, args: Box<[Self]> },
}

impl From<Box<ExpressionKind>> for ExpressionKind {
    fn from(value: Box<ExpressionKind>) -> Self {
        *value
    }
}

impl<T: Into<Primitive>> From<T> for ExpressionKind {
    fn from(value: T) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<&str> for ExpressionKind {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl Display for ExpressionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(val) => write!(f, "{val}"),
            Self::Str(val) => write!(f, "\"{val}\""),
            Self::Ident(s) => write!(f, "{s}"),
            Self::Index(lhs, idx) => write!(f, "{lhs}[{idx}]"),
            Self::Not(expr) => write!(f, "!{expr}"),
            Self::Negative(expr) => write!(f, "-{expr}"),
            Self::Op(lhs, rhs, op) => {
                let op = match op {
                    Op::Add => '+',
                    Op::Sub => '-',
                    Op::Div => '/',
                    Op::Mul => '*',
                    Op::Mod => '%',
                };
                write!(f, "{lhs} {op} {rhs}")
            }
            Self::List(list) => {
                write!(
                    f,
                    "[{}]",
                    list.iter().map(|val| val.to_string()).collect::<Vec<_>>().join(", ")
                )
            }
            Self::Map(map) => {
                let mut entries = map.iter().map(|(key, val)| format!("{key}: {val}")).collect::<Vec<_>>();
                entries.sort();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Self::Equality(lhs, rhs, equality) => {
                let equality = match equality {
                    Equality::Eq => "==",
                    Equality::NotEq => "!=",
                    Equality::And => "&&",
                    Equality::Or => "||",
                    Equality::Gt => ">",
                    Equality::Gte => ">=",
                    Equality::Lt => "<",
                    Equality::Lte => "<=",
                };
                write!(f, "{lhs} {equality} {rhs}")
            }
            Self::Call { fun, args } => {
                write!(
                    f,
                    "{fun}({})",
                    args.iter().map(|val| val.to_string()).collect::<Vec<_>>().join(", ")
                )
            }
        }
    }
}

/// Identifies one compiled expression.
/// Every call to a compiler produces a new id, even for identical source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpressionId(usize);

impl From<usize> for ExpressionId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl Display for ExpressionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<expr {}>", self.0)
    }
}

/// A compiled expression.
///
/// Equality and hashing only consider the [`ExpressionId`], so a set of
/// expressions collapses clones of the same compiled expression but keeps
/// two separate compilations of the same source apart.
///
/// ```
/// # use brace_templates::expressions::{CompileExpression, ExpressionCompiler};
/// let compiler = ExpressionCompiler::new();
/// let a = compiler.compile("x + 1").unwrap();
/// let b = compiler.compile("x + 1").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.kind(), b.kind());
/// ```
#[derive(Debug, Clone)]
pub struct Expression {
    id: ExpressionId,
    source: Arc<str>,
    kind: Arc<ExpressionKind>,
}

impl Expression {
    pub fn new(id: impl Into<ExpressionId>, source: impl Into<Arc<str>>, kind: impl Into<ExpressionKind>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            kind: Arc::new(kind.into()),
        }
    }

    pub fn id(&self) -> ExpressionId {
        self.id
    }

    /// The source text the expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    pub fn is_literal(&self) -> bool {
        matches!(&*self.kind, ExpressionKind::Primitive(_) | ExpressionKind::Str(_))
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Expression {}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

// -----------------------------------------------------------------------------
//   - Paths -
// -----------------------------------------------------------------------------
pub fn ident(p: &str) -> Box<ExpressionKind> {
    ExpressionKind::Ident(p.into()).into()
}

pub fn index(lhs: Box<ExpressionKind>, rhs: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Index(lhs, rhs).into()
}

// -----------------------------------------------------------------------------
//   - Maths -
// -----------------------------------------------------------------------------
pub fn mul(lhs: Box<ExpressionKind>, rhs: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Op(lhs, rhs, Op::Mul).into()
}

pub fn add(lhs: Box<ExpressionKind>, rhs: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Op(lhs, rhs, Op::Add).into()
}

pub fn sub(lhs: Box<ExpressionKind>, rhs: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Op(lhs, rhs, Op::Sub).into()
}

pub fn greater_than(lhs: Box<ExpressionKind>, rhs: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Equality(lhs, rhs, Equality::Gt).into()
}

// -----------------------------------------------------------------------------
//   - Values -
// -----------------------------------------------------------------------------
pub fn num(int: i64) -> Box<ExpressionKind> {
    ExpressionKind::Primitive(int.into()).into()
}

pub fn float(float: f64) -> Box<ExpressionKind> {
    ExpressionKind::Primitive(float.into()).into()
}

pub fn boolean(b: bool) -> Box<ExpressionKind> {
    ExpressionKind::Primitive(b.into()).into()
}

pub fn strlit(lit: &str) -> Box<ExpressionKind> {
    ExpressionKind::Str(lit.into()).into()
}

pub fn list<E: Into<ExpressionKind>>(input: impl IntoIterator<Item = E>) -> Box<ExpressionKind> {
    let vec = input.into_iter().map(|val| val.into()).collect::<Vec<_>>();
    ExpressionKind::List(vec.into()).into()
}

pub fn map<E: Into<ExpressionKind>>(input: impl IntoIterator<Item = (&'static str, E)>) -> Box<ExpressionKind> {
    let input = input.into_iter().map(|(k, v)| (k.into(), v.into()));
    let hm: HashMap<Arc<str>, ExpressionKind> = HashMap::from_iter(input);
    ExpressionKind::Map(hm.into()).into()
}

// -----------------------------------------------------------------------------
//   - Conditionals -
// -----------------------------------------------------------------------------
pub fn neg(expr: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Negative(expr).into()
}

pub fn not(expr: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Not(expr).into()
}

pub fn eq(lhs: Box<ExpressionKind>, rhs: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Equality(lhs, rhs, Equality::Eq).into()
}

pub fn and(lhs: Box<ExpressionKind>, rhs: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Equality(lhs, rhs, Equality::And).into()
}

pub fn or(lhs: Box<ExpressionKind>, rhs: Box<ExpressionKind>) -> Box<ExpressionKind> {
    ExpressionKind::Equality(lhs, rhs, Equality::Or).into()
}
