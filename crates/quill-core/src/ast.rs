use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn point(at: usize) -> Self {
        Self { start: at, end: at }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "offset {}", self.start)
        } else {
            write!(f, "offset {}..{}", self.start, self.end)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Symbol(String),
    Keyword(String),
    List(Vec<Expr>),
}

/// A node of the tree produced by reading. Equality ignores spans, so trees
/// built by handlers compare equal to trees read from text.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(literal: Literal) -> Self {
        Self::new(ExprKind::Literal(literal), Span::default())
    }

    pub fn nil() -> Self {
        Self::literal(Literal::Nil)
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(Literal::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::literal(Literal::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::Str(value.into()))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Symbol(name.into()), Span::default())
    }

    pub fn keyword(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Keyword(name.into()), Span::default())
    }

    pub fn list(items: Vec<Expr>) -> Self {
        Self::new(ExprKind::List(items), Span::default())
    }

    /// `(quote expr)`
    pub fn quoted(expr: Expr) -> Self {
        Self::list(vec![Expr::symbol("quote"), expr])
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Symbol(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match &self.kind {
            ExprKind::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, ExprKind::List(_))
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Prints text the baseline reader reads back into an equal tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(Literal::Nil) => write!(f, "nil"),
            ExprKind::Literal(Literal::Bool(b)) => write!(f, "{}", b),
            ExprKind::Literal(Literal::Int(n)) => write!(f, "{}", n),
            ExprKind::Literal(Literal::Float(n)) => write!(f, "{:?}", n),
            ExprKind::Literal(Literal::Str(s)) => write!(f, "\"{}\"", escape_string(s)),
            ExprKind::Symbol(name) => write!(f, "{}", name),
            ExprKind::Keyword(name) => write!(f, ":{}", name),
            ExprKind::List(items) => {
                write!(f, "(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
