//! Aggregate literal builders: `#v(...)` vectors, `#h(...)` growable maps and
//! `{...}` fixed-capacity maps. Each one reads its elements through the shared
//! delimited scanner and returns the constructor call that builds the value.

use tracing::trace;

use crate::ast::{Expr, Span};
use crate::delimited::read_delimited;
use crate::error::{ReadError, ReadResult};
use crate::reader::ExprReader;
use crate::stream::CharStream;

pub const MAKE_ARRAY: &str = "make-array";
pub const MAKE_HASH_TABLE: &str = "make-hash-table";
pub const SET_HASH: &str = "set-hash";
pub const TABLE_VAR: &str = "__table";
pub const DEFAULT_TEST: &str = "eql";

/// `#v(e1 ... eN)`, stream positioned after `#v`.
pub fn read_vector<R>(reader: &mut R, stream: &mut CharStream, start: usize) -> ReadResult<Expr>
where
    R: ExprReader + ?Sized,
{
    expect_open(stream, start, "#v")?;
    let items = read_delimited(reader, stream, ')')?;
    trace!(len = items.len(), "vector literal");
    Ok(vector_expr(items).with_span(stream.span_from(start)))
}

/// `#h([test] k1 v1 ...)`, stream positioned after `#h`.
pub fn read_map<R>(reader: &mut R, stream: &mut CharStream, start: usize) -> ReadResult<Expr>
where
    R: ExprReader + ?Sized,
{
    expect_open(stream, start, "#h")?;
    let items = read_delimited(reader, stream, ')')?;
    let span = stream.span_from(start);
    Ok(map_expr(items, false, span)?.with_span(span))
}

/// `{[test] k1 v1 ...}`, stream positioned after `{`.
pub fn read_fixed_map<R>(
    reader: &mut R,
    stream: &mut CharStream,
    start: usize,
) -> ReadResult<Expr>
where
    R: ExprReader + ?Sized,
{
    let items = read_delimited(reader, stream, '}')?;
    let span = stream.span_from(start);
    Ok(map_expr(items, true, span)?.with_span(span))
}

pub fn vector_expr(items: Vec<Expr>) -> Expr {
    let len = items.len() as i64;
    let mut contents = Vec::with_capacity(items.len() + 1);
    contents.push(Expr::symbol("list"));
    contents.extend(items);
    Expr::list(vec![
        Expr::symbol(MAKE_ARRAY),
        Expr::int(len),
        Expr::keyword("initial-contents"),
        Expr::list(contents),
        Expr::keyword("adjustable"),
        Expr::bool(true),
        Expr::keyword("fill-pointer"),
        Expr::bool(true),
    ])
}

/// Builds the `let` that creates a table and fills it in source order. An odd
/// element count means the first element names the equality test.
pub fn map_expr(mut items: Vec<Expr>, sized: bool, span: Span) -> ReadResult<Expr> {
    let test = if items.len() % 2 == 1 {
        let spec = items.remove(0);
        match spec.as_symbol() {
            Some(name) => name.to_string(),
            None => {
                return Err(ReadError::malformed(
                    format!("hash table test must be a symbol, found {}", spec),
                    span,
                ))
            }
        }
    } else {
        DEFAULT_TEST.to_string()
    };
    if items.len() % 2 != 0 {
        return Err(ReadError::malformed("odd number of key/value forms", span));
    }
    let pairs = items.len() / 2;
    trace!(pairs, test = %test, sized, "hash table literal");

    let mut ctor = vec![
        Expr::symbol(MAKE_HASH_TABLE),
        Expr::keyword("test"),
        Expr::quoted(Expr::symbol(test)),
    ];
    if sized {
        ctor.push(Expr::keyword("size"));
        ctor.push(Expr::int(pairs as i64));
    }
    let bindings = Expr::list(vec![Expr::list(vec![
        Expr::symbol(TABLE_VAR),
        Expr::list(ctor),
    ])]);

    let mut body = Vec::with_capacity(pairs + 3);
    body.push(Expr::symbol("let"));
    body.push(bindings);
    let mut iter = items.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        body.push(Expr::list(vec![
            Expr::symbol(SET_HASH),
            Expr::symbol(TABLE_VAR),
            key,
            value,
        ]));
    }
    body.push(Expr::symbol(TABLE_VAR));
    Ok(Expr::list(body))
}

fn expect_open(stream: &mut CharStream, start: usize, trigger: &str) -> ReadResult<()> {
    if stream.consume('(') {
        Ok(())
    } else {
        Err(ReadError::malformed(
            format!("expected '(' after {}", trigger),
            stream.span_from(start),
        ))
    }
}
