//! `@base.field#index...` accessor chains.
//!
//! The token after `@` is scanned once for separator positions, split into
//! segments, and folded left into nested `access-field` / `access-index`
//! calls.

use tracing::trace;

use crate::ast::{Expr, Span};
use crate::error::{ReadError, ReadResult};
use crate::reader::reads_as_symbol;
use crate::stream::{is_delimiter, CharStream};

pub const ACCESS_FIELD: &str = "access-field";
pub const ACCESS_INDEX: &str = "access-index";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Separator {
    /// The base segment.
    None,
    Field,
    Index,
}

impl Separator {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Separator::Field),
            '#' => Some(Separator::Index),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    pub separator: Separator,
    pub text: String,
}

/// Base segment followed by field/index segments in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSpec {
    segments: Vec<PathSegment>,
}

impl PathSpec {
    pub fn base(&self) -> &str {
        &self.segments[0].text
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn accessors(&self) -> &[PathSegment] {
        &self.segments[1..]
    }
}

/// Splits `whole` at every `.` and `#` after the first character. A
/// separator in position 0 stays part of the base.
pub fn scan_path(whole: &str) -> PathSpec {
    let chars: Vec<char> = whole.chars().collect();
    let mut cuts = Vec::new();
    for (idx, ch) in chars.iter().enumerate().skip(1) {
        if let Some(sep) = Separator::from_char(*ch) {
            cuts.push((idx, sep));
        }
    }

    let base_end = cuts.first().map_or(chars.len(), |(idx, _)| *idx);
    let mut segments = Vec::with_capacity(cuts.len() + 1);
    segments.push(PathSegment {
        separator: Separator::None,
        text: chars[..base_end].iter().collect(),
    });
    for (n, (idx, separator)) in cuts.iter().enumerate() {
        let end = cuts.get(n + 1).map_or(chars.len(), |(next, _)| *next);
        segments.push(PathSegment {
            separator: *separator,
            text: chars[idx + 1..end].iter().collect(),
        });
    }
    PathSpec { segments }
}

/// Folds a scanned path into nested accessor calls. The base and every field
/// name must read back as the same symbol, so printed output re-reads equal.
pub fn fold_path(spec: &PathSpec, whole: &str, span: Span) -> ReadResult<Expr> {
    let mut node = Expr::symbol(symbol_segment(spec.base(), "base", whole, span)?);
    for segment in spec.accessors() {
        trace!(separator = ?segment.separator, text = %segment.text, "path segment");
        node = match segment.separator {
            Separator::Field => {
                if segment.text.is_empty() {
                    return Err(ReadError::malformed(
                        format!("empty field name in path '{}'", whole),
                        span,
                    ));
                }
                let name = symbol_segment(&segment.text, "field", whole, span)?;
                Expr::list(vec![
                    Expr::symbol(ACCESS_FIELD),
                    node,
                    Expr::quoted(Expr::symbol(name)),
                ])
            }
            Separator::Index => {
                let index = parse_index(&segment.text, whole, span)?;
                Expr::list(vec![Expr::symbol(ACCESS_INDEX), node, Expr::int(index)])
            }
            Separator::None => {
                unreachable!("scan_path gives only the base segment no separator")
            }
        };
    }
    Ok(node)
}

/// Reads what follows `@`. Whitespace, a delimiter or end of input right
/// after the trigger yields the bare symbol `@`.
pub fn read_path(stream: &mut CharStream, start: usize) -> ReadResult<Expr> {
    match stream.peek() {
        None => return Ok(Expr::symbol("@").with_span(stream.span_from(start))),
        Some(ch) if is_delimiter(ch) => {
            return Ok(Expr::symbol("@").with_span(stream.span_from(start)))
        }
        Some(_) => {}
    }
    let whole = stream.read_token();
    let span = stream.span_from(start);
    let spec = scan_path(&whole);
    Ok(fold_path(&spec, &whole, span)?.with_span(span))
}

fn symbol_segment<'a>(
    text: &'a str,
    role: &str,
    whole: &str,
    span: Span,
) -> ReadResult<&'a str> {
    if reads_as_symbol(text) {
        Ok(text)
    } else {
        Err(ReadError::malformed(
            format!("path {} '{}' in '{}' does not read as a symbol", role, text, whole),
            span,
        ))
    }
}

/// Indices are non-negative and bounded by `i64::MAX`.
fn parse_index(text: &str, whole: &str, span: Span) -> ReadResult<i64> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReadError::InvalidIndex {
            segment: text.to_string(),
            path: whole.to_string(),
            span,
        });
    }
    text.parse::<i64>().map_err(|_| {
        ReadError::malformed(
            format!("index '{}' in path '{}' is out of range", text, whole),
            span,
        )
    })
}
