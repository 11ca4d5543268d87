use tracing::trace;

use crate::ast::{Expr, ExprKind};
use crate::error::ReadResult;
use crate::reader::ExprReader;
use crate::stream::CharStream;

/// Parameter names of a positional lambda, in call order.
pub const PLACEHOLDERS: [&str; 2] = ["%", "%%"];

/// Reads the body of `` #`body `` or `^body` and wraps it in a two-argument
/// lambda whose parameters are both optional.
pub fn read_positional_lambda<R>(
    reader: &mut R,
    stream: &mut CharStream,
    start: usize,
) -> ReadResult<Expr>
where
    R: ExprReader + ?Sized,
{
    let body = reader.read_expr(stream)?;
    let forms = body_forms(body);
    trace!(forms = forms.len(), "positional lambda");
    Ok(lambda_expr(forms).with_span(stream.span_from(start)))
}

/// `((f %) (g %%))` is a sequence of body forms; anything else is one form.
pub fn body_forms(expr: Expr) -> Vec<Expr> {
    match expr.kind {
        ExprKind::List(items) if items.first().is_some_and(Expr::is_list) => items,
        kind => vec![Expr::new(kind, expr.span)],
    }
}

pub fn lambda_expr(body: Vec<Expr>) -> Expr {
    let params = || PLACEHOLDERS.iter().map(|name| Expr::symbol(*name));
    let mut lambda_list = vec![Expr::symbol("&optional")];
    lambda_list.extend(params());
    let mut ignorable = vec![Expr::symbol("ignorable")];
    ignorable.extend(params());

    let mut out = Vec::with_capacity(body.len() + 3);
    out.push(Expr::symbol("lambda"));
    out.push(Expr::list(lambda_list));
    out.push(Expr::list(vec![Expr::symbol("declare"), Expr::list(ignorable)]));
    out.extend(body);
    Expr::list(out)
}
