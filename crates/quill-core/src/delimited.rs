use crate::ast::Expr;
use crate::error::ReadResult;
use crate::reader::ExprReader;
use crate::stream::CharStream;

/// Reads forms until `closer` is consumed. The opener must already be
/// consumed by the caller.
pub fn read_delimited<R>(
    reader: &mut R,
    stream: &mut CharStream,
    closer: char,
) -> ReadResult<Vec<Expr>>
where
    R: ExprReader + ?Sized,
{
    let mut items = Vec::new();
    while let Some(item) = reader.read_list_item(stream, closer)? {
        items.push(item);
    }
    Ok(items)
}
