use crate::ast::Expr;
use crate::error::{ReadError, ReadResult};
use crate::stream::CharStream;

/// `#/text/#`: everything up to the first `/#` is taken verbatim.
pub fn read_raw_string(stream: &mut CharStream, start: usize) -> ReadResult<Expr> {
    let mut text = String::new();
    while let Some(ch) = stream.next_char() {
        if ch == '/' && stream.peek() == Some('#') {
            stream.next_char();
            return Ok(Expr::string(text).with_span(stream.span_from(start)));
        }
        text.push(ch);
    }
    Err(ReadError::UnterminatedString {
        span: stream.span_from(start),
    })
}
