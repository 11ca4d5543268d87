use tracing::{debug, trace};

use crate::ast::{Expr, ExprKind, Literal};
use crate::delimited::read_delimited;
use crate::error::{ReadError, ReadResult};
use crate::literals;
use crate::options::ReaderOptions;
use crate::path;
use crate::raw_string;
use crate::registry::{Handler, Registry, TriggerKey};
use crate::short_fn;
use crate::stream::{is_delimiter, CharStream};

/// The recursive reader handlers call back into.
pub trait ExprReader {
    /// Reads one complete form starting at the cursor.
    fn read_expr(&mut self, stream: &mut CharStream) -> ReadResult<Expr>;

    /// Reads the next element of a list closed by `closer`. Returns `None`
    /// once the closer has been consumed; end of input first is
    /// `UnterminatedList`.
    fn read_list_item(
        &mut self,
        stream: &mut CharStream,
        closer: char,
    ) -> ReadResult<Option<Expr>>;
}

#[derive(Clone, Debug)]
pub struct Reader {
    registry: Registry,
}

impl Reader {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn extended() -> Self {
        Self::new(Registry::extended())
    }

    pub fn baseline() -> Self {
        Self::new(Registry::baseline())
    }

    pub fn from_options(options: &ReaderOptions) -> Self {
        Self::new(Registry::compose(
            &Registry::baseline(),
            &options.extensions,
        ))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn read_all(&mut self, source: &str) -> ReadResult<Vec<Expr>> {
        self.forms(source).collect()
    }

    /// Reads exactly one form; anything but trailing whitespace after it is
    /// an error.
    pub fn read_one(&mut self, source: &str) -> ReadResult<Expr> {
        let mut stream = CharStream::new(source);
        let expr = self.read_expr(&mut stream)?;
        stream.skip_ws_and_comments();
        match stream.peek() {
            None => Ok(expr),
            Some(ch) => Err(ReadError::UnexpectedChar {
                ch,
                span: stream.here(),
            }),
        }
    }

    pub fn forms<'r>(&'r mut self, source: &str) -> Forms<'r> {
        Forms {
            reader: self,
            stream: CharStream::new(source),
            failed: false,
        }
    }

    fn invoke(
        &mut self,
        handler: Handler,
        trigger: char,
        stream: &mut CharStream,
        start: usize,
    ) -> ReadResult<Expr> {
        match handler {
            Handler::List => {
                let items = read_delimited(self, stream, ')')?;
                Ok(Expr::new(ExprKind::List(items), stream.span_from(start)))
            }
            Handler::Close => Err(ReadError::UnbalancedCloser {
                ch: trigger,
                span: stream.span_from(start),
            }),
            Handler::Quote => {
                let quoted = self.read_expr(stream)?;
                Ok(Expr::quoted(quoted).with_span(stream.span_from(start)))
            }
            Handler::Str => {
                let text = read_string(stream, start)?;
                Ok(Expr::string(text).with_span(stream.span_from(start)))
            }
            Handler::Dispatch => self.read_dispatch(trigger, stream, start),
            Handler::Vector => literals::read_vector(self, stream, start),
            Handler::Map => literals::read_map(self, stream, start),
            Handler::FixedMap => literals::read_fixed_map(self, stream, start),
            Handler::RawString => raw_string::read_raw_string(stream, start),
            Handler::PositionalLambda => short_fn::read_positional_lambda(self, stream, start),
            Handler::PathAccess => path::read_path(stream, start),
        }
    }

    fn read_dispatch(
        &mut self,
        trigger: char,
        stream: &mut CharStream,
        start: usize,
    ) -> ReadResult<Expr> {
        let sub = stream.peek().ok_or(ReadError::UnexpectedEof {
            span: stream.span_from(start),
        })?;
        let key = TriggerKey::Pair(trigger, sub);
        match self.registry.dispatch(key) {
            // A pair bound back to Dispatch would recurse on the same char.
            Some(Handler::Dispatch) | None => Err(ReadError::UnknownDispatch {
                sub,
                span: stream.span_from(start),
            }),
            Some(handler) => {
                stream.next_char();
                debug!(trigger = %key, handler = %handler, "dispatch");
                self.invoke(handler, trigger, stream, start)
            }
        }
    }
}

impl ExprReader for Reader {
    fn read_expr(&mut self, stream: &mut CharStream) -> ReadResult<Expr> {
        stream.skip_ws_and_comments();
        let start = stream.pos();
        let ch = stream.peek().ok_or(ReadError::UnexpectedEof {
            span: stream.here(),
        })?;
        if let Some(handler) = self.registry.dispatch(TriggerKey::Char(ch)) {
            stream.next_char();
            if handler != Handler::Dispatch {
                debug!(trigger = %ch, handler = %handler, "dispatch");
            }
            return self.invoke(handler, ch, stream, start);
        }
        let token = stream.read_token();
        if token.is_empty() {
            return Err(ReadError::UnexpectedChar {
                ch,
                span: stream.here(),
            });
        }
        Ok(Expr::new(token_to_expr(&token), stream.span_from(start)))
    }

    fn read_list_item(
        &mut self,
        stream: &mut CharStream,
        closer: char,
    ) -> ReadResult<Option<Expr>> {
        stream.skip_ws_and_comments();
        let Some(ch) = stream.peek() else {
            return Err(ReadError::UnterminatedList {
                closer,
                span: stream.here(),
            });
        };
        if ch == closer {
            stream.next_char();
            return Ok(None);
        }
        let item = self.read_expr(stream)?;
        trace!(item = %item, "list item");
        Ok(Some(item))
    }
}

/// Iterator over the top-level forms of a source. Yields the first error and
/// then stops.
pub struct Forms<'r> {
    reader: &'r mut Reader,
    stream: CharStream,
    failed: bool,
}

impl Iterator for Forms<'_> {
    type Item = ReadResult<Expr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.stream.skip_ws_and_comments();
        if self.stream.is_end() {
            return None;
        }
        let result = self.reader.read_expr(&mut self.stream);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

fn read_string(stream: &mut CharStream, start: usize) -> ReadResult<String> {
    let mut out = String::new();
    while let Some(ch) = stream.next_char() {
        match ch {
            '"' => return Ok(out),
            '\\' => {
                let esc = stream.next_char().ok_or(ReadError::UnterminatedString {
                    span: stream.span_from(start),
                })?;
                match esc {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    other => {
                        return Err(ReadError::InvalidEscape {
                            ch: other,
                            span: stream.span_from(start),
                        })
                    }
                }
            }
            other => out.push(other),
        }
    }
    Err(ReadError::UnterminatedString {
        span: stream.span_from(start),
    })
}

/// True when `text`, read back as a single token, is the symbol `text`.
pub(crate) fn reads_as_symbol(text: &str) -> bool {
    if text.is_empty() || text.starts_with('#') || text.chars().any(is_delimiter) {
        return false;
    }
    matches!(token_to_expr(text), ExprKind::Symbol(ref name) if name == text)
}

fn token_to_expr(token: &str) -> ExprKind {
    match token {
        "nil" => ExprKind::Literal(Literal::Nil),
        "true" => ExprKind::Literal(Literal::Bool(true)),
        "false" => ExprKind::Literal(Literal::Bool(false)),
        _ => {
            if let Some(literal) = parse_number(token) {
                return ExprKind::Literal(literal);
            }
            match token.strip_prefix(':') {
                Some(name) if !name.is_empty() => ExprKind::Keyword(name.to_string()),
                _ => ExprKind::Symbol(token.to_string()),
            }
        }
    }
}

fn parse_number(token: &str) -> Option<Literal> {
    if !token.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        return None;
    }
    if token.contains('.') || token.contains('e') || token.contains('E') {
        return match token.parse::<f64>() {
            Ok(num) if num.is_finite() => Some(Literal::Float(num)),
            _ => None,
        };
    }
    token.parse::<i64>().ok().map(Literal::Int)
}
