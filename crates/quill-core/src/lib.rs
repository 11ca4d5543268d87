pub mod ast;
pub mod delimited;
pub mod error;
pub mod literals;
pub mod options;
pub mod path;
pub mod raw_string;
pub mod reader;
pub mod registry;
pub mod short_fn;
pub mod stream;

pub use ast::{Expr, ExprKind, Literal, Span};
pub use error::{format_error, ConfigError, ReadError, ReadResult, ERROR_TAG};
pub use options::{
    load_options_file, load_options_str, render_options, Extensions, ReaderOptions,
};
pub use reader::{ExprReader, Reader};
pub use registry::{Handler, Registry, TriggerKey};
pub use stream::CharStream;

/// Reads every top-level form with all trigger syntaxes enabled.
pub fn read_all(source: &str) -> ReadResult<Vec<Expr>> {
    Reader::extended().read_all(source)
}

/// Reads with the standard table only.
pub fn read_all_baseline(source: &str) -> ReadResult<Vec<Expr>> {
    Reader::baseline().read_all(source)
}
