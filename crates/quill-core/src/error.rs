use std::path::PathBuf;

use thiserror::Error;

use crate::ast::Span;

pub const ERROR_TAG: &str = "\x1b[31m[ERROR]\x1b[0m";

pub type ReadResult<T> = Result<T, ReadError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("unterminated list: expected '{closer}' before end of input at {span}")]
    UnterminatedList { closer: char, span: Span },

    #[error("unterminated string starting at {span}")]
    UnterminatedString { span: Span },

    #[error("malformed literal: {message} at {span}")]
    MalformedLiteral { message: String, span: Span },

    #[error("invalid index '{segment}' in path '{path}' at {span}")]
    InvalidIndex {
        segment: String,
        path: String,
        span: Span,
    },

    #[error("unexpected end of input at {span}")]
    UnexpectedEof { span: Span },

    #[error("unbalanced '{ch}' at {span}")]
    UnbalancedCloser { ch: char, span: Span },

    #[error("unknown dispatch '#{sub}' at {span}")]
    UnknownDispatch { sub: char, span: Span },

    #[error("unexpected '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unknown escape '\\{ch}' in string at {span}")]
    InvalidEscape { ch: char, span: Span },
}

impl ReadError {
    pub fn malformed(message: impl Into<String>, span: Span) -> Self {
        Self::MalformedLiteral {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnterminatedList { span, .. }
            | Self::UnterminatedString { span }
            | Self::MalformedLiteral { span, .. }
            | Self::InvalidIndex { span, .. }
            | Self::UnexpectedEof { span }
            | Self::UnbalancedCloser { span, .. }
            | Self::UnknownDispatch { span, .. }
            | Self::UnexpectedChar { span, .. }
            | Self::InvalidEscape { span, .. } => *span,
        }
    }

    /// True when more input could have completed the form, which is what an
    /// interactive caller needs to decide between "keep reading" and "report".
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            Self::UnterminatedList { .. } | Self::UnterminatedString { .. } | Self::UnexpectedEof { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// 1-based line and column of a char offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for ch in source.chars().take(offset) {
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

pub fn format_error(err: &ReadError, source: &str, source_name: Option<&str>) -> String {
    let (line, col) = line_col(source, err.span().start);
    format!(
        "{}:{}:{}: {}",
        source_name.unwrap_or("<input>"),
        line,
        col,
        err
    )
}
