use std::fmt;
use std::ops::Range;

use thiserror::Error;

/// All errors that abort a generation pass.
#[derive(Debug)]
pub struct GenError {
    pub kind: ErrorKind,
    /// Byte range inside the experiment-info literal, when the error came from it.
    pub span: Option<Range<usize>>,
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Lexer encountered an unrecognized character/sequence.
    #[error("unrecognized token: {0}")]
    UnrecognizedToken(String),
    /// Parser expected one thing, got another.
    #[error("expected {expected}, got {got}")]
    UnexpectedToken { expected: String, got: String },
    /// Parser reached end of input unexpectedly.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    /// The experiment-info parameter is not a dictionary literal.
    #[error("error in \"Experiment info\" settings (expected a dict): {0}")]
    InvalidExpInfo(String),
    /// A generator referenced a parameter the set does not contain.
    #[error("missing parameter '{0}'")]
    MissingParam(String),
    #[error("parameter '{key}' has value {value} which is not one of [{allowed}]")]
    DisallowedValue {
        key: String,
        value: String,
        allowed: String,
    },
    #[error("parameter '{key}' holds a {kind} value, which it does not accept")]
    DisallowedType { key: String, kind: String },
    /// A named text fragment could not be loaded.
    #[error("template fragment '{0}' not found")]
    MissingTemplate(String),
    #[error("template fragment '{name}': {msg}")]
    Template { name: String, msg: String },
    /// General message.
    #[error("{0}")]
    Message(String),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(span) = &self.span {
            write!(f, " (at byte {}..{})", span.start, span.end)?;
        }

        Ok(())
    }
}

impl std::error::Error for GenError {}

impl From<ErrorKind> for GenError {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, span: None }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

/// Shorthand constructors.
impl GenError {
    pub fn unexpected_token(expected: &str, got: &str, span: Range<usize>) -> Self {
        Self {
            kind: ErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                got: got.to_string(),
            },
            span: Some(span),
        }
    }

    pub fn unexpected_eof(expected: &str) -> Self {
        ErrorKind::UnexpectedEof {
            expected: expected.to_string(),
        }
        .into()
    }

    pub fn missing_param(key: &str) -> Self {
        ErrorKind::MissingParam(key.to_string()).into()
    }

    /// Wrap a syntax error from the experiment-info literal, keeping its span.
    pub fn invalid_exp_info(inner: GenError) -> Self {
        Self {
            kind: ErrorKind::InvalidExpInfo(inner.kind.to_string()),
            span: inner.span,
        }
    }

    pub fn template(name: &str, msg: impl Into<String>) -> Self {
        ErrorKind::Template {
            name: name.to_string(),
            msg: msg.into(),
        }
        .into()
    }

    /// General error with a message.
    pub fn message(msg: &str) -> Self {
        ErrorKind::Message(msg.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_span() {
        let err = GenError::unexpected_token("':'", "','", 4..5);
        assert_eq!(err.to_string(), "expected ':', got ',' (at byte 4..5)");
    }

    #[test]
    fn invalid_info_keeps_inner_message_and_span() {
        let inner = GenError::unexpected_token("value", "'}'", 12..13);
        let err = GenError::invalid_exp_info(inner);
        assert!(matches!(err.kind, ErrorKind::InvalidExpInfo(_)));
        assert_eq!(err.span, Some(12..13));
        assert!(err.to_string().contains("expected a dict"));
        assert!(err.to_string().contains("expected value"));
    }
}
