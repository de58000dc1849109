//! Error types for the fragment sync engine.

use thiserror::Error;
use urlhash_codec::CodecError;

/// A raw string that a parser refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {input:?}: {reason}")]
pub struct ParseError {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

impl ParseError {
    /// Create a parse error for `input`.
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by [`HashSync`](crate::HashSync) and its bindings.
#[derive(Debug, Error)]
pub enum HashError {
    /// A key can only be bound once.
    #[error("key already bound: {0}")]
    AlreadyBound(String),

    /// An explicit set or default was given a value the parser rejected.
    #[error("invalid value for {key:?}: {source}")]
    Parse {
        /// The key being written.
        key: String,
        /// The parser's complaint.
        #[source]
        source: ParseError,
    },

    /// The encoder could not produce a fragment.
    #[error("encoding failed: {0}")]
    Codec(#[from] CodecError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = HashError::AlreadyBound("tab".into());
        assert_eq!(err.to_string(), "key already bound: tab");

        let err = HashError::Parse {
            key: "n".into(),
            source: ParseError::new("x", "not a number"),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for \"n\": cannot parse \"x\": not a number"
        );
    }

    #[test]
    fn codec_error_converts() {
        let err: HashError = CodecError::Empty.into();
        assert!(matches!(err, HashError::Codec(CodecError::Empty)));
    }
}
