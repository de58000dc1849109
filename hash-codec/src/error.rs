//! Error types for fragment codecs.

use thiserror::Error;

/// Errors an [`Encoder`](crate::Encoder) can report.
///
/// Decoders never fail; they answer "no match" instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// No candidate encoder produced a non-empty result.
    #[error("no encoder produced output")]
    Empty,

    /// Every candidate encoder failed.
    #[error("all encoders failed: {}", .0.join("; "))]
    AllFailed(Vec<String>),

    /// The compression collaborator rejected the payload.
    #[error("compression failed: {0}")]
    Compression(String),

    /// The inner payload was not valid UTF-8.
    #[error("payload is not valid utf-8")]
    Utf8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CodecError::AllFailed(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "all encoders failed: a; b");
        assert_eq!(CodecError::Empty.to_string(), "no encoder produced output");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodecError>();
    }
}
