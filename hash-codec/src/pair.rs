//! Key/value pairs and the decoder/encoder contracts.

use crate::error::CodecError;

/// One key and its raw string form.
///
/// `value: None` means the key is absent: encoders omit it entirely.
/// A present empty value is a bare key (`"flag"` rather than `"flag="`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    /// The key, unescaped.
    pub key: String,
    /// The raw value, unescaped, or `None` when absent.
    pub value: Option<String>,
}

impl Pair {
    /// Create a pair with a present value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Create a pair whose value is absent.
    pub fn absent(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// The value if present.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Turns a fragment string into pairs.
pub trait Decoder {
    /// Decode `input`, or answer `None` when it is not in this format.
    fn decode(&self, input: &str) -> Option<Vec<Pair>>;
}

/// Turns pairs into a fragment string.
pub trait Encoder {
    /// Encode `pairs` in order. Pairs with an absent value are skipped.
    fn encode(&self, pairs: &[Pair]) -> Result<String, CodecError>;
}

impl<T: Decoder + ?Sized> Decoder for &T {
    fn decode(&self, input: &str) -> Option<Vec<Pair>> {
        (**self).decode(input)
    }
}

impl<T: Decoder + ?Sized> Decoder for Box<T> {
    fn decode(&self, input: &str) -> Option<Vec<Pair>> {
        (**self).decode(input)
    }
}

impl<T: Encoder + ?Sized> Encoder for &T {
    fn encode(&self, pairs: &[Pair]) -> Result<String, CodecError> {
        (**self).encode(pairs)
    }
}

impl<T: Encoder + ?Sized> Encoder for Box<T> {
    fn encode(&self, pairs: &[Pair]) -> Result<String, CodecError> {
        (**self).encode(pairs)
    }
}

/// Iterate the pairs that carry a value.
pub(crate) fn present(pairs: &[Pair]) -> impl Iterator<Item = (&str, &str)> {
    pairs
        .iter()
        .filter_map(|p| p.value.as_deref().map(|v| (p.key.as_str(), v)))
}
