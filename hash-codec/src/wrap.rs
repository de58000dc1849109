//! Prefix-gated wrapper codecs.
//!
//! A wrapper runs an inner codec (normally [`AsciiSep`](crate::AsciiSep))
//! and carries its output as URL-safe base64 behind a literal prefix, so a
//! decoder can recognise its own payloads and answer "no match" for
//! everything else. Wrappers stack: `Base64::new(Deflated::new(..))` is a
//! valid codec, if not a useful one.

use std::io::{Read, Write};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::CodecError;
use crate::pair::{Decoder, Encoder, Pair};

/// Default prefix marking a base64 payload.
pub const DEFAULT_BASE64_PREFIX: &str = "b64:";
/// Default prefix marking a compressed payload.
pub const DEFAULT_DEFLATE_PREFIX: &str = "pak:";

/// Compression collaborator used by [`Deflated`].
///
/// Both directions report failure with `None` instead of an error, since a
/// failed decompression only means "this payload is not ours".
pub trait Compressor {
    /// Compress `data`, or `None` when the input cannot be compressed.
    fn compress(&self, data: &[u8]) -> Option<Vec<u8>>;

    /// Decompress `data`, or `None` when it is not a valid stream.
    fn decompress(&self, data: &[u8]) -> Option<Vec<u8>>;
}

/// Raw DEFLATE (RFC 1951) through flate2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deflate {
    level: u32,
}

impl Deflate {
    /// Compressor at the given level (0-9, clamped).
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    /// The configured compression level.
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for Deflate {
    fn default() -> Self {
        Self::new(Compression::default().level())
    }
}

impl Compressor for Deflate {
    fn compress(&self, data: &[u8]) -> Option<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(data).ok()?;
        encoder.finish().ok()
    }

    fn decompress(&self, data: &[u8]) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        DeflateDecoder::new(data).read_to_end(&mut out).ok()?;
        Some(out)
    }
}

/// Base64 wrapper: `prefix + base64(inner.encode(pairs))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64<C> {
    inner: C,
    prefix: String,
}

impl<C> Base64<C> {
    /// Wrap `inner` behind [`DEFAULT_BASE64_PREFIX`].
    pub fn new(inner: C) -> Self {
        Self::with_prefix(inner, DEFAULT_BASE64_PREFIX)
    }

    /// Wrap `inner` behind a caller-supplied prefix.
    pub fn with_prefix(inner: C, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    /// The literal prefix gating this codec.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<C: Decoder> Decoder for Base64<C> {
    fn decode(&self, input: &str) -> Option<Vec<Pair>> {
        let payload = input.strip_prefix(self.prefix.as_str())?;
        let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        self.inner.decode(&text)
    }
}

impl<C: Encoder> Encoder for Base64<C> {
    fn encode(&self, pairs: &[Pair]) -> Result<String, CodecError> {
        let inner = self.inner.encode(pairs)?;
        Ok(format!(
            "{}{}",
            self.prefix,
            URL_SAFE_NO_PAD.encode(inner.as_bytes())
        ))
    }
}

/// Compression wrapper: `prefix + base64(compress(inner.encode(pairs)))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deflated<C, Z = Deflate> {
    inner: C,
    compressor: Z,
    prefix: String,
}

impl<C> Deflated<C, Deflate> {
    /// Wrap `inner` with default DEFLATE behind [`DEFAULT_DEFLATE_PREFIX`].
    pub fn new(inner: C) -> Self {
        Self::with_compressor(inner, Deflate::default(), DEFAULT_DEFLATE_PREFIX)
    }
}

impl<C, Z> Deflated<C, Z> {
    /// Wrap `inner` with a custom compressor and prefix.
    pub fn with_compressor(inner: C, compressor: Z, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            compressor,
            prefix: prefix.into(),
        }
    }

    /// The literal prefix gating this codec.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<C: Decoder, Z: Compressor> Decoder for Deflated<C, Z> {
    fn decode(&self, input: &str) -> Option<Vec<Pair>> {
        let payload = input.strip_prefix(self.prefix.as_str())?;
        let packed = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let Some(bytes) = self.compressor.decompress(&packed) else {
            tracing::trace!(prefix = %self.prefix, "decompression failed, not a match");
            return None;
        };
        let text = String::from_utf8(bytes).ok()?;
        self.inner.decode(&text)
    }
}

impl<C: Encoder, Z: Compressor> Encoder for Deflated<C, Z> {
    fn encode(&self, pairs: &[Pair]) -> Result<String, CodecError> {
        let inner = self.inner.encode(pairs)?;
        match self.compressor.compress(inner.as_bytes()) {
            Some(packed) => Ok(format!(
                "{}{}",
                self.prefix,
                URL_SAFE_NO_PAD.encode(packed)
            )),
            None => {
                tracing::debug!(prefix = %self.prefix, "compression failed, emitting inner payload");
                Ok(inner)
            }
        }
    }
}
