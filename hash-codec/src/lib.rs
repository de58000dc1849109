//! # hash-codec
//!
//! Encodings between an ordered sequence of key/value [`Pair`]s and a single
//! fragment string.
//!
//! This crate provides:
//! - [`Escaped`] - `key=value&key` with percent-style escaping (min or max)
//! - [`AsciiSep`] - control-character delimited pairs, free of `=`/`&` ambiguity
//! - [`Base64`] and [`Deflated`] - prefix-gated wrappers that can be stacked
//! - [`DecodeFirst`] and [`EncodeShortest`] - combinators that compose codecs
//!
//! Every codec is a pure value: no state, no I/O. A decoder answers
//! `None` when the input is not in its format; an encoder answers a
//! [`CodecError`] when it cannot produce output.
//!
//! ## Example
//!
//! ```
//! use urlhash_codec::{decode_first, encode_shortest, AsciiSep, Base64, Decoder, Encoder, Escaped, Pair};
//!
//! let decode = decode_first(vec![
//!     Box::new(Base64::new(AsciiSep)),
//!     Box::new(Escaped::max()),
//! ]);
//! let encode = encode_shortest(vec![
//!     Box::new(Escaped::max()),
//!     Box::new(Base64::new(AsciiSep)),
//! ]);
//!
//! let pairs = vec![Pair::new("q", "a&b")];
//! let text = encode.encode(&pairs).unwrap();
//! assert_eq!(decode.decode(&text), Some(pairs));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ascii;
mod combine;
mod error;
mod escape;
mod pair;
mod wrap;

pub use ascii::{AsciiSep, ESCAPE, FIELD_SEP, RECORD_SEP};
pub use combine::{decode_first, encode_shortest, DecodeFirst, EncodeShortest};
pub use error::CodecError;
pub use escape::{escape_max, escape_min, unescape, EscapeLevel, Escaped};
pub use pair::{Decoder, Encoder, Pair};
pub use wrap::{
    Base64, Compressor, Deflate, Deflated, DEFAULT_BASE64_PREFIX, DEFAULT_DEFLATE_PREFIX,
};
