//! Control-character delimited pairs.
//!
//! `key FIELD_SEP value RECORD_SEP key FIELD_SEP value ...`, with
//! [`ESCAPE`] making the next character literal. Nothing printable has a
//! special meaning, so keys and values travel without percent escaping.
//! This is the payload format carried inside the wrapper codecs.

use crate::error::CodecError;
use crate::pair::{present, Decoder, Encoder, Pair};

/// Separates a key from its value (ASCII unit separator).
pub const FIELD_SEP: char = '\u{1f}';
/// Separates one pair from the next (ASCII record separator).
pub const RECORD_SEP: char = '\u{1e}';
/// Makes the following character literal (ASCII escape).
pub const ESCAPE: char = '\u{1b}';

/// The control-separator codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AsciiSep;

impl Decoder for AsciiSep {
    fn decode(&self, input: &str) -> Option<Vec<Pair>> {
        let mut pairs = Vec::new();
        let mut key = String::new();
        let mut value = String::new();
        let mut in_value = false;
        let mut chars = input.chars();

        while let Some(c) = chars.next() {
            let literal = match c {
                ESCAPE => match chars.next() {
                    Some(next) => next,
                    None => break,
                },
                FIELD_SEP if !in_value => {
                    in_value = true;
                    continue;
                }
                RECORD_SEP => {
                    flush(&mut pairs, &mut key, &mut value);
                    in_value = false;
                    continue;
                }
                other => other,
            };
            if in_value {
                value.push(literal);
            } else {
                key.push(literal);
            }
        }
        flush(&mut pairs, &mut key, &mut value);

        Some(pairs)
    }
}

impl Encoder for AsciiSep {
    fn encode(&self, pairs: &[Pair]) -> Result<String, CodecError> {
        let mut out = String::new();
        for (i, (key, value)) in present(pairs).enumerate() {
            if i > 0 {
                out.push(RECORD_SEP);
            }
            push_escaped(&mut out, key);
            out.push(FIELD_SEP);
            push_escaped(&mut out, value);
        }
        Ok(out)
    }
}

// Empty keys are terminator artifacts and are dropped.
fn flush(pairs: &mut Vec<Pair>, key: &mut String, value: &mut String) {
    if key.is_empty() {
        value.clear();
        return;
    }
    pairs.push(Pair {
        key: std::mem::take(key),
        value: Some(std::mem::take(value)),
    });
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        if matches!(c, FIELD_SEP | RECORD_SEP | ESCAPE) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}
