//! The `key=value&key` codec with percent-style escaping.
//!
//! Decoding is best-effort: any string splits into pairs, so [`Escaped`]
//! never answers "no match" and belongs last in a [`DecodeFirst`] chain.
//!
//! [`DecodeFirst`]: crate::DecodeFirst

use crate::error::CodecError;
use crate::pair::{present, Decoder, Encoder, Pair};

/// How aggressively keys and values are escaped on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeLevel {
    /// Escape only the characters that carry meaning in the format.
    Min,
    /// Escape every reserved character, like the legacy `escape()` function.
    #[default]
    Max,
}

/// Escaped `key=value` pairs joined by `&`.
///
/// Output that would start with a reserved prefix has its first character
/// escaped, so a prefix-gated decoder earlier in the chain never claims it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Escaped {
    level: EscapeLevel,
    reserved: Vec<String>,
}

impl Escaped {
    /// Codec with the given escape level.
    pub fn new(level: EscapeLevel) -> Self {
        Self {
            level,
            reserved: Vec::new(),
        }
    }

    /// Minimal escaping (`%`, `#`, `=`, `&`).
    pub fn min() -> Self {
        Self::new(EscapeLevel::Min)
    }

    /// Legacy full escaping.
    pub fn max() -> Self {
        Self::new(EscapeLevel::Max)
    }

    /// Never start the output with `prefix`. Prefixes starting with `%` are
    /// ignored: escaped output only starts with `%` as part of an escape.
    pub fn reserve_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() && !prefix.starts_with('%') {
            self.reserved.push(prefix);
        }
        self
    }

    /// The escape level used on encode.
    pub fn level(&self) -> EscapeLevel {
        self.level
    }

    fn guard_leading(&self, out: String) -> String {
        if !self.reserved.iter().any(|p| out.starts_with(p.as_str())) {
            return out;
        }
        let mut chars = out.chars();
        let Some(first) = chars.next() else {
            return out;
        };
        let mut guarded = String::with_capacity(out.len() + 6);
        let mut buf = [0u16; 2];
        for &unit in first.encode_utf16(&mut buf).iter() {
            push_unit(&mut guarded, unit);
        }
        guarded.push_str(chars.as_str());
        guarded
    }

    fn escape(&self, s: &str) -> String {
        match self.level {
            EscapeLevel::Min => escape_min(s),
            EscapeLevel::Max => escape_max(s),
        }
    }
}

impl Decoder for Escaped {
    fn decode(&self, input: &str) -> Option<Vec<Pair>> {
        let pairs = input
            .split('&')
            .filter(|token| !token.is_empty())
            .filter_map(|token| {
                let mut parts = token.splitn(2, '=');
                let key = unescape(parts.next().unwrap_or_default());
                if key.is_empty() {
                    return None;
                }
                let value = unescape(parts.next().unwrap_or_default());
                Some(Pair {
                    key,
                    value: Some(value),
                })
            })
            .collect();
        Some(pairs)
    }
}

impl Encoder for Escaped {
    fn encode(&self, pairs: &[Pair]) -> Result<String, CodecError> {
        let parts: Vec<String> = present(pairs)
            .map(|(key, value)| {
                let mut part = self.escape(key);
                if !value.is_empty() {
                    part.push('=');
                    part.push_str(&self.escape(value));
                }
                part
            })
            .collect();
        Ok(self.guard_leading(parts.join("&")))
    }
}

/// Escape `%`, `#`, `=` and `&` as `%XX`.
pub fn escape_min(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' | '#' | '=' | '&' => push_byte(&mut out, c as u16),
            _ => out.push(c),
        }
    }
    out
}

/// Escape like the legacy `escape()`: `A-Z a-z 0-9 @ * _ + - . /` pass
/// through, other UTF-16 units below `0x100` become `%XX`, the rest `%uXXXX`.
pub fn escape_max(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for unit in s.encode_utf16() {
        if unit < 0x80 && is_unreserved(unit as u8) {
            out.push(unit as u8 as char);
        } else {
            push_unit(&mut out, unit);
        }
    }
    out
}

/// Reverse both escape levels. Malformed sequences are kept literally.
pub fn unescape(s: &str) -> String {
    if !s.contains('%') {
        return s.to_string();
    }

    let chars: Vec<char> = s.chars().collect();
    let mut units: Vec<u16> = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' {
            if chars.get(i + 1) == Some(&'u') {
                if let Some(unit) = hex_unit(&chars, i + 2, 4) {
                    units.push(unit);
                    i += 6;
                    continue;
                }
            } else if let Some(unit) = hex_unit(&chars, i + 1, 2) {
                units.push(unit);
                i += 3;
                continue;
            }
        }
        let mut buf = [0u16; 2];
        units.extend_from_slice(chars[i].encode_utf16(&mut buf));
        i += 1;
    }
    String::from_utf16_lossy(&units)
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'@' | b'*' | b'_' | b'+' | b'-' | b'.' | b'/')
}

fn push_byte(out: &mut String, unit: u16) {
    out.push_str(&format!("%{:02X}", unit));
}

fn push_unit(out: &mut String, unit: u16) {
    if unit < 0x100 {
        push_byte(out, unit);
    } else {
        out.push_str(&format!("%u{:04X}", unit));
    }
}

fn hex_unit(chars: &[char], start: usize, len: usize) -> Option<u16> {
    let digits = chars.get(start..start + len)?;
    digits
        .iter()
        .try_fold(0u16, |acc, c| c.to_digit(16).map(|d| acc * 16 + d as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bare_and_valued_keys() {
        let pairs = Escaped::max().decode("a=1&b=true&c").unwrap();
        assert_eq!(
            pairs,
            vec![
                Pair::new("a", "1"),
                Pair::new("b", "true"),
                Pair::new("c", "")
            ]
        );
    }

    #[test]
    fn decode_never_misses() {
        assert_eq!(Escaped::max().decode(""), Some(vec![]));
        assert_eq!(
            Escaped::max().decode("&&=x&k"),
            Some(vec![Pair::new("k", "")])
        );
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let pairs = Escaped::min().decode("k=a=b").unwrap();
        assert_eq!(pairs, vec![Pair::new("k", "a=b")]);
    }

    #[test]
    fn encode_omits_absent_and_bares_empty() {
        let pairs = vec![
            Pair::new("a", "1"),
            Pair::absent("gone"),
            Pair::new("flag", ""),
        ];
        assert_eq!(Escaped::max().encode(&pairs).unwrap(), "a=1&flag");
    }

    #[test]
    fn reserved_prefix_is_never_emitted() {
        let codec = Escaped::min().reserve_prefix("b64:").reserve_prefix("pak:");
        let pairs = vec![Pair::new("b64:QQ", ""), Pair::new("pak:", "1")];
        let text = codec.encode(&pairs).unwrap();
        assert_eq!(text, "%6264:QQ&pak:=1");
        assert_eq!(codec.decode(&text), Some(pairs));

        let plain = vec![Pair::new("key", "b64:")];
        assert_eq!(codec.encode(&plain).unwrap(), "key=b64:");
    }

    #[test]
    fn reserved_prefix_guard_escapes_non_ascii() {
        let codec = Escaped::min().reserve_prefix("€");
        let text = codec.encode(&[Pair::new("€x", "")]).unwrap();
        assert_eq!(text, "%u20ACx");
        assert_eq!(unescape(&text), "€x");
    }

    #[test]
    fn percent_prefixes_are_not_reserved() {
        let codec = Escaped::min().reserve_prefix("%25");
        assert_eq!(codec, Escaped::min());
    }

    #[test]
    fn min_escapes_only_separators() {
        assert_eq!(escape_min("a b#c=d&e%f"), "a b%23c%3Dd%26e%25f");
    }

    #[test]
    fn max_matches_legacy_escape() {
        assert_eq!(escape_max("a b"), "a%20b");
        assert_eq!(escape_max("@*_+-./"), "@*_+-./");
        assert_eq!(escape_max("é"), "%E9");
        assert_eq!(escape_max("€"), "%u20AC");
        assert_eq!(escape_max("😀"), "%uD83D%uDE00");
    }

    #[test]
    fn unescape_reverses_both_forms() {
        assert_eq!(unescape("%E9%u20AC%uD83D%uDE00"), "é€😀");
        assert_eq!(unescape("a%20b"), "a b");
    }

    #[test]
    fn unescape_keeps_malformed_sequences() {
        assert_eq!(unescape("100%"), "100%");
        assert_eq!(unescape("%zz%u12"), "%zz%u12");
    }

    #[test]
    fn reserved_characters_round_trip() {
        let pairs = vec![Pair::new("#k=&", "v&=#%"), Pair::new("x", "%41")];
        for codec in [Escaped::min(), Escaped::max()] {
            let text = codec.encode(&pairs).unwrap();
            assert_eq!(codec.decode(&text), Some(pairs.clone()));
        }
    }
}
