//! Combinators composing several codecs into one.

use crate::error::CodecError;
use crate::pair::{Decoder, Encoder, Pair};

/// Tries each decoder in order and returns the first match.
///
/// Put prefix-gated decoders before [`Escaped`](crate::Escaped): it matches
/// everything and shadows whatever follows it.
pub struct DecodeFirst {
    decoders: Vec<Box<dyn Decoder>>,
}

impl DecodeFirst {
    /// Chain `decoders` in the given order.
    pub fn new(decoders: Vec<Box<dyn Decoder>>) -> Self {
        Self { decoders }
    }

    /// Number of decoders in the chain.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl Decoder for DecodeFirst {
    fn decode(&self, input: &str) -> Option<Vec<Pair>> {
        self.decoders.iter().enumerate().find_map(|(i, decoder)| {
            let pairs = decoder.decode(input)?;
            tracing::trace!(decoder = i, pairs = pairs.len(), "decoder matched");
            Some(pairs)
        })
    }
}

impl std::fmt::Debug for DecodeFirst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeFirst")
            .field("decoders", &self.decoders.len())
            .finish()
    }
}

/// Runs every encoder and keeps the shortest non-empty result.
///
/// Length is measured in UTF-8 bytes, not characters, so raw non-ASCII text
/// counts more than its character count. Ties go to the earliest encoder in
/// the list.
pub struct EncodeShortest {
    encoders: Vec<Box<dyn Encoder>>,
}

impl EncodeShortest {
    /// Race `encoders`; list order breaks ties.
    pub fn new(encoders: Vec<Box<dyn Encoder>>) -> Self {
        Self { encoders }
    }

    /// Number of candidate encoders.
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    /// Check if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

impl Encoder for EncodeShortest {
    fn encode(&self, pairs: &[Pair]) -> Result<String, CodecError> {
        let mut best: Option<String> = None;
        let mut failures = Vec::new();

        for (i, encoder) in self.encoders.iter().enumerate() {
            let candidate = match encoder.encode(pairs) {
                Ok(s) if s.is_empty() => continue,
                Ok(s) => s,
                Err(e) => {
                    tracing::trace!(encoder = i, error = %e, "encoder failed");
                    failures.push(e.to_string());
                    continue;
                }
            };
            tracing::trace!(
                encoder = i,
                len = candidate.len(),
                best = best.as_ref().map(String::len),
                "comparing candidate"
            );
            let shorter = match &best {
                Some(b) => candidate.len() < b.len(),
                None => true,
            };
            if shorter {
                best = Some(candidate);
            }
        }

        match best {
            Some(s) => Ok(s),
            None if !failures.is_empty() && failures.len() == self.encoders.len() => {
                Err(CodecError::AllFailed(failures))
            }
            // Nothing to encode: every candidate answered the empty string.
            None => Ok(String::new()),
        }
    }
}

impl std::fmt::Debug for EncodeShortest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodeShortest")
            .field("encoders", &self.encoders.len())
            .finish()
    }
}

/// Shorthand for [`DecodeFirst::new`].
pub fn decode_first(decoders: Vec<Box<dyn Decoder>>) -> DecodeFirst {
    DecodeFirst::new(decoders)
}

/// Shorthand for [`EncodeShortest::new`].
pub fn encode_shortest(encoders: Vec<Box<dyn Encoder>>) -> EncodeShortest {
    EncodeShortest::new(encoders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AsciiSep, Base64, Escaped};

    struct Fixed(&'static str);

    impl Encoder for Fixed {
        fn encode(&self, _pairs: &[Pair]) -> Result<String, CodecError> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl Encoder for Broken {
        fn encode(&self, _pairs: &[Pair]) -> Result<String, CodecError> {
            Err(CodecError::Compression("broken".into()))
        }
    }

    fn boxed(lens: &[usize]) -> Vec<Box<dyn Encoder>> {
        const SRC: &str = "abcdefghijklmnopqrstuvwxyz";
        lens.iter()
            .map(|&n| Box::new(Fixed(&SRC[..n])) as Box<dyn Encoder>)
            .collect()
    }

    #[test]
    fn shortest_wins_regardless_of_order() {
        for lens in [[12, 7, 9], [7, 12, 9], [9, 12, 7]] {
            let out = encode_shortest(boxed(&lens)).encode(&[]).unwrap();
            assert_eq!(out.len(), 7);
        }
    }

    #[test]
    fn ties_go_to_first_encoder() {
        let encoders: Vec<Box<dyn Encoder>> = vec![
            Box::new(Fixed("first")),
            Box::new(Fixed("other")),
            Box::new(Fixed("longest")),
        ];
        assert_eq!(encode_shortest(encoders).encode(&[]).unwrap(), "first");
    }

    #[test]
    fn length_is_counted_in_bytes() {
        // One character, three bytes: ties with "abc", loses to "ab".
        let encoders: Vec<Box<dyn Encoder>> =
            vec![Box::new(Fixed("\u{20AC}")), Box::new(Fixed("abc"))];
        assert_eq!(encode_shortest(encoders).encode(&[]).unwrap(), "\u{20AC}");

        let encoders: Vec<Box<dyn Encoder>> =
            vec![Box::new(Fixed("\u{20AC}")), Box::new(Fixed("ab"))];
        assert_eq!(encode_shortest(encoders).encode(&[]).unwrap(), "ab");
    }

    #[test]
    fn empty_and_failed_results_are_discarded() {
        let encoders: Vec<Box<dyn Encoder>> =
            vec![Box::new(Fixed("")), Box::new(Broken), Box::new(Fixed("abc"))];
        assert_eq!(encode_shortest(encoders).encode(&[]).unwrap(), "abc");
    }

    #[test]
    fn all_failed_is_an_error() {
        let encoders: Vec<Box<dyn Encoder>> = vec![Box::new(Broken), Box::new(Broken)];
        assert!(matches!(
            encode_shortest(encoders).encode(&[]),
            Err(CodecError::AllFailed(v)) if v.len() == 2
        ));
    }

    #[test]
    fn nothing_to_encode_is_empty_string() {
        let encoders: Vec<Box<dyn Encoder>> =
            vec![Box::new(Escaped::max()), Box::new(Base64::new(AsciiSep))];
        assert_eq!(encode_shortest(encoders).encode(&[]).unwrap(), "");
    }

    #[test]
    fn decode_first_falls_through_to_plain() {
        let gated = Base64::new(AsciiSep);
        assert_eq!(gated.decode("a=1"), None);

        let chain = decode_first(vec![Box::new(gated), Box::new(Escaped::max())]);
        assert_eq!(chain.decode("a=1"), Some(vec![Pair::new("a", "1")]));
    }

    #[test]
    fn decode_first_prefers_earlier_match() {
        let wrapped = Base64::new(AsciiSep)
            .encode(&[Pair::new("k", "v")])
            .unwrap();
        let chain = decode_first(vec![
            Box::new(Base64::new(AsciiSep)),
            Box::new(Escaped::max()),
        ]);
        assert_eq!(chain.decode(&wrapped), Some(vec![Pair::new("k", "v")]));
    }

    #[test]
    fn plain_first_shadows_everything_after() {
        let wrapped = Base64::new(AsciiSep)
            .encode(&[Pair::new("k", "v")])
            .unwrap();
        let chain = decode_first(vec![
            Box::new(Escaped::max()),
            Box::new(Base64::new(AsciiSep)),
        ]);
        let pairs = chain.decode(&wrapped).unwrap();
        assert_ne!(pairs, vec![Pair::new("k", "v")]);
    }

    #[test]
    fn empty_chain_never_matches() {
        assert_eq!(decode_first(vec![]).decode("a=1"), None);
        assert!(decode_first(vec![]).is_empty());
    }
}
