//! Round-trip properties for every codec and wrapper composition.

use proptest::prelude::*;
use urlhash_codec::{
    decode_first, encode_shortest, AsciiSep, Base64, Decoder, Deflated, Encoder, Escaped, Pair,
    ESCAPE, FIELD_SEP, RECORD_SEP,
};

const POOL: &[char] = &[
    'a', 'b', 'z', 'A', 'Q', '0', '9', ' ', '#', '=', '&', '%', '+', '/', '?', '@', 'u', 'é',
    '€', '😀', FIELD_SEP, RECORD_SEP, ESCAPE,
];

fn text(min: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(POOL.to_vec()), min..8)
        .prop_map(|chars| chars.into_iter().collect())
}

fn pair_lists() -> impl Strategy<Value = Vec<Pair>> {
    prop::collection::vec((text(1), text(0)), 0..6).prop_map(|kvs| {
        kvs.into_iter()
            .map(|(key, value)| Pair::new(key, value))
            .collect()
    })
}

fn round_trip<C: Decoder + Encoder>(codec: &C, pairs: &[Pair]) -> Option<Vec<Pair>> {
    let text = codec.encode(pairs).ok()?;
    codec.decode(&text)
}

proptest! {
    #[test]
    fn escaped_min_round_trips(pairs in pair_lists()) {
        prop_assert_eq!(round_trip(&Escaped::min(), &pairs), Some(pairs));
    }

    #[test]
    fn escaped_max_round_trips(pairs in pair_lists()) {
        prop_assert_eq!(round_trip(&Escaped::max(), &pairs), Some(pairs));
    }

    #[test]
    fn ascii_sep_round_trips(pairs in pair_lists()) {
        prop_assert_eq!(round_trip(&AsciiSep, &pairs), Some(pairs));
    }

    #[test]
    fn base64_round_trips(pairs in pair_lists()) {
        prop_assert_eq!(round_trip(&Base64::new(AsciiSep), &pairs), Some(pairs));
    }

    #[test]
    fn deflated_round_trips(pairs in pair_lists()) {
        prop_assert_eq!(round_trip(&Deflated::new(AsciiSep), &pairs), Some(pairs));
    }

    #[test]
    fn stacked_wrappers_round_trip(pairs in pair_lists()) {
        prop_assert_eq!(round_trip(&Base64::new(Deflated::new(AsciiSep)), &pairs), Some(pairs.clone()));
        prop_assert_eq!(round_trip(&Deflated::new(Base64::new(AsciiSep)), &pairs), Some(pairs));
    }

    #[test]
    fn negotiated_chain_round_trips(pairs in pair_lists()) {
        let decode = decode_first(vec![
            Box::new(Deflated::new(AsciiSep)),
            Box::new(Base64::new(AsciiSep)),
            Box::new(Escaped::max()),
        ]);
        let encode = encode_shortest(vec![
            Box::new(Escaped::max()),
            Box::new(Base64::new(AsciiSep)),
            Box::new(Deflated::new(AsciiSep)),
        ]);
        let text = encode.encode(&pairs).unwrap();
        prop_assert_eq!(decode.decode(&text), Some(pairs));
    }

    #[test]
    fn shortest_is_never_longer_than_any_candidate(pairs in pair_lists()) {
        let candidates: Vec<String> = vec![
            Escaped::min().encode(&pairs).unwrap(),
            Escaped::max().encode(&pairs).unwrap(),
            Base64::new(AsciiSep).encode(&pairs).unwrap(),
        ];
        let best = encode_shortest(vec![
            Box::new(Escaped::min()),
            Box::new(Escaped::max()),
            Box::new(Base64::new(AsciiSep)),
        ])
        .encode(&pairs)
        .unwrap();
        for candidate in candidates.iter().filter(|c| !c.is_empty()) {
            prop_assert!(best.len() <= candidate.len());
        }
    }
}
