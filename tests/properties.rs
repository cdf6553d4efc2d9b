use lzwgrow::{BitOrder, Decoder, DictionaryKind, Encoder, FIRST_CODE, MAX_CODESIZE};
use proptest::prelude::*;

/// Split an MSB-first stream into `(code, width)` words, following the escapes.
fn words(encoded: &[u8]) -> Vec<(u32, u8)> {
    let total = encoded.len() * 8;
    let bit = |idx: usize| (encoded[idx / 8] >> (7 - idx % 8)) & 1;

    let mut words = vec![];
    let mut width = 9u8;
    let mut pos = 0;
    while pos + usize::from(width) <= total {
        let end = pos + usize::from(width);
        let code = (pos..end).fold(0u32, |acc, idx| acc << 1 | u32::from(bit(idx)));
        pos = end;
        words.push((code, width));
        if code == (1 << width) - 1 && width < MAX_CODESIZE {
            width += 1;
        }
    }
    words
}

fn data_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 1..2048),
        prop::collection::vec(0u8..3, 1..8192),
        (any::<u8>(), 1usize..20_000).prop_map(|(byte, len)| vec![byte; len]),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip(data in data_strategy()) {
        for &order in &[BitOrder::Msb, BitOrder::Lsb] {
            let encoded = Encoder::new(order).encode(&data).unwrap();
            let decoded = Decoder::new(order).decode(&encoded).unwrap();
            prop_assert!(decoded == data);
        }
    }

    #[test]
    fn prop_dictionaries_agree(data in data_strategy()) {
        let tree = Encoder::with_dictionary(BitOrder::Msb, DictionaryKind::Tree)
            .encode(&data)
            .unwrap();
        let hashed = Encoder::with_dictionary(BitOrder::Msb, DictionaryKind::Hashed)
            .encode(&data)
            .unwrap();
        prop_assert_eq!(tree, hashed);
    }

    #[test]
    fn prop_width_protocol(data in data_strategy()) {
        let encoded = Encoder::new(BitOrder::Msb).encode(&data).unwrap();
        let words = words(&encoded);
        prop_assert!(!words.is_empty());

        let bits: usize = words.iter().map(|&(_, width)| usize::from(width)).sum();
        prop_assert_eq!(encoded.len(), (bits + 7) / 8);

        let mut next_code = FIRST_CODE - 1;
        for pair in words.windows(2) {
            let ((_, width), (_, next_width)) = (pair[0], pair[1]);
            prop_assert!(next_width == width || next_width == width + 1);
        }

        for &(code, width) in &words {
            let escape = (1 << width) - 1;
            if code == escape && width < MAX_CODESIZE {
                continue;
            }
            prop_assert!(width == MAX_CODESIZE || code < escape);
            // At most the code that the decoder is about to define.
            prop_assert!(code <= next_code, "{} > {}", code, next_code);
            next_code += 1;
        }
    }
}

#[test]
fn single_byte_is_one_word() {
    let encoded = Encoder::new(BitOrder::Msb).encode(&[0x5a]).unwrap();
    assert_eq!(words(&encoded), [(90, 9)]);
}

#[test]
fn repeated_bytes_trace() {
    let encoded = Encoder::new(BitOrder::Msb).encode(b"AAAA").unwrap();
    assert_eq!(words(&encoded), [(65, 9), (256, 9), (65, 9)]);
}
