//! Inputs large enough to exhaust all codes.
use lzwgrow::{BitOrder, Decoder, DictionaryKind, Encoder, MAX_CODES};

/// Uniform bytes, which give LZW about one new string per two input bytes.
fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x853c_49e6_748f_ea9bu64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 32) as u8
        })
        .collect()
}

#[test]
fn full_dictionary_roundtrips() {
    // Well beyond the input needed to assign every code.
    let data = noise(MAX_CODES as usize * 4);

    let tree = Encoder::with_dictionary(BitOrder::Msb, DictionaryKind::Tree)
        .encode(&data)
        .unwrap();
    let hashed = Encoder::with_dictionary(BitOrder::Msb, DictionaryKind::Hashed)
        .encode(&data)
        .unwrap();
    assert!(tree == hashed);

    let decoded = Decoder::new(BitOrder::Msb).decode(&tree).unwrap();
    assert!(decoded == data);
}

#[test]
fn frozen_dictionary_keeps_matching() {
    // First fill the dictionary with noise, then repeat a phrase learned early on.
    let mut data = noise(MAX_CODES as usize * 4);
    let phrase = data[..64].to_vec();
    let before = data.len();
    for _ in 0..10_000 {
        data.extend_from_slice(&phrase);
    }

    let encoded = Encoder::with_dictionary(BitOrder::Lsb, DictionaryKind::Hashed)
        .encode(&data)
        .unwrap();
    let prefix = Encoder::with_dictionary(BitOrder::Lsb, DictionaryKind::Hashed)
        .encode(&data[..before])
        .unwrap();
    // Literals alone would take one 20 bit word per byte. Existing pairs still match, so the
    // repetitions need clearly fewer words than bytes.
    let tail = encoded.len() - prefix.len();
    assert!(tail < (data.len() - before) * 2);

    let decoded = Decoder::new(BitOrder::Lsb).decode(&encoded).unwrap();
    assert!(decoded == data);
}
