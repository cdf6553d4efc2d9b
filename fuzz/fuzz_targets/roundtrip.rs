#![no_main]
use libfuzzer_sys::fuzz_target;
use lzwgrow::{BitOrder, Decoder, DictionaryKind, Encoder};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut encoder = Encoder::with_dictionary(BitOrder::Msb, DictionaryKind::Tree);
    let mut buffer = Vec::with_capacity(2 * data.len() + 40);
    let result = encoder.into_stream(&mut buffer).encode_all(data);
    assert!(result.status.is_ok(), "{:?}", result.status);

    let hashed = Encoder::with_dictionary(BitOrder::Msb, DictionaryKind::Hashed)
        .encode(data)
        .unwrap();
    assert_eq!(buffer, hashed);

    let mut decoder = Decoder::new(BitOrder::Msb);
    let mut compare = vec![];
    let result = decoder.into_stream(&mut compare).decode_all(buffer.as_slice());
    assert!(result.status.is_ok(), "{:?}", result.status);
    assert_eq!(compare, data);
});
