use lzwgrow::{BitOrder, Decoder, DictionaryKind, Encoder, LzwError};
use std::io::BufReader;
use std::{env, fs};

const ORDERS: [BitOrder; 2] = [BitOrder::Lsb, BitOrder::Msb];
const DICTIONARIES: [DictionaryKind; 2] = [DictionaryKind::Tree, DictionaryKind::Hashed];

#[test]
fn roundtrip_all() {
    let file = env::args().next().unwrap();
    dbg!(&file);
    let mut data = fs::read(file).unwrap();
    data.truncate(1 << 21);

    for &dictionary in &DICTIONARIES {
        for &bit_order in &ORDERS {
            for bit_width in [8, 5, 2] {
                let data: Vec<_> = data
                    .iter()
                    .copied()
                    .map(|b| b & ((1u16 << bit_width) - 1) as u8)
                    .collect();

                assert_roundtrips(&data, dictionary, bit_order);
            }
        }
    }
}

#[test]
fn short_inputs() {
    for &bit_order in &ORDERS {
        for data in [
            &b"a"[..],
            &b"ab"[..],
            &b"aa"[..],
            &b"aaa"[..],
            &b"abab"[..],
            &b"TOBEORNOTTOBEORTOBEORNOT"[..],
        ] {
            assert_roundtrips(data, DictionaryKind::Tree, bit_order);
        }
    }
}

#[test]
fn empty_input() {
    for &bit_order in &ORDERS {
        let mut encoder = Encoder::new(bit_order);
        let mut buffer = vec![];
        let result = encoder.into_stream(&mut buffer).encode_all(&b""[..]);
        assert!(matches!(result.status, Err(LzwError::EmptyInput)));
        assert!(buffer.is_empty());
    }
}

#[test]
fn streaming_reads() {
    let data: Vec<u8> = (0..100_000u64).map(|i| (i * i / 7 % 251) as u8).collect();
    let whole = Encoder::new(BitOrder::Msb).encode(&data).unwrap();

    let mut streamed = vec![];
    let reader = BufReader::with_capacity(3, data.as_slice());
    let result = Encoder::new(BitOrder::Msb)
        .into_stream(&mut streamed)
        .encode_all(reader);
    result.status.unwrap();
    assert_eq!(result.bytes_read, data.len());
    assert_eq!(result.bytes_written, streamed.len());
    assert!(whole == streamed);
}

#[test]
fn encode_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    let output = dir.path().join("output.lzw");
    let data = b"She sells sea shells by the sea shore. ".repeat(200);
    fs::write(&input, &data).unwrap();

    let result = Encoder::new(BitOrder::Lsb).encode_file(&input, Some(output.as_path()));
    result.status.unwrap();
    assert_eq!(result.bytes_read, data.len());

    let encoded = fs::read(&output).unwrap();
    assert_eq!(encoded.len(), result.bytes_written);
    assert!(encoded.len() < data.len() / 4);
    assert!(Decoder::new(BitOrder::Lsb).decode(&encoded).unwrap() == data);
}

#[test]
fn encode_file_failures() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let output = dir.path().join("output.lzw");

    let result = Encoder::new(BitOrder::Msb).encode_file(&missing, Some(output.as_path()));
    match result.status {
        Err(LzwError::Open { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected {:?}", other),
    }

    let empty = dir.path().join("empty");
    fs::write(&empty, b"").unwrap();
    let result = Encoder::new(BitOrder::Msb).encode_file(&empty, Some(output.as_path()));
    assert!(matches!(result.status, Err(LzwError::EmptyInput)));
    assert!(fs::read(&output).unwrap().is_empty());

    let unwritable = dir.path().join("no-such-dir").join("output.lzw");
    let result = Encoder::new(BitOrder::Msb).encode_file(&empty, Some(unwritable.as_path()));
    assert!(matches!(result.status, Err(LzwError::Open { .. })));
}

fn assert_roundtrips(data: &[u8], dictionary: DictionaryKind, bit_order: BitOrder) {
    eprintln!("Roundtrip test {:?} {:?} {}", dictionary, bit_order, data.len());
    let mut encoder = Encoder::with_dictionary(bit_order, dictionary);
    let mut buffer = Vec::with_capacity(2 * data.len() + 40);
    let result = encoder.into_stream(&mut buffer).encode_all(data);
    assert!(result.status.is_ok(), "{:?}", result.status);

    let mut decoder = Decoder::new(bit_order);
    let mut compare = vec![];
    let result = decoder
        .into_stream(&mut compare)
        .decode_all(buffer.as_slice());
    assert!(result.status.is_ok(), "{:?}, {:?}", bit_order, result.status);
    assert!(data == &*compare, "{:?} {:?}", dictionary, bit_order);
}
