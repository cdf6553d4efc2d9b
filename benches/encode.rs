extern crate criterion;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lzwgrow::{BitOrder, DictionaryKind, Encoder};

fn text(len: usize) -> Vec<u8> {
    let words: &[&[u8]] = &[b"lorem ", b"ipsum ", b"dolor ", b"sit ", b"amet, ", b"consectetur "];
    let mut state = 7u32;
    let mut data = Vec::with_capacity(len + 16);
    while data.len() < len {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        data.extend_from_slice(words[(state >> 16) as usize % words.len()]);
    }
    data.truncate(len);
    data
}

fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion, name: &str, data: Vec<u8>) {
    let mut group = c.benchmark_group(name);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for &(label, kind) in &[("tree", DictionaryKind::Tree), ("hashed", DictionaryKind::Hashed)] {
        group.bench_with_input(BenchmarkId::new("encode", label), &data, |b, data| {
            let mut encoder = Encoder::with_dictionary(BitOrder::Msb, kind);
            let mut outbuf = Vec::with_capacity(data.len());
            b.iter(|| {
                outbuf.clear();
                let result = encoder.into_stream(&mut outbuf).encode_all(data.as_slice());
                result.status.expect("Error");
                black_box(&outbuf);
            })
        });
    }

    group.finish();
}

pub fn bench_text(c: &mut Criterion) {
    criterion_benchmark(c, "text", text(1 << 20));
}

pub fn bench_noise(c: &mut Criterion) {
    criterion_benchmark(c, "noise", noise(1 << 20));
}

pub fn bench_run(c: &mut Criterion) {
    criterion_benchmark(c, "run", vec![0x41; 1 << 20]);
}

criterion_group!(benches, bench_text, bench_noise, bench_run);
criterion_main!(benches);
