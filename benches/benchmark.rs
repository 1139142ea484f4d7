#[macro_use]
extern crate criterion;
extern crate laz10;

use std::io::Cursor;

use criterion::Criterion;

use laz10::decoders::ArithmeticDecoder;
use laz10::las::point10::Point10Decompressor;

fn point10_decode_benchmark(c: &mut Criterion) {
    let seed = [0u8; 20];
    // cycle a decoder over a large all-zero body; decode-only, so there is
    // no encoder available to produce a realistic compressed fixture.
    let body = vec![0u8; 1 << 20];

    c.bench_function("point10_decode", move |b| {
        b.iter(|| {
            let mut decompressor = Point10Decompressor::new();
            let mut decoder = ArithmeticDecoder::new(Cursor::new(body.clone()));
            decompressor.read_first(&mut decoder, &seed).unwrap();
            for _ in 0..1000 {
                decompressor.read(&mut decoder).unwrap();
            }
        })
    });
}

criterion_group!(point10, point10_decode_benchmark);
criterion_main!(point10);
