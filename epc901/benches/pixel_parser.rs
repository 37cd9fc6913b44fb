use criterion::{criterion_group, criterion_main, Criterion};
use epc901::response::parser::{parse_metadata, parse_pixel_data};
use utilities::{FRAME_EXAMPLE_DATA, FRAME_EXAMPLE_META};

fn bench_decoding_frames(c: &mut Criterion) {
    c.bench_function("pixel line", |b| b.iter(|| parse_pixel_data(&FRAME_EXAMPLE_DATA)));
    c.bench_function("metadata line", |b| b.iter(|| parse_metadata(&FRAME_EXAMPLE_META)));
}

criterion_group!(benches, bench_decoding_frames);
criterion_main!(benches);
