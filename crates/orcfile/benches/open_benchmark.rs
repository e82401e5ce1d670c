//! Tail resolution benchmarks on synthetic in-memory files

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use orcfile::{InMemorySource, OrcFile, ReadOptions};

#[path = "../tests/common/mod.rs"]
mod common;

use common::{build, Codec, FileSpec};

fn benchmark_open(c: &mut Criterion) {
    for (name, codec) in [
        ("open_none", Codec::None),
        ("open_zlib", Codec::Zlib),
        ("open_snappy", Codec::Snappy),
    ] {
        let built = build(&FileSpec {
            codec,
            stripes: vec![10_000; 32],
            ..Default::default()
        });
        c.bench_function(name, |b| {
            b.iter(|| {
                let source = InMemorySource::new("bench.orc", built.bytes.clone());
                let file = OrcFile::from_source(black_box(source), &ReadOptions::default())
                    .expect("Failed to open file");
                black_box(file.number_of_rows())
            });
        });
    }
}

fn benchmark_reread_footer(c: &mut Criterion) {
    let built = build(&FileSpec {
        codec: Codec::Zlib,
        padding: 64 * 1024,
        ..Default::default()
    });
    c.bench_function("open_with_footer_reread", |b| {
        b.iter(|| {
            let source = InMemorySource::new("bench.orc", built.bytes.clone());
            let file = OrcFile::from_source(source, &ReadOptions::default()).expect("Failed to open file");
            black_box(file.footer().stripes.len())
        });
    });
}

fn benchmark_stripe_footers(c: &mut Criterion) {
    let built = build(&FileSpec {
        codec: Codec::Zlib,
        stripes: vec![10_000; 32],
        ..Default::default()
    });
    let source = InMemorySource::new("bench.orc", built.bytes);
    let file = OrcFile::from_source(source, &ReadOptions::default()).expect("Failed to open file");

    c.bench_function("read_all_stripe_footers", |b| {
        b.iter(|| {
            let mut streams = 0;
            for stripe in file.stripes() {
                streams += file.stripe_footer(stripe).expect("Failed to read stripe footer").streams.len();
            }
            black_box(streams)
        });
    });
}

criterion_group!(benches, benchmark_open, benchmark_reread_footer, benchmark_stripe_footers);
criterion_main!(benches);
