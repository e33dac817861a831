//! Criterion benchmarks for the property decode + render path.
//!
//! Inputs are synthetic buffers shaped like real properties, so the
//! benchmarks run without a display.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xr_common::AtomId;
use xr_core::decode;
use xr_core::format::{DisplayFormat, FormatSpec, ValueFormatter};
use xr_core::registry::{AtomRegistry, NullResolver};

fn cardinals(count: u32) -> Vec<u8> {
    (0..count).flat_map(|v| v.to_ne_bytes()).collect()
}

fn bench_decode(c: &mut Criterion) {
    let spec = FormatSpec::parse("32c").expect("valid format");
    let mut group = c.benchmark_group("decode");

    for count in [1u32, 64, 4096] {
        let bytes = cardinals(count);
        group.bench_with_input(BenchmarkId::new("cardinal32", count), &bytes, |b, input| {
            b.iter(|| {
                let fields = decode(black_box(input), AtomId(6), &spec, 32).expect("decode");
                black_box(fields);
            });
        });
    }

    let text: Vec<u8> = b"xterm\0XTerm\0".repeat(64);
    let strings = FormatSpec::parse("8s").expect("valid format");
    group.bench_function("string8", |b| {
        b.iter(|| {
            let fields = decode(black_box(&text), AtomId(31), &strings, 8).expect("decode");
            black_box(fields);
        });
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let registry = AtomRegistry::with_builtins(&NullResolver).expect("builtins");
    let formatter = ValueFormatter::new(&registry, &NullResolver, 500_000);
    let mut group = c.benchmark_group("render");

    let pid_spec = FormatSpec::parse("32c").expect("valid format");
    let pid_bytes = 4321u32.to_ne_bytes();
    let pid_fields = decode(&pid_bytes, AtomId(6), &pid_spec, 32).expect("decode");
    let default = DisplayFormat::parse(" = $0+\n").expect("valid dformat");
    group.bench_function("pid", |b| {
        b.iter(|| {
            let rendered = default
                .render(black_box(&pid_fields), &pid_spec, &formatter)
                .expect("render");
            black_box(rendered);
        });
    });

    let hex_spec = FormatSpec::parse("32x").expect("valid format");
    let many = cardinals(1024);
    let many_fields = decode(&many, AtomId::NONE, &hex_spec, 32).expect("decode");
    group.bench_function("aggregate_hex_1024", |b| {
        b.iter(|| {
            let rendered = default
                .render(black_box(&many_fields), &hex_spec, &formatter)
                .expect("render");
            black_box(rendered);
        });
    });

    group.bench_function("parse_dformat", |b| {
        b.iter(|| {
            let parsed = DisplayFormat::parse(black_box(": flags $0, decorations $2, extra $3+\n"))
                .expect("valid dformat");
            black_box(parsed);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_render);
criterion_main!(benches);
