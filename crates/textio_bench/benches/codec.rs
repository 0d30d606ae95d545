//! Text format codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use textio_bench::{nested_value, sample_record};
use textio_codec::{decode, encode, encode_with, to_string, EncodeOptions, Value};

/// Benchmark encoding simple values.
fn bench_encode_simple(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    group.bench_function("null", |b| {
        let value = Value::Null;
        b.iter(|| black_box(encode(black_box(&value)).unwrap()));
    });

    group.bench_function("integer", |b| {
        let value = Value::from(42);
        b.iter(|| black_box(encode(black_box(&value)).unwrap()));
    });

    group.bench_function("float", |b| {
        let value = Value::from(1234.567_8);
        b.iter(|| black_box(encode(black_box(&value)).unwrap()));
    });

    // Every char needs a \u escape
    group.bench_function("string_non_ascii", |b| {
        let value = Value::from("\u{4e16}\u{754c}".repeat(64));
        b.iter(|| black_box(encode(black_box(&value)).unwrap()));
    });

    group.bench_function("record", |b| {
        let value = sample_record(7);
        b.iter(|| black_box(encode(black_box(&value)).unwrap()));
    });

    group.finish();
}

/// Benchmark encoding arrays of records.
fn bench_encode_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_size");

    for count in [16, 128, 1024].iter() {
        let value = Value::Array((0..*count).map(sample_record).collect());
        let len = encode(&value).unwrap().len();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &value, |b, value| {
            b.iter(|| black_box(encode(black_box(value)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark pretty-printed and key-sorted output.
fn bench_encode_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_options");
    let value = Value::Array((0..128).map(sample_record).collect());

    group.bench_function("indent_2", |b| {
        let options = EncodeOptions::new().indent(2);
        b.iter(|| black_box(encode_with(black_box(&value), &options).unwrap()));
    });

    group.bench_function("sort_keys", |b| {
        let options = EncodeOptions::new().sort_keys(true);
        b.iter(|| black_box(encode_with(black_box(&value), &options).unwrap()));
    });

    group.finish();
}

/// Benchmark decoding.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    group.bench_function("record", |b| {
        let text = encode(&sample_record(7)).unwrap();
        b.iter(|| black_box(decode(black_box(&text)).unwrap()));
    });

    for count in [16, 128, 1024].iter() {
        let text = encode(&Value::Array((0..*count).map(sample_record).collect())).unwrap();
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("records", count), &text, |b, text| {
            b.iter(|| black_box(decode(black_box(text)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark roundtrip (encode + decode).
fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");

    group.bench_function("record", |b| {
        let value = sample_record(7);
        b.iter(|| {
            let text = encode(black_box(&value)).unwrap();
            black_box(decode(&text).unwrap());
        });
    });

    group.bench_function("nested_depth4_width4", |b| {
        let value = nested_value(4, 4);
        b.iter(|| {
            let text = encode(black_box(&value)).unwrap();
            black_box(decode(&text).unwrap());
        });
    });

    group.finish();
}

/// Benchmark encoding native types through serde.
fn bench_serialize(c: &mut Criterion) {
    let rows: Vec<(u32, String, bool)> = (0..128).map(|i| (i, format!("row {i}"), i % 3 == 0)).collect();

    c.bench_function("serialize_tuples_128", |b| {
        b.iter(|| black_box(to_string(black_box(&rows)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_encode_simple,
    bench_encode_size,
    bench_encode_options,
    bench_decode,
    bench_roundtrip,
    bench_serialize,
);

criterion_main!(benches);
