//! Buffered and text stream benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;
use textio_bench::{sample_data, sample_lines, sample_record};
use textio_core::{
    dump_to, load_from, open_with, BufferedStream, ModeSpec, StreamConfig, StreamHandle,
    TextCursor, TextStream, Whence,
};
use textio_storage::{InMemoryStream, RawStream};

fn memory_binary(mode: &str, data: Vec<u8>, config: &StreamConfig) -> BufferedStream {
    let mode = ModeSpec::parse(mode).unwrap();
    let raw: Box<dyn RawStream> = Box::new(InMemoryStream::with_data(data));
    StreamHandle::from_raw(raw, mode, config)
        .unwrap()
        .into_binary()
        .unwrap()
}

fn memory_text(mode: &str, data: &str) -> TextStream {
    let mode = ModeSpec::parse(mode).unwrap();
    let raw: Box<dyn RawStream> = Box::new(InMemoryStream::with_data(data.as_bytes().to_vec()));
    StreamHandle::from_raw(raw, mode, &StreamConfig::default())
        .unwrap()
        .into_text()
        .unwrap()
}

/// Benchmark small writes with different buffer sizes.
fn bench_buffered_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_write");
    let chunk = sample_data(64);
    let chunks = 1024;
    group.throughput(Throughput::Bytes((chunk.len() * chunks) as u64));

    for buffer_size in [1, 512, 8192].iter() {
        let config = StreamConfig::new().buffer_size(*buffer_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut stream = memory_binary("wb", Vec::new(), config);
                    for _ in 0..chunks {
                        stream.write(black_box(&chunk)).unwrap();
                    }
                    stream.flush().unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark sequential reads of a fixed amount.
fn bench_buffered_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_read");

    for size in [4096, 65536, 1 << 20].iter() {
        let data = sample_data(*size);
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            let mut stream = memory_binary("rb", data.clone(), &StreamConfig::default());
            b.iter(|| {
                stream.seek(0, Whence::Start).unwrap();
                while !stream.read(black_box(256)).unwrap().is_empty() {}
            });
        });
    }

    group.finish();
}

/// Benchmark random seeks followed by short reads.
fn bench_seek_read(c: &mut Criterion) {
    let size = 1 << 20;
    let mut stream = memory_binary("rb", sample_data(size), &StreamConfig::default());
    let offsets: Vec<i64> = (0..256).map(|i| (i * 7919 % size) as i64).collect();

    c.bench_function("seek_read_256", |b| {
        b.iter(|| {
            for offset in &offsets {
                stream.seek(*offset, Whence::Start).unwrap();
                black_box(stream.read(16).unwrap());
            }
        });
    });
}

/// Benchmark line iteration over text handles.
fn bench_text_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_lines");

    for count in [100, 1000, 10000].iter() {
        let text: String = sample_lines(*count).concat();
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            let mut stream = memory_text("r", text);
            b.iter(|| {
                stream.seek(TextCursor::BEGINNING).unwrap();
                let mut n = 0;
                for line in stream.lines() {
                    black_box(line.unwrap());
                    n += 1;
                }
                assert_eq!(n, *count);
            });
        });
    }

    group.finish();
}

/// Benchmark text writes through the encoder.
fn bench_text_write(c: &mut Criterion) {
    let lines = sample_lines(1000);
    let bytes: usize = lines.iter().map(String::len).sum();
    let mut group = c.benchmark_group("text_write");
    group.throughput(Throughput::Bytes(bytes as u64));

    group.bench_function("lines_1000", |b| {
        b.iter(|| {
            let mut stream = memory_text("w", "");
            stream.write_lines(black_box(&lines)).unwrap();
            stream.flush().unwrap();
        });
    });

    group.finish();
}

/// Benchmark dumping and loading a value through a file.
fn bench_file_dump_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_dump_load");
    // File operations are slower
    group.sample_size(20);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.json");
    let config = StreamConfig::default();
    let value = textio_codec::Value::Array((0..256).map(sample_record).collect());

    group.bench_function("dump_256", |b| {
        b.iter(|| {
            let mut text = open_with(&path, "w", &config).unwrap().into_text().unwrap();
            dump_to(&mut text, black_box(&value)).unwrap();
            text.close().unwrap();
        });
    });

    group.bench_function("load_256", |b| {
        b.iter(|| {
            let mut text = open_with(&path, "r", &config).unwrap().into_text().unwrap();
            black_box(load_from(&mut text).unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_buffered_write,
    bench_buffered_read,
    bench_seek_read,
    bench_text_lines,
    bench_text_write,
    bench_file_dump_load,
);

criterion_main!(benches);
