//! Throughput benchmarks for the scan operations.
//!
//! Worst-case placements: forward scans find their needle at the very end of
//! the buffer, backward scans at the very beginning, so every benchmark
//! traverses the whole haystack.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

const SIZES: &[usize] = &[17, 64, 256, 1024, 4096, 65536];

/// All-'a' buffer with a single 'X' planted at `pos`.
fn planted(size: usize, pos: usize) -> Vec<u8> {
  let mut buf = vec![b'a'; size];
  buf[pos] = b'X';
  buf
}

fn bench_find_first(c: &mut Criterion) {
  eprintln!("scan backend: {}", bytescan::backend_name());

  let mut group = c.benchmark_group("find_first");
  for &size in SIZES {
    let buf = planted(size, size - 1);
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter(size), &buf, |b, buf| {
      b.iter(|| bytescan::find_first(black_box(buf), black_box(b'X')));
    });
  }
  group.finish();
}

fn bench_find_first_miss(c: &mut Criterion) {
  let mut group = c.benchmark_group("find_first_miss");
  for &size in SIZES {
    let buf = vec![b'a'; size];
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter(size), &buf, |b, buf| {
      b.iter(|| bytescan::find_first(black_box(buf), black_box(b'X')));
    });
  }
  group.finish();
}

fn bench_find_last(c: &mut Criterion) {
  let mut group = c.benchmark_group("find_last");
  for &size in SIZES {
    let buf = planted(size, 0);
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter(size), &buf, |b, buf| {
      b.iter(|| bytescan::find_last(black_box(buf), black_box(b'X')));
    });
  }
  group.finish();
}

fn bench_find_first_any(c: &mut Criterion) {
  let mut group = c.benchmark_group("find_first_any");
  for &size in SIZES {
    let buf = planted(size, size - 1);
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter(size), &buf, |b, buf| {
      b.iter(|| bytescan::find_first_any(black_box(buf), black_box(b"XY")));
    });
  }
  group.finish();
}

fn bench_find_first_not_any(c: &mut Criterion) {
  let mut group = c.benchmark_group("find_first_not_any");
  for &size in SIZES {
    let buf = planted(size, size - 1);
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter(size), &buf, |b, buf| {
      b.iter(|| bytescan::find_first_not_any(black_box(buf), black_box(b"a")));
    });
  }
  group.finish();
}

fn bench_find_first_substring(c: &mut Criterion) {
  let mut group = c.benchmark_group("find_first_substring");
  for &size in SIZES {
    let mut buf = vec![b'a'; size];
    buf[size - 3..].copy_from_slice(b"XYZ");
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter(size), &buf, |b, buf| {
      b.iter(|| bytescan::find_first_substring(black_box(buf), black_box(b"XYZ")));
    });
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_find_first,
  bench_find_first_miss,
  bench_find_last,
  bench_find_first_any,
  bench_find_first_not_any,
  bench_find_first_substring
);
criterion_main!(benches);
