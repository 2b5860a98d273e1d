//! Benchmarks for building and validating programs
//!
//! Run with: cargo bench -p kvant-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kvant_ir::{Circuit, QubitId, StandardGate};

/// Benchmark appending validated gates
fn bench_gate_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_addition");

    group.bench_function("h_gate", |b| {
        let mut circuit = Circuit::with_size("bench", 10, 0);
        b.iter(|| {
            circuit.h(black_box(QubitId(0))).unwrap();
        });
    });

    group.bench_function("ccx_gate", |b| {
        let mut circuit = Circuit::with_size("bench", 10, 0);
        b.iter(|| {
            circuit
                .ccx(black_box(QubitId(0)), black_box(QubitId(1)), black_box(QubitId(2)))
                .unwrap();
        });
    });

    group.finish();
}

/// Benchmark freezing a builder into a program
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for n in &[5u32, 10, 20] {
        let circuit = Circuit::qft(*n).unwrap();
        group.bench_with_input(BenchmarkId::new("qft", n), &circuit, |b, circuit| {
            b.iter(|| circuit.build().unwrap());
        });
    }

    group.finish();
}

/// Benchmark standard matrix construction
fn bench_matrices(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix");

    group.bench_function("u3", |b| {
        b.iter(|| StandardGate::U(black_box(0.1), black_box(0.2), black_box(0.3)).matrix());
    });
    group.bench_function("cswap", |b| b.iter(|| black_box(StandardGate::CSwap).matrix()));

    group.finish();
}

criterion_group!(benches, bench_gate_addition, bench_build, bench_matrices);
criterion_main!(benches);
