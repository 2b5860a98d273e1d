//! Benchmarks for gate kernels and full runs
//!
//! Run with: cargo bench -p kvant-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kvant_ir::{Circuit, QubitId, StandardGate};
use kvant_sim::{
    AmplitudeVector, GateKernel, KernelPath, QuantumState, SimulationConfig, SimulationRun,
};

/// Benchmark one gate on a large state, per kernel path
fn bench_gate_application(c: &mut Criterion) {
    let mut group = c.benchmark_group("gate_application");
    let n = 18;

    let cases: [(&str, StandardGate, Vec<QubitId>); 3] = [
        ("h_low", StandardGate::H, vec![QubitId(0)]),
        ("cx_spread", StandardGate::CX, vec![QubitId(2), QubitId(15)]),
        ("ccx", StandardGate::CCX, vec![QubitId(1), QubitId(9), QubitId(17)]),
    ];

    for path in [KernelPath::Scalar, KernelPath::Vectorized] {
        let kernel: Box<dyn GateKernel> = path.kernel(1 << 14);
        for (name, gate, targets) in &cases {
            let matrix = gate.matrix();
            let mut state = AmplitudeVector::new(n).unwrap();
            group.bench_with_input(BenchmarkId::new(*name, path), &targets, |b, targets| {
                b.iter(|| {
                    state
                        .apply_unitary(black_box(targets), &[], &matrix, kernel.as_ref())
                        .unwrap();
                });
            });
        }
    }

    group.finish();
}

/// Benchmark seeded multi-shot runs
fn bench_shots(c: &mut Criterion) {
    let mut group = c.benchmark_group("shots");

    for n in &[4u32, 10] {
        let mut circuit = Circuit::qft(*n).unwrap();
        circuit.measure_all().unwrap();
        let program = circuit.build().unwrap();
        let run = SimulationRun::new(SimulationConfig::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("qft_100_shots", n), &program, |b, program| {
            b.iter(|| run.execute(program, 100, Some(7)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_gate_application, bench_shots);
criterion_main!(benches);
