//! Circuit generators used by the demo binaries.

use std::f64::consts::PI;

use kvant_ir::{Circuit, CircuitProgram, ClbitId, IrError, IrResult, QubitId, StandardGate};

/// Generate a Grover search program for `marked_state` on `n_qubits`.
///
/// The oracle and diffusion step both use a single Z controlled by every
/// other qubit, which the engine applies directly.
pub fn grover(n_qubits: u32, marked_state: u64, iterations: u32) -> IrResult<CircuitProgram> {
    if n_qubits == 0 {
        return Err(IrError::EmptyOperands("grover".to_string()));
    }
    let mut circuit = Circuit::with_size("grover", n_qubits, n_qubits);
    let all: Vec<QubitId> = (0..n_qubits).map(QubitId).collect();

    for &q in &all {
        circuit.h(q)?;
    }

    for _ in 0..iterations {
        // Oracle: flip the phase of the marked state
        flip_zero_bits(&mut circuit, n_qubits, marked_state)?;
        multi_controlled_z(&mut circuit, n_qubits)?;
        flip_zero_bits(&mut circuit, n_qubits, marked_state)?;

        // Diffusion: 2|s⟩⟨s| - I
        for &q in &all {
            circuit.h(q)?.x(q)?;
        }
        multi_controlled_z(&mut circuit, n_qubits)?;
        for &q in &all {
            circuit.x(q)?.h(q)?;
        }
    }

    circuit.measure_all()?;
    circuit.build()
}

/// Optimal Grover iteration count for one marked item among 2^n.
pub fn optimal_iterations(n_qubits: u32) -> u32 {
    let n = f64::from(1u32 << n_qubits);
    ((PI / 4.0 * n.sqrt()).floor() as u32).max(1)
}

/// Probability of reading the marked state after `iterations` steps.
pub fn grover_success_probability(n_qubits: u32, iterations: u32) -> f64 {
    let theta = (1.0 / f64::from(1u32 << n_qubits).sqrt()).asin();
    ((2.0 * f64::from(iterations) + 1.0) * theta).sin().powi(2)
}

fn flip_zero_bits(circuit: &mut Circuit, n_qubits: u32, marked_state: u64) -> IrResult<()> {
    for i in 0..n_qubits {
        if (marked_state >> i) & 1 == 0 {
            circuit.x(QubitId(i))?;
        }
    }
    Ok(())
}

fn multi_controlled_z(circuit: &mut Circuit, n_qubits: u32) -> IrResult<()> {
    let target = QubitId(n_qubits - 1);
    let controls = (0..n_qubits - 1).map(QubitId);
    circuit.controlled(StandardGate::Z, controls, [target])?;
    Ok(())
}

/// Teleport `Ry(theta)|0⟩` from qubit 0 to qubit 2.
///
/// Qubits 0 and 1 are measured into c0 and c1, and the corrections on
/// qubit 2 are conditioned on those bits.
pub fn teleportation(theta: f64) -> IrResult<CircuitProgram> {
    let mut circuit = Circuit::with_size("teleport", 3, 3);
    let (q0, q1, q2) = (QubitId(0), QubitId(1), QubitId(2));

    circuit.ry(theta, q0)?;
    circuit.barrier_all()?;
    circuit.h(q1)?.cx(q1, q2)?;
    circuit.cx(q0, q1)?.h(q0)?;
    circuit.measure(q0, ClbitId(0))?.measure(q1, ClbitId(1))?;
    circuit.gate_if([ClbitId(1)], StandardGate::X, [q2])?;
    circuit.gate_if([ClbitId(0)], StandardGate::Z, [q2])?;
    circuit.build()
}

/// GHZ program on `n` qubits with every qubit measured.
pub fn ghz(n: u32) -> IrResult<CircuitProgram> {
    Circuit::ghz(n)?.build()
}
