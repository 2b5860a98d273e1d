//! High-level circuit builder API.

use crate::error::IrResult;
use crate::gate::{Gate, StandardGate};
use crate::instruction::Instruction;
use crate::program::{validate_instruction, CircuitProgram, Subcircuit, DEFAULT_SUBCIRCUIT};
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit under construction.
///
/// This provides a high-level API for building quantum circuits,
/// with convenient methods for common gates and operations. Each call
/// validates its operands against the current register sizes, so a
/// builder never holds an instruction that [`Circuit::build`] would reject.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Number of classical bits.
    num_clbits: u32,
    /// Closed subcircuits.
    finished: Vec<Subcircuit>,
    /// Subcircuit receiving new instructions.
    current: Subcircuit,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_size(name, 0, 0)
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            finished: vec![],
            current: Subcircuit::new(DEFAULT_SUBCIRCUIT, 1, vec![]),
        }
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.num_qubits);
        self.num_qubits += 1;
        id
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.num_clbits);
        self.num_clbits += 1;
        id
    }

    /// Close the current subcircuit and start a new one that runs
    /// `iterations` times.
    ///
    /// An empty default subcircuit is dropped rather than kept as a block.
    pub fn subcircuit(&mut self, name: impl Into<String>, iterations: u64) -> &mut Self {
        let next = Subcircuit::new(name, iterations, vec![]);
        let done = std::mem::replace(&mut self.current, next);
        if !(done.name == DEFAULT_SUBCIRCUIT && done.instructions.is_empty() && self.finished.is_empty()) {
            self.finished.push(done);
        }
        self
    }

    /// Append an instruction after validating it.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        validate_instruction(&instruction, self.num_qubits, self.num_clbits)?;
        self.current.instructions.push(instruction);
        Ok(self)
    }

    fn one(&mut self, gate: StandardGate, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(gate, qubit))
    }

    fn two(&mut self, gate: StandardGate, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(gate, q1, q2))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::I, qubit)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::H, qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::X, qubit)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Y, qubit)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Z, qubit)
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::S, qubit)
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Sdg, qubit)
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::T, qubit)
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Tdg, qubit)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::SX, qubit)
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::SXdg, qubit)
    }

    /// Apply RX(π/2).
    pub fn x90(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::X90, qubit)
    }

    /// Apply RX(-π/2).
    pub fn mx90(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::MX90, qubit)
    }

    /// Apply RY(π/2).
    pub fn y90(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Y90, qubit)
    }

    /// Apply RY(-π/2).
    pub fn my90(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::MY90, qubit)
    }

    /// Apply RX rotation.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Rx(theta), qubit)
    }

    /// Apply RY rotation.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Ry(theta), qubit)
    }

    /// Apply RZ rotation.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::Rz(theta), qubit)
    }

    /// Apply phase gate.
    pub fn p(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::P(lambda), qubit)
    }

    /// Apply U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.one(StandardGate::U(theta, phi, lambda), qubit)
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CX, control, target)
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CY, control, target)
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CZ, control, target)
    }

    /// Apply CH gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CH, control, target)
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::Swap, q1, q2)
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::ISwap, q1, q2)
    }

    /// Apply controlled phase gate.
    pub fn cp(&mut self, lambda: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CP(lambda), control, target)
    }

    /// Apply controlled phase by 2π/2^k.
    pub fn crk(&mut self, k: u32, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.two(StandardGate::CRk(k), control, target)
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(StandardGate::CSwap, [control, t1, t2]))
    }

    // =========================================================================
    // Generic and non-unitary operations
    // =========================================================================

    /// Apply any gate to the given targets.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))
    }

    /// Apply a gate only where every control qubit is 1.
    pub fn controlled(
        &mut self,
        gate: impl Into<Gate>,
        controls: impl IntoIterator<Item = QubitId>,
        targets: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::controlled(gate, controls, targets))
    }

    /// Apply a gate only in shots where every listed classical bit is 1.
    pub fn gate_if(
        &mut self,
        bits: impl IntoIterator<Item = ClbitId>,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits).with_condition(bits))
    }

    /// Add a measurement.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure every qubit into the classical bit with the same index.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        while self.num_clbits < self.num_qubits {
            self.add_clbit();
        }
        self.apply(Instruction::measure_qubits(qubits))
    }

    /// Add a reset operation.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))
    }

    /// Add a barrier.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))
    }

    /// Add a barrier on all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        self.barrier(qubits)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Number of instructions added so far, not counting repetitions.
    pub fn num_instructions(&self) -> usize {
        self.finished
            .iter()
            .chain(std::iter::once(&self.current))
            .map(|sub| sub.instructions.len())
            .sum()
    }

    /// Freeze the circuit into an immutable program.
    pub fn build(&self) -> IrResult<CircuitProgram> {
        let mut subcircuits = self.finished.clone();
        if !self.current.instructions.is_empty() || subcircuits.is_empty() {
            subcircuits.push(self.current.clone());
        }
        CircuitProgram::from_subcircuits(
            self.name.clone(),
            self.num_qubits,
            self.num_clbits,
            subcircuits,
        )
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        let q0 = QubitId(0);
        let q1 = QubitId(1);

        circuit
            .h(q0)?
            .cx(q0, q1)?
            .measure(q0, ClbitId(0))?
            .measure(q1, ClbitId(1))?;

        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("ghz_0"));
        }

        let mut circuit = Self::with_size("ghz", n, n);
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        circuit.measure_all()?;

        Ok(circuit)
    }

    /// Create a QFT circuit (without measurements).
    pub fn qft(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("qft_0"));
        }

        let mut circuit = Self::with_size("qft", n, n);

        for i in 0..n {
            circuit.h(QubitId(i))?;
            for j in (i + 1)..n {
                // phase π/2^(j-i)
                circuit.crk(j - i + 1, QubitId(j), QubitId(i))?;
            }
        }

        // Swap qubits for bit reversal
        for i in 0..n / 2 {
            circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
        }

        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IrError;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
    }

    #[test]
    fn test_add_bits() {
        let mut circuit = Circuit::new("test");
        assert_eq!(circuit.add_qubit(), QubitId(0));
        assert_eq!(circuit.add_qubit(), QubitId(1));
        assert_eq!(circuit.add_clbit(), ClbitId(0));
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 1);
    }

    #[test]
    fn test_bell_state() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_instructions(), 4);
        let program = circuit.build().unwrap();
        assert_eq!(program.len(), 4);
    }

    #[test]
    fn test_ghz_state() {
        let circuit = Circuit::ghz(5).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.num_clbits(), 5);
        // H, 4 CX, one measure over all qubits
        assert_eq!(circuit.num_instructions(), 6);
    }

    #[test]
    fn test_qft_angles() {
        let program = Circuit::qft(3).unwrap().build().unwrap();
        let first_crk = program
            .instructions()
            .find_map(|inst| match inst.as_gate() {
                Some(Gate::Standard(StandardGate::CRk(k))) => Some(*k),
                _ => None,
            })
            .unwrap();
        // neighbouring qubits get a π/2 phase
        assert_eq!(first_crk, 2);
        assert!(StandardGate::CRk(2)
            .matrix()
            .approx_eq(&StandardGate::CP(PI / 2.0).matrix(), 1e-12));
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();

        assert_eq!(circuit.num_instructions(), 4);
    }

    #[test]
    fn test_rejects_out_of_range_immediately() {
        let mut circuit = Circuit::with_size("test", 1, 1);
        let err = circuit.x(QubitId(1)).unwrap_err();
        assert!(matches!(err, IrError::QubitOutOfRange { .. }));
        assert_eq!(circuit.num_instructions(), 0);
    }

    #[test]
    fn test_subcircuits() {
        let mut circuit = Circuit::with_size("loops", 1, 1);
        circuit.subcircuit("init", 1).x(QubitId(0)).unwrap();
        circuit.subcircuit("body", 4).h(QubitId(0)).unwrap();
        let program = circuit.build().unwrap();

        let names: Vec<_> = program.subcircuits().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["init", "body"]);
        assert_eq!(program.len(), 5);
    }

    #[test]
    fn test_conditional_gate() {
        let mut circuit = Circuit::with_size("cond", 2, 2);
        circuit
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .gate_if([ClbitId(0)], StandardGate::X, [QubitId(1)])
            .unwrap();
        let program = circuit.build().unwrap();
        let last = program.instructions().last().unwrap();
        assert!(last.condition.is_some());
    }

    #[test]
    fn test_measure_all_grows_clbits() {
        let mut circuit = Circuit::with_size("m", 3, 0);
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 3);
    }
}
