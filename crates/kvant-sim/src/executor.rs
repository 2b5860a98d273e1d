//! Single-shot execution of a circuit program.

use std::borrow::Cow;

use kvant_ir::{CircuitProgram, ClbitId, Instruction, InstructionKind, UnitaryMatrix};
use tracing::trace;

use crate::error::{SimError, SimResult};
use crate::kernel::GateKernel;
use crate::measurement::{measure, reset_qubit};
use crate::random::RandomSource;
use crate::result::BitOrder;
use crate::state::QuantumState;

/// Classical measurement register for one shot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ClassicalRegister {
    bits: Vec<bool>,
}

impl ClassicalRegister {
    /// `num_clbits` bits, all 0.
    pub fn new(num_clbits: u32) -> Self {
        Self {
            bits: vec![false; num_clbits as usize],
        }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the register has no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Value of `bit`, if in range.
    pub fn get(&self, bit: ClbitId) -> Option<bool> {
        self.bits.get(bit.index()).copied()
    }

    /// Write `bit`.
    pub fn set(&mut self, bit: ClbitId, value: bool) -> SimResult<()> {
        let len = self.bits.len();
        let slot = self.bits.get_mut(bit.index()).ok_or_else(|| {
            SimError::Execution(format!("classical bit {bit} out of range for {len} bits"))
        })?;
        *slot = value;
        Ok(())
    }

    /// All bits, index 0 first.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Render as a bitstring.
    pub fn to_bitstring(&self, order: BitOrder) -> String {
        order.format_bits(&self.bits)
    }
}

/// Runs a program once against a state.
///
/// Gate matrices are resolved once at construction and reused for every
/// shot.
#[derive(Debug)]
pub struct ShotExecutor<'p> {
    program: &'p CircuitProgram,
    kernel: &'p dyn GateKernel,
    /// Per subcircuit, the matrix of each gate instruction.
    matrices: Vec<Vec<Option<Cow<'p, UnitaryMatrix>>>>,
}

impl<'p> ShotExecutor<'p> {
    /// Prepare `program` for execution with `kernel`.
    pub fn new(program: &'p CircuitProgram, kernel: &'p dyn GateKernel) -> Self {
        let matrices = program
            .subcircuits()
            .iter()
            .map(|sub| {
                sub.instructions
                    .iter()
                    .map(|inst| inst.as_gate().map(|g| g.matrix()))
                    .collect()
            })
            .collect();
        Self {
            program,
            kernel,
            matrices,
        }
    }

    /// The program being executed.
    pub fn program(&self) -> &CircuitProgram {
        self.program
    }

    /// Reset `state`, execute every instruction in order and return the
    /// classical register.
    ///
    /// Consumes one draw from `rng` per measured or reset qubit, in program
    /// order.
    pub fn run_once<S, R>(&self, state: &mut S, rng: &mut R) -> SimResult<ClassicalRegister>
    where
        S: QuantumState + ?Sized,
        R: RandomSource + ?Sized,
    {
        if state.num_qubits() < self.program.num_qubits() {
            return Err(SimError::Execution(format!(
                "program needs {} qubits but the state has {}",
                self.program.num_qubits(),
                state.num_qubits()
            )));
        }

        state.reset();
        let mut creg = ClassicalRegister::new(self.program.num_clbits());

        for (sub, matrices) in self.program.subcircuits().iter().zip(&self.matrices) {
            for _ in 0..sub.iterations {
                for (inst, matrix) in sub.instructions.iter().zip(matrices) {
                    self.step(inst, matrix.as_deref(), state, rng, &mut creg)?;
                }
            }
        }

        Ok(creg)
    }

    fn step<S, R>(
        &self,
        inst: &Instruction,
        matrix: Option<&UnitaryMatrix>,
        state: &mut S,
        rng: &mut R,
        creg: &mut ClassicalRegister,
    ) -> SimResult<()>
    where
        S: QuantumState + ?Sized,
        R: RandomSource + ?Sized,
    {
        if let Some(cond) = &inst.condition {
            if let Some(&bad) = cond.bits().iter().find(|&&b| creg.get(b).is_none()) {
                return Err(SimError::Execution(format!(
                    "condition reads classical bit {bad} out of range for {} bits",
                    creg.len()
                )));
            }
            if !cond.is_satisfied(|b| creg.get(b).unwrap_or(false)) {
                trace!(instruction = inst.name(), "condition not met, skipped");
                return Ok(());
            }
        }

        trace!(instruction = inst.name(), qubits = ?inst.qubits, controls = ?inst.controls, "executing");

        match &inst.kind {
            InstructionKind::Gate(gate) => {
                let matrix = matrix.ok_or_else(|| {
                    SimError::Execution(format!("no matrix resolved for gate {}", gate.name()))
                })?;
                state.apply_unitary(&inst.qubits, &inst.controls, matrix, self.kernel)?;
            }
            InstructionKind::Measure => {
                for (i, &qubit) in inst.qubits.iter().enumerate() {
                    let outcome = measure(state, qubit, rng)?;
                    creg.set(inst.destination(i), outcome)?;
                }
            }
            InstructionKind::Reset => {
                for &qubit in &inst.qubits {
                    reset_qubit(state, qubit, rng, self.kernel)?;
                }
            }
            InstructionKind::Barrier => {}
        }
        Ok(())
    }
}
