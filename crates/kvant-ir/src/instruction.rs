//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::qubit::{ClbitId, QubitId};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(Gate),
    /// Measurement operation.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
}

/// Classical bits that must all read 1 for an instruction to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassicalCondition {
    bits: Vec<ClbitId>,
}

impl ClassicalCondition {
    /// Create a condition on the given bits.
    pub fn new(bits: impl IntoIterator<Item = ClbitId>) -> Self {
        Self {
            bits: bits.into_iter().collect(),
        }
    }

    /// The bits this condition reads.
    pub fn bits(&self) -> &[ClbitId] {
        &self.bits
    }

    /// Evaluate against a register accessor.
    pub fn is_satisfied(&self, mut read: impl FnMut(ClbitId) -> bool) -> bool {
        self.bits.iter().all(|&bit| read(bit))
    }
}

/// A complete instruction with operands.
///
/// For gates, `qubits` are the targets in matrix-operand order and
/// `controls` the additional control qubits. For measurements, `clbits`
/// holds the destinations; when empty each qubit writes the classical bit
/// with its own index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Control qubits (gates only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<QubitId>,
    /// Classical bits this instruction writes (measure only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clbits: Vec<ClbitId>,
    /// Optional classical condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Instruction {
    fn bare(kind: InstructionKind, qubits: Vec<QubitId>) -> Self {
        Self {
            kind,
            qubits,
            controls: vec![],
            clbits: vec![],
            condition: None,
        }
    }

    /// Create a gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::bare(InstructionKind::Gate(gate.into()), qubits.into_iter().collect())
    }

    /// Create a gate instruction applied only where every control is 1.
    pub fn controlled(
        gate: impl Into<Gate>,
        controls: impl IntoIterator<Item = QubitId>,
        targets: impl IntoIterator<Item = QubitId>,
    ) -> Self {
        let mut inst = Self::gate(gate, targets);
        inst.controls = controls.into_iter().collect();
        inst
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        let mut inst = Self::bare(InstructionKind::Measure, vec![qubit]);
        inst.clbits = vec![clbit];
        inst
    }

    /// Measure qubits into the classical bits with the same indices.
    pub fn measure_qubits(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::bare(InstructionKind::Measure, qubits.into_iter().collect())
    }

    /// Create a multi-qubit measurement instruction.
    ///
    /// Returns an error if the number of qubits and classical bits do not match.
    pub fn measure_many(
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let clbits: Vec<_> = clbits.into_iter().collect();
        if qubits.len() != clbits.len() {
            return Err(IrError::MeasureArityMismatch {
                qubits: qubits.len(),
                clbits: clbits.len(),
            });
        }
        let mut inst = Self::bare(InstructionKind::Measure, qubits);
        inst.clbits = clbits;
        Ok(inst)
    }

    /// Create a reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self::bare(InstructionKind::Reset, vec![qubit])
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::bare(InstructionKind::Barrier, qubits.into_iter().collect())
    }

    /// Only execute when all `bits` read 1.
    #[must_use]
    pub fn with_condition(mut self, bits: impl IntoIterator<Item = ClbitId>) -> Self {
        self.condition = Some(ClassicalCondition::new(bits));
        self
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a reset.
    pub fn is_reset(&self) -> bool {
        matches!(self.kind, InstructionKind::Reset)
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// Get the gate if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Get the name of this instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }

    /// Destination bit of the `i`-th measured qubit.
    pub fn destination(&self, i: usize) -> ClbitId {
        self.clbits
            .get(i)
            .copied()
            .unwrap_or_else(|| ClbitId::from(self.qubits[i]))
    }

    /// Classical bits a measurement writes, with defaults resolved.
    pub fn destinations(&self) -> impl Iterator<Item = ClbitId> + '_ {
        (0..self.qubits.len()).map(|i| self.destination(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert!(inst.is_gate());
        assert_eq!(inst.name(), "h");
        assert_eq!(inst.qubits, vec![QubitId(0)]);
        assert!(inst.controls.is_empty());
        assert!(inst.condition.is_none());
    }

    #[test]
    fn test_controlled_instruction() {
        let inst = Instruction::controlled(StandardGate::X, [QubitId(0), QubitId(1)], [QubitId(2)]);
        assert_eq!(inst.controls, vec![QubitId(0), QubitId(1)]);
        assert_eq!(inst.qubits, vec![QubitId(2)]);
    }

    #[test]
    fn test_measure_default_destination() {
        let inst = Instruction::measure_qubits([QubitId(2), QubitId(0)]);
        assert!(inst.is_measure());
        let dest: Vec<_> = inst.destinations().collect();
        assert_eq!(dest, vec![ClbitId(2), ClbitId(0)]);
    }

    #[test]
    fn test_measure_explicit_destination() {
        let inst = Instruction::measure(QubitId(1), ClbitId(0));
        assert_eq!(inst.destination(0), ClbitId(0));
    }

    #[test]
    fn test_measure_many_arity() {
        assert!(Instruction::measure_many([QubitId(0), QubitId(1)], [ClbitId(0)]).is_err());
        let inst = Instruction::measure_many([QubitId(0)], [ClbitId(3)]).unwrap();
        assert_eq!(inst.clbits, vec![ClbitId(3)]);
    }

    #[test]
    fn test_condition() {
        let inst = Instruction::single_qubit_gate(StandardGate::X, QubitId(0))
            .with_condition([ClbitId(0), ClbitId(1)]);
        let cond = inst.condition.as_ref().unwrap();
        assert!(cond.is_satisfied(|_| true));
        assert!(!cond.is_satisfied(|bit| bit == ClbitId(0)));
    }

    #[test]
    fn test_serde_omits_empty_fields() {
        let inst = Instruction::reset(QubitId(0));
        let json = serde_json::to_string(&inst).unwrap();
        assert!(!json.contains("controls"));
        assert!(!json.contains("condition"));
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }
}
