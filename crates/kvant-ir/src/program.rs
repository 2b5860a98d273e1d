//! Validated, immutable circuit programs.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Maximum number of target qubits a gate may act on.
pub const MAX_GATE_TARGETS: usize = 3;

/// Name given to the implicit subcircuit of a plain program.
pub const DEFAULT_SUBCIRCUIT: &str = "default";

/// A named block of instructions executed `iterations` times in a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcircuit {
    /// Block name.
    pub name: String,
    /// How many times the block runs, at least 1.
    pub iterations: u64,
    /// Body of the block.
    pub instructions: Vec<Instruction>,
}

impl Subcircuit {
    /// Create a subcircuit.
    pub fn new(name: impl Into<String>, iterations: u64, instructions: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            iterations,
            instructions,
        }
    }
}

/// A normalized instruction sequence over a fixed register size.
///
/// Every index has been checked against `num_qubits`/`num_clbits` when the
/// program was built, so consumers may address the state without further
/// bounds checks. Programs are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProgramData")]
pub struct CircuitProgram {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    subcircuits: Vec<Subcircuit>,
}

/// Unvalidated wire form.
#[derive(Deserialize)]
struct ProgramData {
    #[serde(default)]
    name: String,
    num_qubits: u32,
    #[serde(default)]
    num_clbits: Option<u32>,
    subcircuits: Vec<Subcircuit>,
}

impl TryFrom<ProgramData> for CircuitProgram {
    type Error = IrError;

    fn try_from(data: ProgramData) -> IrResult<Self> {
        CircuitProgram::from_subcircuits(
            data.name,
            data.num_qubits,
            data.num_clbits.unwrap_or(data.num_qubits),
            data.subcircuits,
        )
    }
}

impl CircuitProgram {
    /// Build a single-subcircuit program.
    pub fn new(
        name: impl Into<String>,
        num_qubits: u32,
        num_clbits: u32,
        instructions: Vec<Instruction>,
    ) -> IrResult<Self> {
        Self::from_subcircuits(
            name,
            num_qubits,
            num_clbits,
            vec![Subcircuit::new(DEFAULT_SUBCIRCUIT, 1, instructions)],
        )
    }

    /// Build a program from subcircuits, validating every instruction.
    pub fn from_subcircuits(
        name: impl Into<String>,
        num_qubits: u32,
        num_clbits: u32,
        subcircuits: Vec<Subcircuit>,
    ) -> IrResult<Self> {
        for sub in &subcircuits {
            if sub.iterations == 0 {
                return Err(IrError::InvalidIterations {
                    name: sub.name.clone(),
                    iterations: sub.iterations,
                });
            }
            for inst in &sub.instructions {
                validate_instruction(inst, num_qubits, num_clbits)?;
            }
        }
        Ok(Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            subcircuits,
        })
    }

    /// An empty program over `num_qubits` qubits.
    pub fn empty(num_qubits: u32) -> Self {
        Self {
            name: String::new(),
            num_qubits,
            num_clbits: num_qubits,
            subcircuits: vec![],
        }
    }

    /// Decode and validate a program from JSON.
    pub fn from_json(json: &str) -> IrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the program as JSON.
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits in the register.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of classical bits in the measurement register.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Subcircuits in declaration order.
    pub fn subcircuits(&self) -> &[Subcircuit] {
        &self.subcircuits
    }

    /// Instructions in execution order, iterations unrolled.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.subcircuits.iter().flat_map(|sub| {
            (0..sub.iterations).flat_map(move |_| sub.instructions.iter())
        })
    }

    /// Number of instructions executed per shot.
    pub fn len(&self) -> u64 {
        self.subcircuits
            .iter()
            .map(|sub| sub.iterations.saturating_mul(sub.instructions.len() as u64))
            .fold(0u64, u64::saturating_add)
    }

    /// Whether a shot executes no instructions.
    pub fn is_empty(&self) -> bool {
        self.subcircuits.iter().all(|sub| sub.instructions.is_empty())
    }

    /// Whether any instruction measures.
    pub fn has_measurements(&self) -> bool {
        self.subcircuits
            .iter()
            .flat_map(|sub| &sub.instructions)
            .any(Instruction::is_measure)
    }
}

/// Check one instruction against a register of the given size.
pub fn validate_instruction(inst: &Instruction, num_qubits: u32, num_clbits: u32) -> IrResult<()> {
    let gate_name = || Some(inst.name().to_string());

    let check_qubit = |q: QubitId| {
        if q.0 < num_qubits {
            Ok(())
        } else {
            Err(IrError::QubitOutOfRange {
                qubit: q,
                num_qubits,
                gate_name: gate_name(),
            })
        }
    };
    let check_clbit = |c: ClbitId| {
        if c.0 < num_clbits {
            Ok(())
        } else {
            Err(IrError::ClbitOutOfRange {
                clbit: c,
                num_clbits,
                gate_name: gate_name(),
            })
        }
    };

    for &q in inst.qubits.iter().chain(&inst.controls) {
        check_qubit(q)?;
    }
    if let Some(condition) = &inst.condition {
        for &c in condition.bits() {
            check_clbit(c)?;
        }
    }

    match &inst.kind {
        InstructionKind::Gate(gate) => validate_gate(inst, gate)?,
        InstructionKind::Measure => {
            no_controls(inst)?;
            if inst.qubits.is_empty() {
                return Err(IrError::EmptyOperands(inst.name().to_string()));
            }
            if !inst.clbits.is_empty() && inst.clbits.len() != inst.qubits.len() {
                return Err(IrError::MeasureArityMismatch {
                    qubits: inst.qubits.len(),
                    clbits: inst.clbits.len(),
                });
            }
            for c in inst.destinations() {
                check_clbit(c)?;
            }
        }
        InstructionKind::Reset => {
            no_controls(inst)?;
            if inst.qubits.is_empty() {
                return Err(IrError::EmptyOperands(inst.name().to_string()));
            }
        }
        InstructionKind::Barrier => no_controls(inst)?,
    }
    Ok(())
}

fn no_controls(inst: &Instruction) -> IrResult<()> {
    if inst.controls.is_empty() {
        Ok(())
    } else {
        Err(IrError::UnexpectedControls(inst.name().to_string()))
    }
}

fn validate_gate(inst: &Instruction, gate: &Gate) -> IrResult<()> {
    let name = gate.name();
    let targets = inst.qubits.len();

    if targets == 0 {
        return Err(IrError::EmptyOperands(name.to_string()));
    }
    if targets > MAX_GATE_TARGETS {
        return Err(IrError::TooManyTargets {
            gate_name: name.to_string(),
            got: targets,
            max: MAX_GATE_TARGETS,
        });
    }
    if gate.num_qubits() as usize != targets {
        return Err(IrError::QubitCountMismatch {
            gate_name: name.to_string(),
            expected: gate.num_qubits(),
            got: targets as u32,
        });
    }
    if let Gate::Custom(custom) = gate {
        custom.check_unitary()?;
    }

    let mut seen = FxHashSet::default();
    for &q in inst.qubits.iter().chain(&inst.controls) {
        if !seen.insert(q) {
            return Err(IrError::DuplicateQubit {
                qubit: q,
                gate_name: Some(name.to_string()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{CustomGate, StandardGate};
    use crate::matrix::UnitaryMatrix;
    use num_complex::Complex64;

    fn h(q: u32) -> Instruction {
        Instruction::single_qubit_gate(StandardGate::H, QubitId(q))
    }

    #[test]
    fn test_valid_program() {
        let program = CircuitProgram::new(
            "bell",
            2,
            2,
            vec![
                h(0),
                Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)),
                Instruction::measure_qubits([QubitId(0), QubitId(1)]),
            ],
        )
        .unwrap();
        assert_eq!(program.len(), 3);
        assert!(program.has_measurements());
        assert_eq!(program.instructions().count(), 3);
    }

    #[test]
    fn test_qubit_out_of_range() {
        let err = CircuitProgram::new("bad", 1, 1, vec![h(1)]).unwrap_err();
        assert!(matches!(err, IrError::QubitOutOfRange { qubit: QubitId(1), num_qubits: 1, .. }));
        assert!(err.to_string().contains("gate: h"));
    }

    #[test]
    fn test_control_out_of_range() {
        let inst = Instruction::controlled(StandardGate::X, [QubitId(5)], [QubitId(0)]);
        assert!(CircuitProgram::new("bad", 2, 2, vec![inst]).is_err());
    }

    #[test]
    fn test_duplicate_operand() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(0));
        let err = CircuitProgram::new("bad", 2, 2, vec![inst]).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));

        let inst = Instruction::controlled(StandardGate::X, [QubitId(1)], [QubitId(1)]);
        assert!(CircuitProgram::new("bad", 2, 2, vec![inst]).is_err());
    }

    #[test]
    fn test_gate_arity() {
        let inst = Instruction::gate(StandardGate::CX, [QubitId(0)]);
        let err = CircuitProgram::new("bad", 2, 2, vec![inst]).unwrap_err();
        assert!(matches!(err, IrError::QubitCountMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_too_many_targets() {
        let custom = CustomGate::new("id4", UnitaryMatrix::identity(4)).unwrap();
        let inst = Instruction::gate(custom, (0..4).map(QubitId));
        let err = CircuitProgram::new("bad", 4, 4, vec![inst]).unwrap_err();
        assert!(matches!(err, IrError::TooManyTargets { got: 4, max: 3, .. }));
    }

    #[test]
    fn test_clbit_out_of_range() {
        let inst = Instruction::measure(QubitId(0), ClbitId(2));
        let err = CircuitProgram::new("bad", 2, 2, vec![inst]).unwrap_err();
        assert!(matches!(err, IrError::ClbitOutOfRange { .. }));

        // default destination of qubit 1 is c1, out of range for one clbit
        let inst = Instruction::measure_qubits([QubitId(1)]);
        assert!(CircuitProgram::new("bad", 2, 1, vec![inst]).is_err());

        let inst = h(0).with_condition([ClbitId(7)]);
        assert!(CircuitProgram::new("bad", 2, 2, vec![inst]).is_err());
    }

    #[test]
    fn test_controls_on_measure_rejected() {
        let mut inst = Instruction::measure_qubits([QubitId(0)]);
        inst.controls.push(QubitId(1));
        let err = CircuitProgram::new("bad", 2, 2, vec![inst]).unwrap_err();
        assert!(matches!(err, IrError::UnexpectedControls(_)));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = CircuitProgram::from_subcircuits("bad", 1, 1, vec![Subcircuit::new("loop", 0, vec![h(0)])])
            .unwrap_err();
        assert!(matches!(err, IrError::InvalidIterations { iterations: 0, .. }));
    }

    #[test]
    fn test_iterations_unrolled() {
        let program = CircuitProgram::from_subcircuits(
            "loops",
            1,
            1,
            vec![
                Subcircuit::new("init", 1, vec![h(0)]),
                Subcircuit::new("body", 3, vec![h(0), Instruction::reset(QubitId(0))]),
            ],
        )
        .unwrap();
        assert_eq!(program.len(), 7);
        let names: Vec<_> = program.instructions().map(Instruction::name).collect();
        assert_eq!(names, vec!["h", "h", "reset", "h", "reset", "h", "reset"]);
    }

    #[test]
    fn test_empty_program() {
        let program = CircuitProgram::empty(3);
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert_eq!(program.num_clbits(), 3);
    }

    #[test]
    fn test_json_round_trip_revalidates() {
        let program = CircuitProgram::new("p", 1, 1, vec![h(0)]).unwrap();
        let json = program.to_json().unwrap();
        assert_eq!(CircuitProgram::from_json(&json).unwrap(), program);

        let tampered = json.replace("\"num_qubits\":1", "\"num_qubits\":0");
        assert!(CircuitProgram::from_json(&tampered).is_err());
    }

    #[test]
    fn test_json_defaults_clbits_to_qubits() {
        let json = r#"{"num_qubits":2,"subcircuits":[{"name":"main","iterations":1,
            "instructions":[{"kind":"Measure","qubits":[1]}]}]}"#;
        let program = CircuitProgram::from_json(json).unwrap();
        assert_eq!(program.num_clbits(), 2);
    }

    #[test]
    fn test_deserialized_custom_matrix_checked() {
        let shear = UnitaryMatrix::new(vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
        ])
        .unwrap();
        let inst = Instruction::gate(
            CustomGate {
                name: "shear".into(),
                matrix: shear,
            },
            [QubitId(0)],
        );
        let err = CircuitProgram::new("bad", 1, 1, vec![inst]).unwrap_err();
        assert!(matches!(err, IrError::NonUnitary(_)));
    }
}
