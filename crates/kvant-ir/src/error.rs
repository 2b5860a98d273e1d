//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors raised while building or validating a circuit program.
///
/// Every variant is a build-time rejection: a program that reaches the
/// simulator has already passed these checks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index outside `[0, num_qubits)`.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit program{}", format_gate_context(.gate_name))]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Number of qubits declared by the program.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit index outside `[0, num_clbits)`.
    #[error("Classical bit {clbit} out of range for a program with {num_clbits} classical bits{}", format_gate_context(.gate_name))]
    ClbitOutOfRange {
        /// The offending classical bit.
        clbit: ClbitId,
        /// Number of classical bits declared by the program.
        num_clbits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires a different number of target qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// The same qubit appears twice among targets and controls.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Measurement lists a different number of qubits and destination bits.
    #[error("Measurement of {qubits} qubits cannot write {clbits} classical bits")]
    MeasureArityMismatch {
        /// Number of measured qubits.
        qubits: usize,
        /// Number of destination classical bits.
        clbits: usize,
    },

    /// Gate acts on more target qubits than the kernels support.
    #[error("Gate '{gate_name}' acts on {got} target qubits, at most {max} are supported")]
    TooManyTargets {
        /// Name of the gate.
        gate_name: String,
        /// Number of targets requested.
        got: usize,
        /// Supported maximum.
        max: usize,
    },

    /// Control qubits on an instruction that is not a gate.
    #[error("Instruction '{0}' cannot take control qubits")]
    UnexpectedControls(String),

    /// Instruction has no operands.
    #[error("Instruction '{0}' requires at least one qubit")]
    EmptyOperands(String),

    /// Matrix data does not describe a 2^k × 2^k matrix.
    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    /// A user supplied matrix is not unitary.
    #[error("Matrix of gate '{0}' is not unitary")]
    NonUnitary(String),

    /// No gate with this name is known.
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Wrong number of gate parameters.
    #[error("Gate '{gate_name}' expects {expected} parameters, got {got}")]
    ParameterCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters provided.
        got: usize,
    },

    /// Parameter value is outside the gate's domain.
    #[error("Invalid parameter for gate '{gate_name}': {reason}")]
    InvalidParameter {
        /// Name of the gate.
        gate_name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A subcircuit must execute at least once.
    #[error("Subcircuit '{name}' must run at least once, got {iterations} iterations")]
    InvalidIterations {
        /// Subcircuit name.
        name: String,
        /// Requested iteration count.
        iterations: u64,
    },

    /// Serialized program could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
