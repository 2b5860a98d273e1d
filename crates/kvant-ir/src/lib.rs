//! Kvant circuit program model
//!
//! This crate provides the data structures the simulator consumes: a
//! normalized, validated and immutable instruction sequence over a fixed
//! number of qubits and classical bits. Text front ends produce these
//! programs; the engine in `kvant-sim` executes them.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Matrices**: [`UnitaryMatrix`], dense 2^k × 2^k gate unitaries
//! - **Gates**: [`StandardGate`] for built-in gates (H, X, CX, etc.) and
//!   [`CustomGate`] for user-supplied unitaries
//! - **Instructions**: [`Instruction`] combining a gate, measurement, reset
//!   or barrier with its operands, controls and classical condition
//! - **Programs**: [`CircuitProgram`], built from [`Subcircuit`]s and
//!   validated once at construction
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use kvant_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//!
//! // |00⟩ → (|00⟩ + |11⟩)/√2
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! let program = circuit.build().unwrap();
//! assert_eq!(program.num_qubits(), 2);
//! assert_eq!(program.len(), 3);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase quarter and eighth turns |
//! | `SX`, `SXdg` | 1 | Square root of X |
//! | `X90`, `MX90`, `Y90`, `MY90` | 1 | RX/RY(±π/2) |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CY`, `CZ`, `CH` | 2 | Controlled Paulis and Hadamard |
//! | `Swap`, `ISwap` | 2 | Swap gates |
//! | `CP`, `CRk` | 2 | Controlled phase |
//! | `CCX`, `CSwap` | 3 | Toffoli and Fredkin |
//!
//! Any gate may additionally carry control qubits; the engine applies it
//! only to basis states where every control is 1.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod matrix;
pub mod program;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, StandardGate};
pub use instruction::{ClassicalCondition, Instruction, InstructionKind};
pub use matrix::{UNITARY_TOLERANCE, UnitaryMatrix};
pub use program::{CircuitProgram, MAX_GATE_TARGETS, Subcircuit, validate_instruction};
pub use qubit::{ClbitId, QubitId};
