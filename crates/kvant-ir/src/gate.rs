//! Quantum gate types.

use std::borrow::Cow;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::matrix::{UNITARY_TOLERANCE, UnitaryMatrix};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Quarter turns, RX/RY(±π/2)
    /// RX(π/2).
    X90,
    /// RX(-π/2).
    MX90,
    /// RY(π/2).
    Y90,
    /// RY(-π/2).
    MY90,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// Controlled phase gate.
    CP(f64),
    /// Controlled phase by 2π/2^k, the QFT building block.
    CRk(u32),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::X90 => "x90",
            StandardGate::MX90 => "mx90",
            StandardGate::Y90 => "y90",
            StandardGate::MY90 => "my90",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CP(_) => "cp",
            StandardGate::CRk(_) => "crk",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CP(_)
            | StandardGate::CRk(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,

            _ => 1,
        }
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CP(p) => vec![*p],
            StandardGate::U(a, b, c) => vec![*a, *b, *c],
            StandardGate::CRk(k) => vec![f64::from(*k)],
            _ => vec![],
        }
    }

    /// Look up a gate by name, case-insensitively.
    ///
    /// Accepts the names returned by [`StandardGate::name`] plus the common
    /// aliases `i`, `cnot`, `toffoli`, `fredkin`, `sdag`, `tdag`, `phase`
    /// and `cr`.
    pub fn from_name(name: &str, params: &[f64]) -> IrResult<Self> {
        let lower = name.to_ascii_lowercase();
        let expect = |n: usize| -> IrResult<()> {
            if params.len() == n {
                Ok(())
            } else {
                Err(IrError::ParameterCountMismatch {
                    gate_name: lower.clone(),
                    expected: n,
                    got: params.len(),
                })
            }
        };

        let gate = match lower.as_str() {
            "i" | "id" => StandardGate::I,
            "x" => StandardGate::X,
            "y" => StandardGate::Y,
            "z" => StandardGate::Z,
            "h" => StandardGate::H,
            "s" => StandardGate::S,
            "sdg" | "sdag" => StandardGate::Sdg,
            "t" => StandardGate::T,
            "tdg" | "tdag" => StandardGate::Tdg,
            "sx" => StandardGate::SX,
            "sxdg" => StandardGate::SXdg,
            "x90" => StandardGate::X90,
            "mx90" => StandardGate::MX90,
            "y90" => StandardGate::Y90,
            "my90" => StandardGate::MY90,
            "cx" | "cnot" => StandardGate::CX,
            "cy" => StandardGate::CY,
            "cz" => StandardGate::CZ,
            "ch" => StandardGate::CH,
            "swap" => StandardGate::Swap,
            "iswap" => StandardGate::ISwap,
            "ccx" | "toffoli" => StandardGate::CCX,
            "cswap" | "fredkin" => StandardGate::CSwap,
            "rx" => {
                expect(1)?;
                return Ok(StandardGate::Rx(params[0]));
            }
            "ry" => {
                expect(1)?;
                return Ok(StandardGate::Ry(params[0]));
            }
            "rz" => {
                expect(1)?;
                return Ok(StandardGate::Rz(params[0]));
            }
            "p" | "phase" => {
                expect(1)?;
                return Ok(StandardGate::P(params[0]));
            }
            "cp" | "cr" => {
                expect(1)?;
                return Ok(StandardGate::CP(params[0]));
            }
            "u" => {
                expect(3)?;
                return Ok(StandardGate::U(params[0], params[1], params[2]));
            }
            "crk" => {
                expect(1)?;
                let k = params[0];
                if k.fract() != 0.0 || k < 0.0 || k > f64::from(u32::MAX) {
                    return Err(IrError::InvalidParameter {
                        gate_name: lower.clone(),
                        reason: format!("k must be a non-negative integer, got {k}"),
                    });
                }
                return Ok(StandardGate::CRk(k as u32));
            }
            _ => return Err(IrError::UnknownGate(name.to_string())),
        };
        expect(0)?;
        Ok(gate)
    }

    /// The unitary matrix of this gate, operand 0 as the most significant bit.
    pub fn matrix(&self) -> UnitaryMatrix {
        match self {
            StandardGate::I => one_qubit([ONE, ZERO, ZERO, ONE]),
            StandardGate::X => one_qubit([ZERO, ONE, ONE, ZERO]),
            StandardGate::Y => one_qubit([ZERO, -I, I, ZERO]),
            StandardGate::Z => one_qubit([ONE, ZERO, ZERO, -ONE]),
            StandardGate::H => one_qubit(hadamard()),
            StandardGate::S => one_qubit(phase(FRAC_PI_2)),
            StandardGate::Sdg => one_qubit(phase(-FRAC_PI_2)),
            StandardGate::T => one_qubit(phase(FRAC_PI_4)),
            StandardGate::Tdg => one_qubit(phase(-FRAC_PI_4)),
            StandardGate::SX => {
                let a = Complex64::new(0.5, 0.5);
                let b = Complex64::new(0.5, -0.5);
                one_qubit([a, b, b, a])
            }
            StandardGate::SXdg => {
                let a = Complex64::new(0.5, -0.5);
                let b = Complex64::new(0.5, 0.5);
                one_qubit([a, b, b, a])
            }
            StandardGate::X90 => one_qubit(rx(FRAC_PI_2)),
            StandardGate::MX90 => one_qubit(rx(-FRAC_PI_2)),
            StandardGate::Y90 => one_qubit(ry(FRAC_PI_2)),
            StandardGate::MY90 => one_qubit(ry(-FRAC_PI_2)),
            StandardGate::Rx(theta) => one_qubit(rx(*theta)),
            StandardGate::Ry(theta) => one_qubit(ry(*theta)),
            StandardGate::Rz(theta) => {
                let half = theta / 2.0;
                one_qubit([
                    Complex64::from_polar(1.0, -half),
                    ZERO,
                    ZERO,
                    Complex64::from_polar(1.0, half),
                ])
            }
            StandardGate::P(lambda) => one_qubit(phase(*lambda)),
            StandardGate::U(theta, phi, lambda) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                one_qubit([
                    Complex64::new(cos, 0.0),
                    -Complex64::from_polar(sin, *lambda),
                    Complex64::from_polar(sin, *phi),
                    Complex64::from_polar(cos, phi + lambda),
                ])
            }
            StandardGate::CX => controlled([ZERO, ONE, ONE, ZERO]),
            StandardGate::CY => controlled([ZERO, -I, I, ZERO]),
            StandardGate::CZ => controlled([ONE, ZERO, ZERO, -ONE]),
            StandardGate::CH => controlled(hadamard()),
            StandardGate::CP(lambda) => controlled(phase(*lambda)),
            StandardGate::CRk(k) => controlled(phase(2.0 * PI / 2f64.powf(f64::from(*k)))),
            StandardGate::Swap => UnitaryMatrix::from_raw(
                4,
                [
                    ONE, ZERO, ZERO, ZERO, //
                    ZERO, ZERO, ONE, ZERO, //
                    ZERO, ONE, ZERO, ZERO, //
                    ZERO, ZERO, ZERO, ONE,
                ],
            ),
            StandardGate::ISwap => UnitaryMatrix::from_raw(
                4,
                [
                    ONE, ZERO, ZERO, ZERO, //
                    ZERO, ZERO, I, ZERO, //
                    ZERO, I, ZERO, ZERO, //
                    ZERO, ZERO, ZERO, ONE,
                ],
            ),
            StandardGate::CCX => permutation(8, 6, 7),
            StandardGate::CSwap => permutation(8, 5, 6),
        }
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.parameters();
        if params.is_empty() {
            write!(f, "{}", self.name())
        } else {
            let joined: Vec<String> = params.iter().map(ToString::to_string).collect();
            write!(f, "{}({})", self.name(), joined.join(", "))
        }
    }
}

fn one_qubit(entries: [Complex64; 4]) -> UnitaryMatrix {
    UnitaryMatrix::from_raw(2, entries)
}

fn hadamard() -> [Complex64; 4] {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    [h, h, h, -h]
}

fn phase(lambda: f64) -> [Complex64; 4] {
    [ONE, ZERO, ZERO, Complex64::from_polar(1.0, lambda)]
}

fn rx(theta: f64) -> [Complex64; 4] {
    let (sin, cos) = (theta / 2.0).sin_cos();
    let c = Complex64::new(cos, 0.0);
    let s = Complex64::new(0.0, -sin);
    [c, s, s, c]
}

fn ry(theta: f64) -> [Complex64; 4] {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        Complex64::new(cos, 0.0),
        Complex64::new(-sin, 0.0),
        Complex64::new(sin, 0.0),
        Complex64::new(cos, 0.0),
    ]
}

/// `|0⟩⟨0| ⊗ I + |1⟩⟨1| ⊗ U` with the control as the high bit.
fn controlled(u: [Complex64; 4]) -> UnitaryMatrix {
    UnitaryMatrix::from_raw(
        4,
        [
            ONE, ZERO, ZERO, ZERO, //
            ZERO, ONE, ZERO, ZERO, //
            ZERO, ZERO, u[0], u[1], //
            ZERO, ZERO, u[2], u[3],
        ],
    )
}

/// Identity of side `dim` with basis states `a` and `b` exchanged.
fn permutation(dim: usize, a: usize, b: usize) -> UnitaryMatrix {
    let mut data = vec![ZERO; dim * dim];
    for row in 0..dim {
        let col = if row == a {
            b
        } else if row == b {
            a
        } else {
            row
        };
        data[row * dim + col] = ONE;
    }
    UnitaryMatrix::from_raw(dim, data)
}

/// A user-defined gate given by its unitary matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// Unitary matrix (row-major, 2^n × 2^n).
    pub matrix: UnitaryMatrix,
}

impl CustomGate {
    /// Create a new custom gate, rejecting non-unitary matrices.
    pub fn new(name: impl Into<String>, matrix: UnitaryMatrix) -> IrResult<Self> {
        let gate = Self {
            name: name.into(),
            matrix,
        };
        gate.check_unitary()?;
        Ok(gate)
    }

    /// The number of qubits it operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.matrix.num_qubits()
    }

    pub(crate) fn check_unitary(&self) -> IrResult<()> {
        if self.matrix.is_unitary(UNITARY_TOLERANCE) {
            Ok(())
        } else {
            Err(IrError::NonUnitary(self.name.clone()))
        }
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A custom user-defined gate.
    Custom(CustomGate),
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Gate::Standard(g) => g.name(),
            Gate::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            Gate::Standard(g) => g.num_qubits(),
            Gate::Custom(g) => g.num_qubits(),
        }
    }

    /// The gate's unitary. Standard gates build theirs on demand.
    pub fn matrix(&self) -> Cow<'_, UnitaryMatrix> {
        match self {
            Gate::Standard(g) => Cow::Owned(g.matrix()),
            Gate::Custom(g) => Cow::Borrowed(&g.matrix),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Standard(g) => write!(f, "{g}"),
            Gate::Custom(g) => write!(f, "{}", g.name),
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::Standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::Custom(gate)
    }
}
