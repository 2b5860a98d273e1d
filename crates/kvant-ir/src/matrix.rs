//! Dense unitary matrices for gate definitions.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// Default tolerance used when checking unitarity of user matrices.
pub const UNITARY_TOLERANCE: f64 = 1e-9;

/// A square 2^k × 2^k complex matrix stored row-major.
///
/// Row and column indices are little-endian over the gate's operands in
/// reverse order: operand 0 of the gate is the most significant bit of the
/// matrix index. For a CX applied to `(control, target)` the control is the
/// high bit, which keeps the familiar textbook layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Complex64>", into = "Vec<Complex64>")]
pub struct UnitaryMatrix {
    dim: usize,
    data: Vec<Complex64>,
}

impl UnitaryMatrix {
    /// Build a matrix from row-major data, checking that it is square with a
    /// power-of-two side of at least 2.
    ///
    /// Unitarity is not checked here, see [`UnitaryMatrix::is_unitary`].
    pub fn new(data: Vec<Complex64>) -> IrResult<Self> {
        let len = data.len();
        let dim = (len as f64).sqrt().round() as usize;
        if dim * dim != len {
            return Err(IrError::InvalidMatrix(format!(
                "{len} entries do not form a square matrix"
            )));
        }
        if dim < 2 || !dim.is_power_of_two() {
            return Err(IrError::InvalidMatrix(format!(
                "side length {dim} is not a power of two >= 2"
            )));
        }
        Ok(Self { dim, data })
    }

    /// Build a matrix from rows of a fixed size.
    pub fn from_rows<const N: usize>(rows: [[Complex64; N]; N]) -> IrResult<Self> {
        Self::new(rows.into_iter().flatten().collect())
    }

    /// Build from trusted data whose shape is known at compile time.
    pub(crate) fn from_raw(dim: usize, data: impl Into<Vec<Complex64>>) -> Self {
        let data = data.into();
        debug_assert_eq!(dim * dim, data.len());
        Self { dim, data }
    }

    /// The identity on `num_qubits` qubits.
    pub fn identity(num_qubits: u32) -> Self {
        let dim = 1usize << num_qubits.max(1);
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = Complex64::new(1.0, 0.0);
        }
        Self { dim, data }
    }

    /// Side length of the matrix.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of qubits the matrix acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.dim.trailing_zeros()
    }

    /// Entry at `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim + col]
    }

    /// Row-major entries.
    #[inline]
    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    /// Conjugate transpose.
    #[must_use]
    pub fn dagger(&self) -> Self {
        let dim = self.dim;
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for r in 0..dim {
            for c in 0..dim {
                data[c * dim + r] = self.data[r * dim + c].conj();
            }
        }
        Self { dim, data }
    }

    /// Matrix product `self · other`.
    pub fn compose(&self, other: &UnitaryMatrix) -> IrResult<Self> {
        if self.dim != other.dim {
            return Err(IrError::InvalidMatrix(format!(
                "cannot multiply {0}x{0} by {1}x{1}",
                self.dim, other.dim
            )));
        }
        let dim = self.dim;
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for r in 0..dim {
            for k in 0..dim {
                let a = self.data[r * dim + k];
                if a == Complex64::new(0.0, 0.0) {
                    continue;
                }
                for c in 0..dim {
                    data[r * dim + c] += a * other.data[k * dim + c];
                }
            }
        }
        Ok(Self { dim, data })
    }

    /// Whether every entry is within `tolerance` of `other`'s.
    pub fn approx_eq(&self, other: &UnitaryMatrix, tolerance: f64) -> bool {
        self.dim == other.dim
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }

    /// Whether `U · U†` is the identity within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        let dim = self.dim;
        for r in 0..dim {
            for c in 0..dim {
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..dim {
                    acc += self.data[r * dim + k] * self.data[c * dim + k].conj();
                }
                let expected = if r == c { 1.0 } else { 0.0 };
                if (acc - Complex64::new(expected, 0.0)).norm() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

impl TryFrom<Vec<Complex64>> for UnitaryMatrix {
    type Error = IrError;

    fn try_from(data: Vec<Complex64>) -> IrResult<Self> {
        Self::new(data)
    }
}

impl From<UnitaryMatrix> for Vec<Complex64> {
    fn from(matrix: UnitaryMatrix) -> Self {
        matrix.data
    }
}
