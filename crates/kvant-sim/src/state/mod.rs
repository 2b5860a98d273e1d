//! Quantum state representations.

mod dense;

pub use dense::AmplitudeVector;

use kvant_ir::{QubitId, UnitaryMatrix};
use num_complex::Complex64;

use crate::error::SimResult;
use crate::kernel::GateKernel;

/// Probabilities below this are treated as zero, and within this of one as
/// exactly one.
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// Operations the executor and measurement unit need from a state.
pub trait QuantumState {
    /// Return to |0…0⟩.
    fn reset(&mut self);

    /// Number of qubits in the register.
    fn num_qubits(&self) -> u32;

    /// Amplitude of computational basis state `index`, if in range.
    fn amplitude_at(&self, index: usize) -> Option<Complex64>;

    /// Apply `matrix` to `targets` wherever every control qubit is 1.
    fn apply_unitary(
        &mut self,
        targets: &[QubitId],
        controls: &[QubitId],
        matrix: &UnitaryMatrix,
        kernel: &dyn GateKernel,
    ) -> SimResult<()>;

    /// Probability that measuring `qubit` yields `value`.
    fn probability(&self, qubit: QubitId, value: bool) -> SimResult<f64>;

    /// Project onto `qubit == value` and rescale to unit norm.
    ///
    /// Fails with [`crate::SimError::DegenerateState`] when the branch
    /// probability is below [`PROBABILITY_EPSILON`].
    fn collapse_and_renormalize(&mut self, qubit: QubitId, value: bool) -> SimResult<()>;

    /// Σ|a|².
    fn norm_squared(&self) -> f64;
}
