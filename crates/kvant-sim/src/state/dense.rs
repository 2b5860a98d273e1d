//! Dense amplitude vector.

use kvant_ir::{MAX_GATE_TARGETS, QubitId, UnitaryMatrix};
use num_complex::Complex64;
use tracing::trace;

use super::{PROBABILITY_EPSILON, QuantumState};
use crate::config::ABSOLUTE_MAX_QUBITS;
use crate::error::{SimError, SimResult};
use crate::kernel::GateKernel;

/// A state vector of 2^n complex amplitudes.
///
/// Bit `k` of a basis index is the value of qubit `k`. The vector is kept at
/// unit norm (within ~1e-9) after every completed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeVector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: u32,
}

impl AmplitudeVector {
    /// Create |0…0⟩ on `num_qubits` qubits, up to the absolute limit.
    pub fn new(num_qubits: u32) -> SimResult<Self> {
        Self::with_limit(num_qubits, ABSOLUTE_MAX_QUBITS)
    }

    /// Create |0…0⟩, rejecting registers wider than `max_qubits`.
    pub fn with_limit(num_qubits: u32, max_qubits: u32) -> SimResult<Self> {
        let limit = max_qubits.min(ABSOLUTE_MAX_QUBITS);
        if num_qubits > limit {
            return Err(SimError::Configuration(format!(
                "{num_qubits} qubits requested but at most {limit} are supported"
            )));
        }
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Number of amplitudes, 2^n.
    #[inline]
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Never true: even zero qubits hold one amplitude.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// All amplitudes in basis-index order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// |a|² per basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Basis states whose amplitude magnitude exceeds `threshold`.
    pub fn snapshot(&self, threshold: f64) -> Vec<(usize, Complex64)> {
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(_, a)| a.norm() > threshold)
            .map(|(i, a)| (i, *a))
            .collect()
    }

    /// Rescale to unit norm. A zero vector is left untouched.
    pub fn renormalize(&mut self) {
        let norm = self.norm_squared().sqrt();
        if norm > 0.0 {
            let scale = 1.0 / norm;
            for amp in &mut self.amplitudes {
                *amp *= scale;
            }
        }
    }

    fn check_qubit(&self, qubit: QubitId) -> SimResult<()> {
        if qubit.0 < self.num_qubits {
            Ok(())
        } else {
            Err(SimError::Execution(format!(
                "qubit {qubit} out of range for a {}-qubit state",
                self.num_qubits
            )))
        }
    }

    fn check_operands(
        &self,
        targets: &[QubitId],
        controls: &[QubitId],
        matrix: &UnitaryMatrix,
    ) -> SimResult<()> {
        if targets.is_empty() || targets.len() > MAX_GATE_TARGETS {
            return Err(SimError::Execution(format!(
                "gate must act on 1 to {MAX_GATE_TARGETS} targets, got {}",
                targets.len()
            )));
        }
        if matrix.dim() != 1 << targets.len() {
            return Err(SimError::Execution(format!(
                "{0}x{0} matrix cannot act on {1} targets",
                matrix.dim(),
                targets.len()
            )));
        }
        let mut seen = 0u64;
        for &q in targets.iter().chain(controls) {
            self.check_qubit(q)?;
            let bit = 1u64 << q.0;
            if seen & bit != 0 {
                return Err(SimError::Execution(format!("qubit {q} used twice in one gate")));
            }
            seen |= bit;
        }
        Ok(())
    }
}

impl QuantumState for AmplitudeVector {
    fn reset(&mut self) {
        self.amplitudes.fill(Complex64::new(0.0, 0.0));
        self.amplitudes[0] = Complex64::new(1.0, 0.0);
    }

    fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    fn amplitude_at(&self, index: usize) -> Option<Complex64> {
        self.amplitudes.get(index).copied()
    }

    fn apply_unitary(
        &mut self,
        targets: &[QubitId],
        controls: &[QubitId],
        matrix: &UnitaryMatrix,
        kernel: &dyn GateKernel,
    ) -> SimResult<()> {
        self.check_operands(targets, controls, matrix)?;
        let targets: Vec<usize> = targets.iter().map(|q| q.index()).collect();
        let controls: Vec<usize> = controls.iter().map(|q| q.index()).collect();
        kernel.apply(&mut self.amplitudes, &targets, &controls, matrix);
        Ok(())
    }

    fn probability(&self, qubit: QubitId, value: bool) -> SimResult<f64> {
        self.check_qubit(qubit)?;
        let mask = qubit.mask();
        let p = self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| (i & mask != 0) == value)
            .map(|(_, a)| a.norm_sqr())
            .sum();
        Ok(p)
    }

    fn collapse_and_renormalize(&mut self, qubit: QubitId, value: bool) -> SimResult<()> {
        let p = self.probability(qubit, value)?;
        if p < PROBABILITY_EPSILON {
            return Err(SimError::DegenerateState {
                qubit: qubit.0,
                value: u8::from(value),
                probability: p,
            });
        }

        let mask = qubit.mask();
        let scale = if p > 1.0 - PROBABILITY_EPSILON {
            trace!(qubit = qubit.0, p, "branch probability clamped to 1");
            1.0
        } else {
            1.0 / p.sqrt()
        };
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == value {
                *amp *= scale;
            } else {
                *amp = Complex64::new(0.0, 0.0);
            }
        }
        Ok(())
    }

    fn norm_squared(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }
}
