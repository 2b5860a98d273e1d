//! Projective measurement in the computational basis.

use kvant_ir::{QubitId, StandardGate};
use tracing::trace;

use crate::error::SimResult;
use crate::kernel::GateKernel;
use crate::random::RandomSource;
use crate::state::{PROBABILITY_EPSILON, QuantumState};

/// Measure `qubit`, consuming exactly one draw, and collapse the state.
///
/// The outcome is 1 when the draw falls below the probability of reading 1.
/// That probability is clamped to 0 or 1 when it lies within
/// [`PROBABILITY_EPSILON`] of either, so accumulated rounding never selects a
/// branch that has effectively vanished.
pub fn measure<S, R>(state: &mut S, qubit: QubitId, rng: &mut R) -> SimResult<bool>
where
    S: QuantumState + ?Sized,
    R: RandomSource + ?Sized,
{
    let r = rng.next_uniform();
    let raw = state.probability(qubit, true)?;
    let p1 = if raw < PROBABILITY_EPSILON {
        0.0
    } else if raw > 1.0 - PROBABILITY_EPSILON {
        1.0
    } else {
        raw
    };
    let outcome = r < p1;
    trace!(qubit = qubit.0, r, p1, outcome, "measured");

    state.collapse_and_renormalize(qubit, outcome)?;
    Ok(outcome)
}

/// Measure qubits in the listed order, one draw each, collapsing after each.
pub fn measure_many<S, R>(state: &mut S, qubits: &[QubitId], rng: &mut R) -> SimResult<Vec<bool>>
where
    S: QuantumState + ?Sized,
    R: RandomSource + ?Sized,
{
    qubits
        .iter()
        .map(|&q| measure(&mut *state, q, &mut *rng))
        .collect()
}

/// Return `qubit` to |0⟩: measure it, then flip it if it read 1.
///
/// Consumes one draw and leaves the rest of the register collapsed
/// consistently with the discarded outcome.
pub fn reset_qubit<S, R>(
    state: &mut S,
    qubit: QubitId,
    rng: &mut R,
    kernel: &dyn GateKernel,
) -> SimResult<()>
where
    S: QuantumState + ?Sized,
    R: RandomSource + ?Sized,
{
    if measure(state, qubit, rng)? {
        state.apply_unitary(&[qubit], &[], &StandardGate::X.matrix(), kernel)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::ScalarKernel;
    use crate::random::{FixedSequence, Mt64};
    use crate::state::AmplitudeVector;

    fn plus_state() -> AmplitudeVector {
        let mut sv = AmplitudeVector::new(1).unwrap();
        sv.apply_unitary(&[QubitId(0)], &[], &StandardGate::H.matrix(), &ScalarKernel)
            .unwrap();
        sv
    }

    #[test]
    fn test_draw_below_p1_reads_one() {
        let mut sv = plus_state();
        let mut seq = FixedSequence::new([0.25]);
        assert!(measure(&mut sv, QubitId(0), &mut seq).unwrap());
        assert!((sv.probability(QubitId(0), true).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_draw_above_p1_reads_zero() {
        let mut sv = plus_state();
        let mut seq = FixedSequence::new([0.75]);
        assert!(!measure(&mut sv, QubitId(0), &mut seq).unwrap());
    }

    #[test]
    fn test_certain_outcomes() {
        let mut sv = AmplitudeVector::new(1).unwrap();
        // even a draw of 0.0 cannot select the empty |1⟩ branch
        let mut seq = FixedSequence::new([0.0, 0.999_999]);
        assert!(!measure(&mut sv, QubitId(0), &mut seq).unwrap());
        assert!(!measure(&mut sv, QubitId(0), &mut seq).unwrap());
    }

    #[test]
    fn test_remeasure_is_idempotent() {
        for seed in 0..50 {
            let mut sv = plus_state();
            let mut rng = Mt64::new(seed);
            let first = measure(&mut sv, QubitId(0), &mut rng).unwrap();
            for _ in 0..5 {
                assert_eq!(measure(&mut sv, QubitId(0), &mut rng).unwrap(), first);
            }
        }
    }

    #[test]
    fn test_measure_many_order() {
        let mut sv = AmplitudeVector::new(2).unwrap();
        for q in 0..2 {
            sv.apply_unitary(&[QubitId(q)], &[], &StandardGate::H.matrix(), &ScalarKernel)
                .unwrap();
        }
        let mut seq = FixedSequence::new([0.9, 0.1]);
        let bits = measure_many(&mut sv, &[QubitId(1), QubitId(0)], &mut seq).unwrap();
        assert_eq!(bits, vec![false, true]);
    }

    #[test]
    fn test_reset_qubit() {
        let mut sv = plus_state();
        let mut seq = FixedSequence::new([0.1]);
        reset_qubit(&mut sv, QubitId(0), &mut seq, &ScalarKernel).unwrap();
        assert!((sv.probability(QubitId(0), false).unwrap() - 1.0).abs() < 1e-12);
    }
}
