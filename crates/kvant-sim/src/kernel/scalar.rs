//! Portable gather/multiply/scatter kernel.

use kvant_ir::UnitaryMatrix;
use num_complex::Complex64;

use super::{GateKernel, GateLayout, KernelPath, MAX_DIM};

/// Applies a gate one amplitude group at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarKernel;

impl GateKernel for ScalarKernel {
    fn path(&self) -> KernelPath {
        KernelPath::Scalar
    }

    fn apply(
        &self,
        amplitudes: &mut [Complex64],
        targets: &[usize],
        controls: &[usize],
        matrix: &UnitaryMatrix,
    ) {
        let layout = GateLayout::new(targets, controls);
        let dim = layout.dim;
        let m = matrix.as_slice();
        let mut group = [Complex64::new(0.0, 0.0); MAX_DIM];

        for g in 0..layout.groups_in(amplitudes.len()) {
            let base = layout.base_index(g);
            if !layout.controls_set(base) {
                continue;
            }

            for (c, slot) in group.iter_mut().enumerate().take(dim) {
                *slot = amplitudes[base + layout.offsets[c]];
            }
            for r in 0..dim {
                let mut acc = Complex64::new(0.0, 0.0);
                for c in 0..dim {
                    acc += m[r * dim + c] * group[c];
                }
                amplitudes[base + layout.offsets[r]] = acc;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvant_ir::StandardGate;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn basis(n: usize, index: usize) -> Vec<Complex64> {
        let mut v = vec![Complex64::new(0.0, 0.0); 1 << n];
        v[index] = Complex64::new(1.0, 0.0);
        v
    }

    #[test]
    fn test_hadamard() {
        let mut amps = basis(1, 0);
        ScalarKernel.apply(&mut amps, &[0], &[], &StandardGate::H.matrix());
        assert!(approx_eq(amps[0], Complex64::new(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(amps[1], Complex64::new(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_x_on_high_qubit() {
        let mut amps = basis(3, 0);
        ScalarKernel.apply(&mut amps, &[2], &[], &StandardGate::X.matrix());
        assert!(approx_eq(amps[0b100], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_cx_operand_order() {
        // control q0 set, target q1
        let mut amps = basis(2, 0b01);
        ScalarKernel.apply(&mut amps, &[0, 1], &[], &StandardGate::CX.matrix());
        assert!(approx_eq(amps[0b11], Complex64::new(1.0, 0.0)));

        // control q1 clear: nothing happens
        let mut amps = basis(2, 0b01);
        ScalarKernel.apply(&mut amps, &[1, 0], &[], &StandardGate::CX.matrix());
        assert!(approx_eq(amps[0b01], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_explicit_controls() {
        let mut amps = basis(3, 0b011);
        ScalarKernel.apply(&mut amps, &[2], &[0, 1], &StandardGate::X.matrix());
        assert!(approx_eq(amps[0b111], Complex64::new(1.0, 0.0)));

        let mut amps = basis(3, 0b001);
        ScalarKernel.apply(&mut amps, &[2], &[0, 1], &StandardGate::X.matrix());
        assert!(approx_eq(amps[0b001], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_toffoli() {
        // CCX operands (c1, c2, target) = (q2, q0, q1)
        let mut amps = basis(3, 0b101);
        ScalarKernel.apply(&mut amps, &[2, 0, 1], &[], &StandardGate::CCX.matrix());
        assert!(approx_eq(amps[0b111], Complex64::new(1.0, 0.0)));
    }
}
