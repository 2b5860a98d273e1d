//! Lane-blocked, data-parallel kernel.
//!
//! Groups are processed four at a time with real and imaginary parts held in
//! separate lane arrays, which the compiler turns into packed arithmetic.
//! Large states are cut into aligned chunks that each contain whole groups;
//! chunks are independent and run on the rayon pool.

use kvant_ir::UnitaryMatrix;
use num_complex::Complex64;
use rayon::prelude::*;

use super::{GateKernel, GateLayout, KernelPath, MAX_DIM};

const LANES: usize = 4;

/// Minimum chunk handed to one rayon task.
const MIN_CHUNK: usize = 1 << 12;

/// Applies a gate in lane blocks, in parallel for large states.
#[derive(Debug, Clone, Copy)]
pub struct VectorizedKernel {
    parallel_threshold: usize,
}

impl VectorizedKernel {
    /// States with at least `parallel_threshold` amplitudes are split across
    /// threads.
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }
}

impl GateKernel for VectorizedKernel {
    fn path(&self) -> KernelPath {
        KernelPath::Vectorized
    }

    fn apply(
        &self,
        amplitudes: &mut [Complex64],
        targets: &[usize],
        controls: &[usize],
        matrix: &UnitaryMatrix,
    ) {
        let layout = GateLayout::new(targets, controls);
        let len = amplitudes.len();
        let chunk_len = layout.span.max(MIN_CHUNK).min(len);
        let m = matrix.as_slice();

        if len >= self.parallel_threshold && len > chunk_len {
            amplitudes
                .par_chunks_mut(chunk_len)
                .enumerate()
                .for_each(|(i, chunk)| apply_chunk(chunk, i * chunk_len, &layout, m));
        } else {
            for (i, chunk) in amplitudes.chunks_mut(chunk_len).enumerate() {
                apply_chunk(chunk, i * chunk_len, &layout, m);
            }
        }
    }
}

/// Apply the gate to every group inside `chunk`, whose first element has
/// global index `start`.
fn apply_chunk(chunk: &mut [Complex64], start: usize, layout: &GateLayout, m: &[Complex64]) {
    let mut bases = [0usize; LANES];
    let mut filled = 0;

    for g in 0..layout.groups_in(chunk.len()) {
        let local = layout.base_index(g);
        if !layout.controls_set(start | local) {
            continue;
        }
        bases[filled] = local;
        filled += 1;
        if filled == LANES {
            apply_block(chunk, &bases, LANES, layout, m);
            filled = 0;
        }
    }
    if filled > 0 {
        apply_block(chunk, &bases, filled, layout, m);
    }
}

/// Gather `lanes` groups into split planes, multiply, scatter.
///
/// Accumulation order matches `Complex64` multiply-add so both kernels give
/// identical bits.
fn apply_block(
    chunk: &mut [Complex64],
    bases: &[usize; LANES],
    lanes: usize,
    layout: &GateLayout,
    m: &[Complex64],
) {
    let dim = layout.dim;
    let mut re = [[0.0f64; LANES]; MAX_DIM];
    let mut im = [[0.0f64; LANES]; MAX_DIM];

    for c in 0..dim {
        for l in 0..lanes {
            let a = chunk[bases[l] + layout.offsets[c]];
            re[c][l] = a.re;
            im[c][l] = a.im;
        }
    }

    for r in 0..dim {
        let mut acc_re = [0.0f64; LANES];
        let mut acc_im = [0.0f64; LANES];
        for c in 0..dim {
            let u = m[r * dim + c];
            for l in 0..LANES {
                acc_re[l] += u.re * re[c][l] - u.im * im[c][l];
                acc_im[l] += u.re * im[c][l] + u.im * re[c][l];
            }
        }
        for l in 0..lanes {
            chunk[bases[l] + layout.offsets[r]] = Complex64::new(acc_re[l], acc_im[l]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::ScalarKernel;
    use kvant_ir::StandardGate;

    fn ramp(n: usize) -> Vec<Complex64> {
        let len = 1 << n;
        let raw: Vec<_> = (0..len)
            .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect();
        let norm = raw.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt();
        raw.into_iter().map(|a| a / norm).collect()
    }

    fn assert_same(a: &[Complex64], b: &[Complex64]) {
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).norm() < 1e-12, "index {i}: {x} vs {y}");
        }
    }

    #[test]
    fn test_matches_scalar_single_qubit() {
        for target in 0..5 {
            let mut a = ramp(5);
            let mut b = a.clone();
            let u = StandardGate::U(0.4, 1.3, -0.2).matrix();
            ScalarKernel.apply(&mut a, &[target], &[], &u);
            VectorizedKernel::new(usize::MAX).apply(&mut b, &[target], &[], &u);
            assert_same(&a, &b);
        }
    }

    #[test]
    fn test_matches_scalar_parallel_path() {
        // 2^14 amplitudes with threshold 1 forces the rayon path over several chunks
        let mut a = ramp(14);
        let mut b = a.clone();
        let m = StandardGate::CSwap.matrix();
        ScalarKernel.apply(&mut a, &[9, 2, 7], &[0, 13], &m);
        VectorizedKernel::new(1).apply(&mut b, &[9, 2, 7], &[0, 13], &m);
        assert_same(&a, &b);
    }

    #[test]
    fn test_partial_lane_block() {
        // two controls on four qubits leave exactly two groups
        let mut a = ramp(4);
        let mut b = a.clone();
        let m = StandardGate::H.matrix();
        ScalarKernel.apply(&mut a, &[3], &[0, 1], &m);
        VectorizedKernel::new(usize::MAX).apply(&mut b, &[3], &[0, 1], &m);
        assert_same(&a, &b);
    }
}
