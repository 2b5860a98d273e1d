//! Gate application kernels.
//!
//! A kernel applies a dense 2^k × 2^k unitary (k ≤ 3) to an amplitude slice
//! in place. For every group of 2^k amplitudes whose indices differ only in
//! the target bits, and whose control bits are all 1, the group is gathered,
//! multiplied by the matrix and scattered back. The full 2^n operator is
//! never formed.
//!
//! Two strategies exist: [`ScalarKernel`] walks groups one at a time, and
//! [`VectorizedKernel`] processes groups in lane blocks and spreads
//! independent chunks of the state over the rayon pool. Both accumulate in
//! the same order and agree exactly.

mod scalar;
mod vectorized;

pub use scalar::ScalarKernel;
pub use vectorized::VectorizedKernel;

use std::fmt;
use std::str::FromStr;

use kvant_ir::{MAX_GATE_TARGETS, UnitaryMatrix};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Largest matrix side a kernel handles.
pub(crate) const MAX_DIM: usize = 1 << MAX_GATE_TARGETS;

/// Strategy for applying a unitary to an amplitude slice.
///
/// Callers guarantee that targets are distinct, disjoint from the controls,
/// all below `log2(amplitudes.len())`, and that the matrix side is
/// `2^targets.len()`. [`crate::AmplitudeVector::apply_unitary`] checks this
/// before dispatching.
pub trait GateKernel: Send + Sync + fmt::Debug {
    /// Which strategy this is.
    fn path(&self) -> KernelPath;

    /// Apply `matrix` to `targets` (operand 0 most significant) where all
    /// `controls` are 1.
    fn apply(
        &self,
        amplitudes: &mut [Complex64],
        targets: &[usize],
        controls: &[usize],
        matrix: &UnitaryMatrix,
    );
}

/// Selects a [`GateKernel`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelPath {
    /// Portable per-group loop.
    Scalar,
    /// Lane-blocked, data-parallel loop.
    Vectorized,
}

impl KernelPath {
    /// Instantiate the kernel. `parallel_threshold` is the state length from
    /// which the vectorized path fans out over threads.
    pub fn kernel(self, parallel_threshold: usize) -> Box<dyn GateKernel> {
        match self {
            KernelPath::Scalar => Box::new(ScalarKernel),
            KernelPath::Vectorized => Box::new(VectorizedKernel::new(parallel_threshold)),
        }
    }

    /// Name used in configuration and results.
    pub fn as_str(self) -> &'static str {
        match self {
            KernelPath::Scalar => "scalar",
            KernelPath::Vectorized => "vectorized",
        }
    }
}

/// The `vectorized` cargo feature picks the default path.
impl Default for KernelPath {
    fn default() -> Self {
        if cfg!(feature = "vectorized") {
            KernelPath::Vectorized
        } else {
            KernelPath::Scalar
        }
    }
}

impl fmt::Display for KernelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelPath {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scalar" => Ok(KernelPath::Scalar),
            "vectorized" | "simd" => Ok(KernelPath::Vectorized),
            other => Err(SimError::Configuration(format!(
                "Unknown kernel path: {other}"
            ))),
        }
    }
}

/// Index arithmetic shared by both kernels.
#[derive(Debug, Clone)]
pub(crate) struct GateLayout {
    /// Matrix side, 2^k.
    pub dim: usize,
    /// `offsets[r]` is the basis-index displacement of local row `r`.
    pub offsets: [usize; MAX_DIM],
    /// Target bit positions, ascending.
    sorted_targets: [usize; MAX_GATE_TARGETS],
    num_targets: usize,
    /// All control bits set.
    pub control_mask: usize,
    /// Smallest aligned block that contains whole groups.
    pub span: usize,
}

impl GateLayout {
    pub fn new(targets: &[usize], controls: &[usize]) -> Self {
        let k = targets.len();
        let dim = 1usize << k;

        let mut offsets = [0usize; MAX_DIM];
        for (r, offset) in offsets.iter_mut().enumerate().take(dim) {
            for (j, &t) in targets.iter().enumerate() {
                // operand j is bit (k - 1 - j) of the local row
                if (r >> (k - 1 - j)) & 1 == 1 {
                    *offset |= 1 << t;
                }
            }
        }

        let mut sorted_targets = [0usize; MAX_GATE_TARGETS];
        sorted_targets[..k].copy_from_slice(targets);
        sorted_targets[..k].sort_unstable();

        let control_mask = controls.iter().fold(0usize, |m, &c| m | (1 << c));
        let span = 1usize << (sorted_targets[..k].last().copied().unwrap_or(0) + 1);

        Self {
            dim,
            offsets,
            sorted_targets,
            num_targets: k,
            control_mask,
            span,
        }
    }

    /// Number of groups in a block of `len` amplitudes.
    #[inline]
    pub fn groups_in(&self, len: usize) -> usize {
        len >> self.num_targets
    }

    /// Index of the `g`-th group's first member: `g` with a zero bit
    /// inserted at every target position.
    #[inline]
    pub fn base_index(&self, g: usize) -> usize {
        let mut idx = g;
        for &t in &self.sorted_targets[..self.num_targets] {
            let low = idx & ((1 << t) - 1);
            idx = ((idx >> t) << (t + 1)) | low;
        }
        idx
    }

    #[inline]
    pub fn controls_set(&self, index: usize) -> bool {
        index & self.control_mask == self.control_mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_operand_zero_is_msb() {
        let layout = GateLayout::new(&[3, 0], &[]);
        assert_eq!(layout.dim, 4);
        assert_eq!(&layout.offsets[..4], &[0b0000, 0b0001, 0b1000, 0b1001]);
        assert_eq!(layout.span, 16);
    }

    #[test]
    fn test_base_index_skips_target_bits() {
        let layout = GateLayout::new(&[1], &[]);
        let bases: Vec<_> = (0..4).map(|g| layout.base_index(g)).collect();
        assert_eq!(bases, vec![0b000, 0b001, 0b100, 0b101]);

        let layout = GateLayout::new(&[2, 0], &[]);
        let bases: Vec<_> = (0..4).map(|g| layout.base_index(g)).collect();
        assert_eq!(bases, vec![0b0000, 0b0010, 0b1000, 0b1010]);
    }

    #[test]
    fn test_control_mask() {
        let layout = GateLayout::new(&[0], &[1, 3]);
        assert!(layout.controls_set(0b1010));
        assert!(!layout.controls_set(0b0010));
    }

    #[test]
    fn test_kernel_path_parse() {
        assert_eq!("scalar".parse::<KernelPath>().unwrap(), KernelPath::Scalar);
        assert_eq!("Vectorized".parse::<KernelPath>().unwrap(), KernelPath::Vectorized);
        assert!("gpu".parse::<KernelPath>().is_err());
        assert_eq!(KernelPath::Scalar.kernel(1).path(), KernelPath::Scalar);
    }

    #[cfg(feature = "vectorized")]
    #[test]
    fn test_default_follows_feature() {
        assert_eq!(KernelPath::default(), KernelPath::Vectorized);
    }
}
