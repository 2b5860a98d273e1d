//! Simulation results and their encoding.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::kernel::KernelPath;

/// How bit index maps to character position in result bitstrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Bit 0 is the leftmost character.
    #[default]
    IndexZeroFirst,
    /// Bit 0 is the rightmost character, as in the usual ket notation.
    IndexZeroLast,
}

impl BitOrder {
    /// Name used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            BitOrder::IndexZeroFirst => "index_zero_first",
            BitOrder::IndexZeroLast => "index_zero_last",
        }
    }

    /// Render bits, `bits[k]` being bit `k`.
    pub fn format_bits(self, bits: &[bool]) -> String {
        let ch = |&b: &bool| if b { '1' } else { '0' };
        match self {
            BitOrder::IndexZeroFirst => bits.iter().map(ch).collect(),
            BitOrder::IndexZeroLast => bits.iter().rev().map(ch).collect(),
        }
    }

    /// Render the low `width` bits of a basis index.
    pub fn format_index(self, index: usize, width: u32) -> String {
        let bits: Vec<bool> = (0..width).map(|k| (index >> k) & 1 == 1).collect();
        self.format_bits(&bits)
    }
}

impl fmt::Display for BitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BitOrder {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "index_zero_first" | "lsb_first" => Ok(BitOrder::IndexZeroFirst),
            "index_zero_last" | "msb_first" => Ok(BitOrder::IndexZeroLast),
            other => Err(SimError::Configuration(format!("Unknown bit order: {other}"))),
        }
    }
}

/// One state component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Amplitude {
    /// Real part.
    pub real: f64,
    /// Imaginary part.
    pub imag: f64,
    /// |a|².
    pub norm: f64,
}

impl Amplitude {
    /// The amplitude as a complex number.
    pub fn to_complex(&self) -> Complex64 {
        Complex64::new(self.real, self.imag)
    }
}

impl From<Complex64> for Amplitude {
    fn from(a: Complex64) -> Self {
        Self {
            real: a.re,
            imag: a.im,
            norm: a.norm_sqr(),
        }
    }
}

/// Bookkeeping about how a run went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Shots the caller asked for.
    pub shots_requested: u64,
    /// Shots that completed.
    pub shots_done: u64,
    /// Seed of the random source, recorded even when drawn from entropy.
    pub seed: u64,
    /// Kernel path that applied the gates.
    pub kernel: KernelPath,
    /// Bitstring convention used for `results` and `state`.
    #[serde(default)]
    pub bit_order: BitOrder,
}

/// Outcome histogram and final state of a run.
///
/// Counts in `results` sum to `info.shots_done`. `state` holds every
/// component of the last shot's vector above the amplitude threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Run metadata.
    pub info: RunInfo,
    /// Outcome bitstring → count.
    pub results: BTreeMap<String, u64>,
    /// Basis bitstring → amplitude.
    pub state: BTreeMap<String, Amplitude>,
}

impl SimulationResult {
    /// Shots that completed.
    pub fn shots_done(&self) -> u64 {
        self.info.shots_done
    }

    /// Count for one outcome, 0 if never seen.
    pub fn count(&self, outcome: &str) -> u64 {
        self.results.get(outcome).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> u64 {
        self.results.values().sum()
    }

    /// Most frequent outcome; ties go to the lexicographically first.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.results
            .iter()
            .fold(None, |best: Option<(&str, u64)>, (k, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((k.as_str(), v)),
            })
    }

    /// Relative frequency of each outcome.
    pub fn frequencies(&self) -> BTreeMap<String, f64> {
        let total = self.total_count() as f64;
        self.results
            .iter()
            .map(|(k, &v)| (k.clone(), if total > 0.0 { v as f64 / total } else { 0.0 }))
            .collect()
    }

    /// Amplitude of one basis state in the final snapshot.
    pub fn amplitude(&self, basis: &str) -> Option<Complex64> {
        self.state.get(basis).map(Amplitude::to_complex)
    }

    /// Encode as compact JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as indented JSON.
    pub fn to_json_pretty(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "shots: {}/{} (seed {}, kernel {})",
            self.info.shots_done, self.info.shots_requested, self.info.seed, self.info.kernel
        )?;
        writeln!(f, "results:")?;
        for (outcome, count) in &self.results {
            writeln!(f, "  {outcome}: {count}")?;
        }
        writeln!(f, "state:")?;
        for (basis, amp) in &self.state {
            writeln!(
                f,
                "  {basis}: {:.8}{:+.8}i (norm {:.8})",
                amp.real, amp.imag, amp.norm
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SimulationResult {
        SimulationResult {
            info: RunInfo {
                shots_requested: 23,
                shots_done: 23,
                seed: 123,
                kernel: KernelPath::Scalar,
                bit_order: BitOrder::IndexZeroFirst,
            },
            results: BTreeMap::from([("00".to_string(), 11), ("11".to_string(), 12)]),
            state: BTreeMap::from([(
                "11".to_string(),
                Amplitude::from(Complex64::new(1.0, 0.0)),
            )]),
        }
    }

    #[test]
    fn test_format_bits() {
        let bits = [true, false, false];
        assert_eq!(BitOrder::IndexZeroFirst.format_bits(&bits), "100");
        assert_eq!(BitOrder::IndexZeroLast.format_bits(&bits), "001");
        assert_eq!(BitOrder::IndexZeroFirst.format_index(0b110, 3), "011");
        assert_eq!(BitOrder::IndexZeroLast.format_index(0b110, 3), "110");
        assert_eq!(BitOrder::IndexZeroFirst.format_index(0, 0), "");
    }

    #[test]
    fn test_bit_order_parse() {
        assert_eq!("index-zero-last".parse::<BitOrder>().unwrap(), BitOrder::IndexZeroLast);
        assert_eq!("LSB_FIRST".parse::<BitOrder>().unwrap(), BitOrder::IndexZeroFirst);
        assert!("middle".parse::<BitOrder>().is_err());
    }

    #[test]
    fn test_counts() {
        let result = sample();
        assert_eq!(result.total_count(), 23);
        assert_eq!(result.count("11"), 12);
        assert_eq!(result.count("01"), 0);
        assert_eq!(result.most_frequent(), Some(("11", 12)));
        assert!((result.frequencies()["00"] - 11.0 / 23.0).abs() < 1e-15);
    }

    #[test]
    fn test_wire_shape() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(value["info"]["shots_requested"], 23);
        assert_eq!(value["info"]["kernel"], "scalar");
        assert_eq!(value["results"]["11"], 12);
        assert_eq!(value["state"]["11"]["real"], 1.0);
        assert_eq!(value["state"]["11"]["norm"], 1.0);
    }

    #[test]
    fn test_json_decode() {
        let result = sample();
        let decoded = SimulationResult::from_json(&result.to_json_pretty().unwrap()).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert!(text.contains("shots: 23/23"));
        assert!(text.contains("  11: 1.00000000+0.00000000i (norm 1.00000000)"));
    }
}
